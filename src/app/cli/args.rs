//! Command-line arguments
//!
//! Every option is optional at parse time so values from the configuration
//! file can fill the gaps; built-in defaults apply last when the arguments
//! are resolved into a pipeline configuration.

use crate::core::validation::{parse_resolution, validate_positive_int};
use crate::pipeline::settings::ColorMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "scanpipe")]
#[command(about = "Scan document batches, clean every page and assemble them into one PDF")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Scan resolution in dpi [100, 150, 200, 300, 400, 600; default: 200]
    #[arg(short = 'r', long = "resolution", value_name = "DPI", value_parser = parse_resolution)]
    pub resolution: Option<u32>,

    /// Color mode [default: grayscale]
    #[arg(short = 'c', long = "color", value_name = "MODE", value_enum, ignore_case = true)]
    pub color: Option<ColorMode>,

    /// Scan both sides of every sheet in the first round
    #[arg(short = 'd', long = "duplex")]
    pub duplex: bool,

    /// Straighten skewed pages (default)
    #[arg(long = "deskew", conflicts_with = "no_deskew")]
    pub deskew: bool,

    /// Leave page skew untouched
    #[arg(long = "no-deskew", conflicts_with = "deskew")]
    pub no_deskew: bool,

    /// Trim scanner borders (default)
    #[arg(long = "trim", conflicts_with = "no_trim")]
    pub trim: bool,

    /// Keep scanner borders
    #[arg(long = "no-trim", conflicts_with = "trim")]
    pub no_trim: bool,

    /// Ask for another stack of pages after each round
    #[arg(short = 'b', long = "batch")]
    pub batch: bool,

    /// Maximum concurrent page cleanups [default: 4]
    #[arg(short = 'j', long = "jobs", value_name = "COUNT", value_parser = validate_positive_int)]
    pub jobs: Option<usize>,

    /// Border trim color tolerance in percent [default: 20]
    #[arg(long = "fuzz", value_name = "PERCENT")]
    pub fuzz: Option<u32>,

    /// Deskew threshold in percent [default: 30]
    #[arg(long = "deskew-threshold", value_name = "PERCENT")]
    pub deskew_threshold: Option<u32>,

    /// USB vendor id of the scanner [default: 04f9]
    #[arg(long = "vendor-id", value_name = "HEX")]
    pub vendor_id: Option<String>,

    /// SANE backend model name [default: BrotherADS2700]
    #[arg(long = "sane-model", value_name = "MODEL")]
    pub sane_model: Option<String>,

    /// Directory in which the temporary working directory is created
    #[arg(short = 'w', long = "work-dir", value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Remove the working directory at the end without asking
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl Args {
    /// `None` when neither `--deskew` nor `--no-deskew` was given
    pub fn deskew_flag(&self) -> Option<bool> {
        flag_pair(self.deskew, self.no_deskew)
    }

    pub fn trim_flag(&self) -> Option<bool> {
        flag_pair(self.trim, self.no_trim)
    }

    /// Log file after the `none`/`-` convention is applied
    pub fn effective_log_file(&self) -> Option<&std::path::Path> {
        self.log_file.as_deref().filter(|path| {
            let text = path.to_string_lossy();
            !(text.eq_ignore_ascii_case("none") || text == "-")
        })
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
