//! Session-wide settings resolved from CLI and configuration

use super::task::CleanupOptions;
use std::path::PathBuf;
use strum_macros::{Display, EnumString};

/// USB vendor id of the supported scanner family (Brother)
pub const DEFAULT_VENDOR_ID: &str = "04f9";
/// SANE backend model name for the scanner
pub const DEFAULT_SANE_MODEL: &str = "BrotherADS2700";
pub const DEFAULT_RESOLUTION: u32 = 200;
/// Cleanup tasks allowed to run at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Scan color mode as offered on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, clap::ValueEnum)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColorMode {
    Monochrome,
    #[default]
    Grayscale,
    Truecolor,
}

impl ColorMode {
    /// Mode string understood by the scan driver
    pub fn driver_mode(self) -> &'static str {
        match self {
            ColorMode::Monochrome => "Black & White",
            ColorMode::Grayscale => "Gray",
            ColorMode::Truecolor => "24 bit Color",
        }
    }
}

/// Fully resolved settings for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub vendor_id: String,
    pub sane_model: String,
    pub resolution: u32,
    pub color: ColorMode,
    /// Duplex mode of the first round; later rounds follow operator choices
    pub duplex: bool,
    /// Offer another round after each one instead of finishing
    pub batch: bool,
    pub cleanup: CleanupOptions,
    pub concurrency: usize,
    /// Parent of the temporary working directory (system temp dir if unset)
    pub work_dir_parent: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            vendor_id: DEFAULT_VENDOR_ID.to_string(),
            sane_model: DEFAULT_SANE_MODEL.to_string(),
            resolution: DEFAULT_RESOLUTION,
            color: ColorMode::default(),
            duplex: false,
            batch: false,
            cleanup: CleanupOptions::default(),
            concurrency: DEFAULT_CONCURRENCY,
            work_dir_parent: None,
        }
    }
}
