//! Page cleanup through ImageMagick `convert`

use super::command;
use super::error::ToolResult;
use super::PageCleaner;
use crate::pipeline::task::CleanupTask;
use async_trait::async_trait;
use std::ffi::OsString;

/// Argument list for one cleanup: `<raw> -fuzz N% [-trim] [-deskew N%] +repage <out>`
pub fn convert_args(task: &CleanupTask) -> Vec<OsString> {
    let options = task.options();
    let mut args: Vec<OsString> = vec![
        task.page().raw_path().as_os_str().to_owned(),
        "-fuzz".into(),
        format!("{}%", options.fuzz_percent).into(),
    ];
    if options.trim {
        args.push("-trim".into());
    }
    if let Some(threshold) = options.deskew_threshold {
        args.push("-deskew".into());
        args.push(format!("{}%", threshold).into());
    }
    args.push("+repage".into());
    args.push(task.page().cleaned_path().as_os_str().to_owned());
    args
}

/// Cleans pages with ImageMagick
#[derive(Debug, Clone)]
pub struct ImageMagickCleaner {
    program: String,
}

impl ImageMagickCleaner {
    pub fn new() -> Self {
        Self {
            program: "convert".to_string(),
        }
    }
}

impl Default for ImageMagickCleaner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageCleaner for ImageMagickCleaner {
    async fn clean(&self, task: &CleanupTask) -> ToolResult<()> {
        command::run_checked(&self.program, &convert_args(task)).await?;
        Ok(())
    }
}
