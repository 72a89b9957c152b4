//! PDF assembly through `img2pdf`

use super::command;
use super::error::ToolResult;
use super::DocumentAssembler;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Assembles cleaned pages into a PDF with `img2pdf`
#[derive(Debug, Clone)]
pub struct Img2Pdf {
    program: String,
}

impl Img2Pdf {
    pub fn new() -> Self {
        Self {
            program: "img2pdf".to_string(),
        }
    }

    fn args(pages: &[PathBuf], output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = pages.iter().map(|p| p.as_os_str().to_owned()).collect();
        args.push("-o".into());
        args.push(output.as_os_str().to_owned());
        args
    }
}

impl Default for Img2Pdf {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentAssembler for Img2Pdf {
    async fn assemble(&self, pages: &[PathBuf], output: &Path) -> ToolResult<()> {
        log::info!("Assembling {} pages into {}", pages.len(), output.display());
        command::run_checked(&self.program, &Self::args(pages, output)).await?;
        Ok(())
    }
}
