//! External collaborators
//!
//! Everything the pipeline does not compute itself sits behind one of the
//! async traits below: locating the USB scanner, running the scan driver,
//! cleaning a page image, assembling the PDF and handing it to the
//! interactive arranger. The process-backed implementations shell out to
//! `lsusb`, `scanadf`, `convert`, `img2pdf` and `pdfarranger`; tests
//! substitute in-memory fakes.

pub mod arranger;
pub mod assembler;
pub mod cleaner;
mod command;
pub mod error;
pub mod locator;
pub mod scanner;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use arranger::PdfArranger;
pub use assembler::Img2Pdf;
pub use cleaner::ImageMagickCleaner;
pub use error::{ToolError, ToolResult};
pub use locator::{DeviceAddress, LsusbLocator};
pub use scanner::{ScanRequest, ScanRun, ScanadfScanner};

use crate::pipeline::task::CleanupTask;

/// Resolves the scanner's USB bus/device address from a vendor id
#[async_trait]
pub trait DeviceLocator: Send + Sync {
    async fn locate(&self, vendor_id: &str) -> ToolResult<DeviceAddress>;
}

/// Starts one scan round and exposes its live status lines
#[async_trait]
pub trait Scanner: Send + Sync {
    async fn start(&self, request: &ScanRequest) -> ToolResult<ScanRun>;
}

/// Cleans one raw page image into its output file
#[async_trait]
pub trait PageCleaner: Send + Sync {
    async fn clean(&self, task: &CleanupTask) -> ToolResult<()>;
}

/// Combines cleaned pages, in order, into a single document
#[async_trait]
pub trait DocumentAssembler: Send + Sync {
    async fn assemble(&self, pages: &[PathBuf], output: &Path) -> ToolResult<()>;
}

/// Runs the interactive arranger and returns once the operator closes it
#[async_trait]
pub trait DocumentArranger: Send + Sync {
    async fn arrange(&self, document: &Path) -> ToolResult<()>;
}
