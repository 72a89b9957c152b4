//! Temporary working directory for one session

use super::error::{PipelineError, PipelineResult};
use std::path::{Path, PathBuf};

const WORK_DIR_PREFIX: &str = "scanpipe-";

/// Scratch directory holding raw pages, cleaned pages and the document.
///
/// The directory is not removed on drop: whether it goes away is the
/// operator's call once the session is over.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create a fresh directory under `parent`, or under the system
    /// temporary directory when no parent is given
    pub fn create(parent: Option<&Path>) -> PipelineResult<Self> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix(WORK_DIR_PREFIX);
            builder
        };
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|source| PipelineError::WorkDir {
            parent: parent
                .map(Path::to_path_buf)
                .unwrap_or_else(std::env::temp_dir),
            source,
        })?;

        let path = dir.keep();
        log::info!("Working directory: {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the directory and everything in it
    pub fn remove(self) -> std::io::Result<()> {
        std::fs::remove_dir_all(&self.path)
    }

    /// Give up ownership and leave the directory in place
    pub fn keep(self) -> PathBuf {
        self.path
    }
}
