//! Pipeline error types

use crate::core::error_handling::ContextualError;
use crate::external::ToolError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a scanning session
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Scanner lookup failed")]
    Locate(#[source] ToolError),

    #[error("Scan round {} could not start", .round + 1)]
    ScanLaunch {
        round: u32,
        #[source]
        source: ToolError,
    },

    #[error("Cannot create working directory in {}", .parent.display())]
    WorkDir {
        parent: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF assembly failed")]
    Assembly(#[source] ToolError),

    #[error("Arranging {} failed", .document.display())]
    Arrangement {
        document: PathBuf,
        #[source]
        source: ToolError,
    },

    #[error("Reading operator input failed: {reason}")]
    Prompt { reason: String },

    #[error("{message}")]
    Internal { message: String },
}

impl ContextualError for PipelineError {
    fn is_user_actionable(&self) -> bool {
        match self {
            PipelineError::Locate(source) | PipelineError::ScanLaunch { source, .. } => {
                source.is_user_actionable()
            }
            _ => false,
        }
    }

    fn user_message(&self) -> Option<String> {
        match self {
            PipelineError::Locate(source) | PipelineError::ScanLaunch { source, .. } => {
                source.user_message()
            }
            _ => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
