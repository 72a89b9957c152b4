//! External tool error types

use crate::core::error_handling::ContextualError;
use thiserror::Error;

/// Failure of an external collaborator
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to launch '{program}'")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' failed ({status}){}", format_detail(.detail))]
    Failed {
        program: String,
        status: String,
        detail: Option<String>,
    },

    #[error("No scanner found for USB vendor {vendor}")]
    NoDevice { vendor: String },

    #[error("Found {count} scanners for USB vendor {vendor}; connect exactly one")]
    AmbiguousDevice { vendor: String, count: usize },

    #[error("Unexpected output from '{program}': {line}")]
    UnexpectedOutput { program: String, line: String },
}

fn format_detail(detail: &Option<String>) -> String {
    match detail {
        Some(text) if !text.is_empty() => format!(": {}", text),
        _ => String::new(),
    }
}

impl ContextualError for ToolError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            ToolError::NoDevice { .. } | ToolError::AmbiguousDevice { .. } | ToolError::Launch { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        match self {
            ToolError::NoDevice { .. } | ToolError::AmbiguousDevice { .. } => {
                Some(self.to_string())
            }
            ToolError::Launch { program, source } => Some(format!(
                "Could not run '{}' ({}); is it installed and on PATH?",
                program, source
            )),
            _ => None,
        }
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
