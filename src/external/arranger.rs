//! Interactive page arrangement through `pdfarranger`

use super::error::{ToolError, ToolResult};
use super::DocumentArranger;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Opens the assembled PDF in `pdfarranger` and waits for it to close
#[derive(Debug, Clone)]
pub struct PdfArranger {
    program: String,
}

impl PdfArranger {
    pub fn new() -> Self {
        Self {
            program: "pdfarranger".to_string(),
        }
    }
}

impl Default for PdfArranger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentArranger for PdfArranger {
    async fn arrange(&self, document: &Path) -> ToolResult<()> {
        let status = Command::new(&self.program)
            .arg(document)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| ToolError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                program: self.program.clone(),
                status: status.to_string(),
                detail: None,
            })
        }
    }
}
