//! Scan driver invocation through `scanadf`

use super::error::{ToolError, ToolResult};
use super::Scanner;
use crate::pipeline::settings::ColorMode;
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;

const SOURCE_SIMPLEX: &str = "Automatic Document Feeder(left aligned)";
const SOURCE_DUPLEX: &str = "Automatic Document Feeder(left aligned,Duplex)";

/// Everything the driver needs for one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub device_name: String,
    pub mode: ColorMode,
    pub resolution: u32,
    pub duplex: bool,
    /// Driver output pattern; `%d` is replaced by the page number
    pub output_pattern: PathBuf,
}

impl ScanRequest {
    /// Feeder source descriptor for the requested duplex mode
    pub fn source(&self) -> &'static str {
        if self.duplex {
            SOURCE_DUPLEX
        } else {
            SOURCE_SIMPLEX
        }
    }

    fn driver_args(&self) -> Vec<OsString> {
        vec![
            "--device-name".into(),
            self.device_name.clone().into(),
            "--mode".into(),
            self.mode.driver_mode().into(),
            "--resolution".into(),
            self.resolution.to_string().into(),
            "--output-file".into(),
            self.output_pattern.clone().into_os_string(),
            "--source".into(),
            self.source().into(),
        ]
    }
}

/// A running scan: its status lines and its eventual exit
///
/// The line stream ends when the driver closes its status channel. Dropping
/// the run before that stops the driver.
pub struct ScanRun {
    lines: BoxStream<'static, String>,
    exit: BoxFuture<'static, ToolResult<()>>,
}

impl ScanRun {
    pub fn new(
        lines: BoxStream<'static, String>,
        exit: BoxFuture<'static, ToolResult<()>>,
    ) -> Self {
        Self { lines, exit }
    }

    /// A finished run replaying fixed status lines
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(lines).boxed(), future::ready(Ok(())).boxed())
    }

    pub fn into_parts(
        self,
    ) -> (
        BoxStream<'static, String>,
        BoxFuture<'static, ToolResult<()>>,
    ) {
        (self.lines, self.exit)
    }
}

impl std::fmt::Debug for ScanRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanRun").finish_non_exhaustive()
    }
}

/// Drives the scanner through `scanadf`
#[derive(Debug, Clone)]
pub struct ScanadfScanner {
    program: String,
}

impl ScanadfScanner {
    pub fn new() -> Self {
        Self {
            program: "scanadf".to_string(),
        }
    }
}

impl Default for ScanadfScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scanner for ScanadfScanner {
    async fn start(&self, request: &ScanRequest) -> ToolResult<ScanRun> {
        let args = request.driver_args();
        log::debug!("Starting {} {:?}", self.program, args);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let stderr = child.stderr.take().ok_or_else(|| ToolError::UnexpectedOutput {
            program: self.program.clone(),
            line: "status channel unavailable".to_string(),
        })?;

        let lines = status_lines(self.program.clone(), BufReader::new(stderr));

        let program = self.program.clone();
        let exit = async move {
            let status = child.wait().await.map_err(|source| ToolError::Launch {
                program: program.clone(),
                source,
            })?;
            if status.success() {
                Ok(())
            } else {
                Err(ToolError::Failed {
                    program,
                    status: status.to_string(),
                    detail: None,
                })
            }
        }
        .boxed();

        Ok(ScanRun::new(lines, exit))
    }
}

/// Status output split into lines.
///
/// Bytes that are not UTF-8 are replaced rather than ending the stream, so a
/// garbled line is noise and the pages after it are still reported. The
/// stream ends at end of output or on a read error.
fn status_lines<R>(program: String, reader: R) -> BoxStream<'static, String>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::unfold(reader, move |mut reader| {
        let program = program.clone();
        async move {
            let mut buf = Vec::new();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => None,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']).to_string();
                    Some((line, reader))
                }
                Err(e) => {
                    log::warn!("Reading {} status output failed: {}", program, e);
                    None
                }
            }
        }
    })
    .boxed()
}
