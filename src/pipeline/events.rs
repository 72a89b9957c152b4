//! Page events parsed from the scan driver's status output
//!
//! The driver reports each finished page as a line
//! `Scanned document <path>` on its status channel, interleaved with
//! unrelated chatter. Parsing is pure: nothing here touches the filesystem.

use futures::future;
use futures::stream::{Stream, StreamExt};
use std::path::{Path, PathBuf};

/// Prefix marking a completed page in the driver's status output
pub const SCANNED_PREFIX: &str = "Scanned document ";
/// File name token of raw driver output
pub const RAW_STAGE: &str = "scanned";
/// File name token of cleaned output
pub const CLEANED_STAGE: &str = "cleaned";
pub const RAW_EXTENSION: &str = "pnm";
pub const CLEANED_EXTENSION: &str = "png";

/// One raw page written by the scan driver, and where its cleaned copy goes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageEvent {
    raw: PathBuf,
    cleaned: PathBuf,
}

impl PageEvent {
    pub fn from_raw(raw: impl Into<PathBuf>) -> Self {
        let raw = raw.into();
        let cleaned = cleaned_path_for(&raw);
        Self { raw, cleaned }
    }

    pub fn raw_path(&self) -> &Path {
        &self.raw
    }

    pub fn cleaned_path(&self) -> &Path {
        &self.cleaned
    }
}

/// Cleaned output path for a raw page.
///
/// Only the file name is rewritten: the stage token is swapped and the
/// extension becomes the cleaned image extension. Applying it twice gives
/// the same result as applying it once.
pub fn cleaned_path_for(raw: &Path) -> PathBuf {
    let Some(file_name) = raw.file_name() else {
        return raw.with_extension(CLEANED_EXTENSION);
    };
    let renamed = file_name
        .to_string_lossy()
        .replace(RAW_STAGE, CLEANED_STAGE);
    raw.with_file_name(renamed).with_extension(CLEANED_EXTENSION)
}

/// Parse one status line; only complete `Scanned document <path>` lines count
pub fn parse_line(line: &str) -> Option<PageEvent> {
    let path = line.trim_end().strip_prefix(SCANNED_PREFIX)?;
    if path.is_empty() {
        return None;
    }
    Some(PageEvent::from_raw(path))
}

/// Lazily turn a live line stream into page events, in line order
pub fn page_events<S>(lines: S) -> impl Stream<Item = PageEvent>
where
    S: Stream<Item = String>,
{
    lines.filter_map(|line| {
        let event = parse_line(&line);
        if event.is_none() && !line.trim().is_empty() {
            log::debug!("scanner: {}", line.trim_end());
        }
        future::ready(event)
    })
}
