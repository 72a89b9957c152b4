//! Ordered record of every page cleaned during one invocation

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Append-only list of cleaned page paths.
///
/// Pages are recorded when their cleanup is submitted, so the order is the
/// scan order across all rounds regardless of when each cleanup finishes.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pages: Vec<PathBuf>,
    failed: HashSet<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, cleaned: impl Into<PathBuf>) {
        self.pages.push(cleaned.into());
    }

    /// Flag a recorded page whose cleanup did not produce output
    pub fn mark_failed(&mut self, cleaned: &Path) {
        self.failed.insert(cleaned.to_path_buf());
    }

    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    /// Close the session: the document gets every page that was cleaned,
    /// in recorded order; failed pages are listed separately.
    pub fn finalize(self) -> SessionDocument {
        let failed: Vec<PathBuf> = self
            .pages
            .iter()
            .filter(|page| self.failed.contains(*page))
            .cloned()
            .collect();
        let pages = self
            .pages
            .into_iter()
            .filter(|page| !self.failed.contains(page))
            .collect();
        SessionDocument { pages, failed }
    }
}

/// Final page list handed to the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDocument {
    pages: Vec<PathBuf>,
    failed: Vec<PathBuf>,
}

impl SessionDocument {
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn failed(&self) -> &[PathBuf] {
        &self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
