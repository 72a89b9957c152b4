//! Cleanup tasks handed to the pool

use super::events::PageEvent;
use std::fmt;

/// Passed through to the cleanup tool unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupOptions {
    /// Color distance tolerance (percent) used when trimming borders
    pub fuzz_percent: u32,
    pub trim: bool,
    /// Deskew threshold in percent, `None` disables deskewing
    pub deskew_threshold: Option<u32>,
}

pub const DEFAULT_FUZZ_PERCENT: u32 = 20;
pub const DEFAULT_DESKEW_THRESHOLD: u32 = 30;

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            fuzz_percent: DEFAULT_FUZZ_PERCENT,
            trim: true,
            deskew_threshold: Some(DEFAULT_DESKEW_THRESHOLD),
        }
    }
}

/// Lifecycle of a cleanup task: Pending -> Running -> Done | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Done,
    Failed,
}

/// One page's cleanup, owned by the pool from submission to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupTask {
    sequence: u64,
    page: PageEvent,
    options: CleanupOptions,
    state: TaskState,
}

impl CleanupTask {
    /// `sequence` is the page's position in the session, used for reporting
    pub fn new(sequence: u64, page: PageEvent, options: CleanupOptions) -> Self {
        Self {
            sequence,
            page,
            options,
            state: TaskState::Pending,
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn page(&self) -> &PageEvent {
        &self.page
    }

    pub fn options(&self) -> &CleanupOptions {
        &self.options
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: TaskState) {
        self.state = state;
    }
}

/// A cleanup that did not produce its output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub sequence: u64,
    pub page: PageEvent,
    pub reason: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} ({}): {}",
            self.sequence + 1,
            self.page.raw_path().display(),
            self.reason
        )
    }
}
