//! Progress reporting
//!
//! The controller publishes a [`ProgressSnapshot`] whenever its phase or
//! page count changes. Observers (the terminal spinner, tests) hold a watch
//! receiver and never block the pipeline; combined with the pool's
//! in-flight count this is enough to render
//! `Scanning... N scanned. Processing M...`.

use tokio::sync::watch;

/// Coarse stage of the invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Scanning,
    /// Scan finished; waiting for outstanding cleanups
    Processing,
    AwaitingDecision,
    Assembling,
    Arranging,
    Finished,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Starting",
            Phase::Scanning => "Scanning",
            Phase::Processing => "Processing",
            Phase::AwaitingDecision => "Waiting for next batch",
            Phase::Assembling => "Creating PDF",
            Phase::Arranging => "Arranging PDF",
            Phase::Finished => "Finished",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub phase: Phase,
    /// Zero-based index of the current scan round
    pub round: u32,
    /// Pages scanned so far in the whole session
    pub scanned: usize,
}

impl ProgressSnapshot {
    /// One-line status text given the number of cleanups in flight
    pub fn status_line(&self, processing: usize) -> String {
        match self.phase {
            Phase::Scanning => format!(
                "Scanning... {} scanned. Processing {}...",
                self.scanned, processing
            ),
            Phase::Processing => format!("Processing {}...", processing),
            Phase::Assembling => "Creating PDF...".to_string(),
            Phase::Arranging => "Waiting for PDF arrangement...".to_string(),
            phase => format!("{}... {} scanned", phase.label(), self.scanned),
        }
    }
}

/// Sending half held by the controller and runner
#[derive(Debug)]
pub struct ProgressReporter {
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.tx.borrow()
    }

    pub fn set_phase(&self, phase: Phase) {
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.phase != phase;
            snapshot.phase = phase;
            changed
        });
    }

    pub fn start_round(&self, round: u32) {
        self.tx.send_modify(|snapshot| {
            snapshot.phase = Phase::Scanning;
            snapshot.round = round;
        });
    }

    pub fn page_scanned(&self) {
        self.tx.send_modify(|snapshot| snapshot.scanned += 1);
    }
}

/// Receivers needed to render live progress
#[derive(Debug, Clone)]
pub struct ProgressWatch {
    pub snapshot: watch::Receiver<ProgressSnapshot>,
    /// Cleanups currently running in the pool
    pub in_flight: watch::Receiver<usize>,
}

impl ProgressWatch {
    pub fn status_line(&self) -> String {
        let snapshot = *self.snapshot.borrow();
        snapshot.status_line(*self.in_flight.borrow())
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}
