//! Batch controller
//!
//! Drives scan rounds one after another. Each round streams page events from
//! the scanner into the cleanup pool, waits for the scanner's status stream
//! to close, then drains the pool. In batch mode the operator decides after
//! every round whether to scan another stack (single or duplex) or finish.
//!
//! ```text
//! Scanning(r) -> Draining(r) -> AwaitingDecision -> Scanning(r + 1)
//!                     |                  |
//!                     +-> Finished <-----+
//! ```

use super::error::{PipelineError, PipelineResult};
use super::events::{page_events, PageEvent, RAW_EXTENSION, RAW_STAGE};
use super::pool::CleanupPool;
use super::progress::{Phase, ProgressReporter};
use super::session::Session;
use super::settings::PipelineConfig;
use super::task::{CleanupTask, TaskFailure};
use crate::external::{ScanRequest, Scanner};
use async_trait::async_trait;
use futures::stream::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Where the controller is in its round cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Scanning { round: u32, duplex: bool },
    Draining { round: u32, duplex: bool },
    AwaitingDecision { next_round: u32 },
    Finished,
}

/// Operator's answer after a round in batch mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchDecision {
    Finish,
    Single,
    Duplex,
}

impl BatchDecision {
    /// Interpret operator input. Blank input means finish; anything
    /// unrecognised is `None` so the caller can ask again.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "" | "f" | "finish" | "finished" => Some(BatchDecision::Finish),
            "s" | "single" => Some(BatchDecision::Single),
            "d" | "duplex" => Some(BatchDecision::Duplex),
            _ => None,
        }
    }
}

/// Source of batch decisions; the console prompt in the binary, scripted
/// answers in tests.
#[async_trait]
pub trait DecisionProvider: Send {
    /// Raw operator input for the round about to start, `None` when input
    /// is closed
    async fn read_choice(&mut self, next_round: u32) -> PipelineResult<Option<String>>;
}

/// One invocation of the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRound {
    pub index: u32,
    pub duplex: bool,
    /// Driver output pattern, unique per round
    pub output_pattern: PathBuf,
}

impl ScanRound {
    pub fn new(index: u32, duplex: bool, work_dir: &Path) -> Self {
        Self {
            index,
            duplex,
            output_pattern: work_dir.join(format!("{}-{}-%d.{}", RAW_STAGE, index, RAW_EXTENSION)),
        }
    }
}

/// Everything the rounds produced
#[derive(Debug)]
pub struct BatchOutcome {
    pub session: Session,
    pub failures: Vec<TaskFailure>,
    pub rounds: u32,
    /// A shutdown signal ended the session early
    pub interrupted: bool,
}

enum Step {
    Page(PageEvent),
    Ended,
    Interrupted,
}

pub struct BatchController<'a> {
    scanner: Arc<dyn Scanner>,
    pool: &'a CleanupPool,
    progress: &'a ProgressReporter,
    config: &'a PipelineConfig,
    device_name: String,
    work_dir: PathBuf,
    shutdown: Option<broadcast::Receiver<()>>,
    state: BatchState,
    session: Session,
    failures: Vec<TaskFailure>,
    next_sequence: u64,
    rounds: u32,
    interrupted: bool,
}

impl<'a> BatchController<'a> {
    pub fn new(
        scanner: Arc<dyn Scanner>,
        pool: &'a CleanupPool,
        progress: &'a ProgressReporter,
        config: &'a PipelineConfig,
        device_name: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            scanner,
            pool,
            progress,
            config,
            device_name: device_name.into(),
            work_dir: work_dir.into(),
            shutdown: None,
            state: BatchState::Scanning {
                round: 0,
                duplex: config.duplex,
            },
            session: Session::new(),
            failures: Vec::new(),
            next_sequence: 0,
            rounds: 0,
            interrupted: false,
        }
    }

    /// Stop at the next safe point when a shutdown signal arrives
    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Run rounds until finished or interrupted
    pub async fn run(
        mut self,
        decisions: &mut dyn DecisionProvider,
    ) -> PipelineResult<BatchOutcome> {
        loop {
            let next = match self.state {
                BatchState::Scanning { round, duplex } => {
                    let round = ScanRound::new(round, duplex, &self.work_dir);
                    self.scan(&round).await?;
                    BatchState::Draining {
                        round: round.index,
                        duplex,
                    }
                }
                BatchState::Draining { round, .. } => {
                    self.drain(round).await?;
                    if self.config.batch && !self.interrupted {
                        BatchState::AwaitingDecision {
                            next_round: round + 1,
                        }
                    } else {
                        BatchState::Finished
                    }
                }
                BatchState::AwaitingDecision { next_round } => {
                    match self.decide(next_round, decisions).await? {
                        Some(BatchDecision::Single) => BatchState::Scanning {
                            round: next_round,
                            duplex: false,
                        },
                        Some(BatchDecision::Duplex) => BatchState::Scanning {
                            round: next_round,
                            duplex: true,
                        },
                        Some(BatchDecision::Finish) | None => BatchState::Finished,
                    }
                }
                BatchState::Finished => break,
            };
            log::debug!("Batch state {:?} -> {:?}", self.state, next);
            self.state = next;
        }

        Ok(BatchOutcome {
            session: self.session,
            failures: self.failures,
            rounds: self.rounds,
            interrupted: self.interrupted,
        })
    }

    async fn scan(&mut self, round: &ScanRound) -> PipelineResult<()> {
        self.progress.start_round(round.index);
        self.rounds += 1;
        log::info!(
            "Starting scan round {} ({})",
            round.index + 1,
            if round.duplex { "duplex" } else { "single-sided" }
        );

        let request = ScanRequest {
            device_name: self.device_name.clone(),
            mode: self.config.color,
            resolution: self.config.resolution,
            duplex: round.duplex,
            output_pattern: round.output_pattern.clone(),
        };
        let run = self
            .scanner
            .start(&request)
            .await
            .map_err(|source| PipelineError::ScanLaunch {
                round: round.index,
                source,
            })?;
        let (lines, exit) = run.into_parts();

        if self.consume(page_events(lines)).await? {
            // Dropping the exit future stops the driver
            drop(exit);
            self.interrupted = true;
            log::warn!("Scan round {} interrupted", round.index + 1);
            return Ok(());
        }

        if let Err(e) = exit.await {
            log::warn!(
                "Scanner exited with an error after round {}: {}",
                round.index + 1,
                e
            );
        }
        Ok(())
    }

    /// Submit every page of the stream; true when interrupted before the
    /// stream ended
    async fn consume<S>(&mut self, events: S) -> PipelineResult<bool>
    where
        S: futures::Stream<Item = PageEvent>,
    {
        let mut events = std::pin::pin!(events);
        loop {
            let step = tokio::select! {
                biased;
                _ = shutdown_signal(&mut self.shutdown) => Step::Interrupted,
                event = events.next() => match event {
                    Some(page) => Step::Page(page),
                    None => Step::Ended,
                },
            };
            match step {
                Step::Page(page) => self.admit(page).await?,
                Step::Ended => return Ok(false),
                Step::Interrupted => return Ok(true),
            }
        }
    }

    async fn admit(&mut self, page: PageEvent) -> PipelineResult<()> {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let cleaned = page.cleaned_path().to_path_buf();
        log::info!("Page {} scanned: {}", sequence + 1, page.raw_path().display());

        self.pool
            .submit(CleanupTask::new(sequence, page, self.config.cleanup))
            .await?;
        self.session.record(cleaned);
        self.progress.page_scanned();
        Ok(())
    }

    async fn drain(&mut self, round: u32) -> PipelineResult<()> {
        self.progress.set_phase(Phase::Processing);
        let report = self.pool.drain().await?;
        log::info!(
            "Round {} drained: {} cleaned, {} failed",
            round + 1,
            report.completed,
            report.failures.len()
        );
        for failure in report.failures {
            self.session.mark_failed(failure.page.cleaned_path());
            self.failures.push(failure);
        }
        Ok(())
    }

    /// `None` when interrupted while waiting
    async fn decide(
        &mut self,
        next_round: u32,
        decisions: &mut dyn DecisionProvider,
    ) -> PipelineResult<Option<BatchDecision>> {
        self.progress.set_phase(Phase::AwaitingDecision);
        loop {
            let answer = tokio::select! {
                biased;
                _ = shutdown_signal(&mut self.shutdown) => None,
                choice = decisions.read_choice(next_round) => Some(choice),
            };
            let Some(answer) = answer else {
                self.interrupted = true;
                return Ok(None);
            };
            let Some(choice) = answer? else {
                log::info!("No more input; finishing batch");
                return Ok(Some(BatchDecision::Finish));
            };
            match BatchDecision::parse(&choice) {
                Some(decision) => return Ok(Some(decision)),
                None => log::warn!(
                    "Unrecognised choice '{}'; answer Single, Duplex or Finished",
                    choice.trim()
                ),
            }
        }
    }
}

/// Resolves on shutdown; never resolves without a live receiver
async fn shutdown_signal(shutdown: &mut Option<broadcast::Receiver<()>>) {
    if let Some(rx) = shutdown {
        match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => return,
            Err(RecvError::Closed) => *shutdown = None,
        }
    }
    std::future::pending::<()>().await
}
