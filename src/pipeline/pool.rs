//! Bounded cleanup pool
//!
//! `submit` waits for a free slot on the capacity gate, records the task as
//! in flight and starts it in the background. Each background cleanup
//! publishes its result on a completion channel; a single reaper task owns
//! the bookkeeping: it removes the finished task from the in-flight set,
//! records failures and releases the slot. `drain` waits until the in-flight
//! set is empty and hands back everything that completed since the last
//! drain.
//!
//! The in-flight set and counters live behind one mutex. The capacity gate
//! is a separate semaphore; a task's permit is stored with its in-flight
//! entry so the slot is released exactly when the entry is removed.

use super::error::{PipelineError, PipelineResult};
use super::task::{CleanupTask, TaskFailure, TaskState};
use crate::core::error_handling::error_chain;
use crate::core::sync::handle_mutex_poison;
use crate::external::PageCleaner;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, watch, OwnedSemaphorePermit, Semaphore};

struct InFlight {
    task: CleanupTask,
    _permit: OwnedSemaphorePermit,
}

#[derive(Default)]
struct PoolState {
    in_flight: HashMap<u64, InFlight>,
    completed: usize,
    failures: Vec<TaskFailure>,
    next_ticket: u64,
}

struct Completion {
    ticket: u64,
    result: Result<(), String>,
}

/// What finished between two drains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Tasks that finished successfully
    pub completed: usize,
    /// Tasks whose cleanup failed, in completion order
    pub failures: Vec<TaskFailure>,
}

impl DrainReport {
    pub fn total(&self) -> usize {
        self.completed + self.failures.len()
    }
}

/// Runs page cleanups concurrently, never more than `capacity` at a time
pub struct CleanupPool {
    capacity: usize,
    gate: Arc<Semaphore>,
    state: Arc<Mutex<PoolState>>,
    in_flight_tx: Arc<watch::Sender<usize>>,
    in_flight_rx: watch::Receiver<usize>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    cleaner: Arc<dyn PageCleaner>,
}

impl CleanupPool {
    /// Create a pool; must be called inside a tokio runtime. A capacity of
    /// zero is raised to one.
    pub fn new(capacity: usize, cleaner: Arc<dyn PageCleaner>) -> Self {
        let capacity = capacity.max(1);
        let state = Arc::new(Mutex::new(PoolState::default()));
        let (in_flight_tx, in_flight_rx) = watch::channel(0usize);
        let in_flight_tx = Arc::new(in_flight_tx);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();

        tokio::spawn(reap(
            completion_rx,
            Arc::clone(&state),
            Arc::clone(&in_flight_tx),
        ));

        Self {
            capacity,
            gate: Arc::new(Semaphore::new(capacity)),
            state,
            in_flight_tx,
            in_flight_rx,
            completion_tx,
            cleaner,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tasks currently running; never blocks on the pool
    pub fn in_flight_count(&self) -> usize {
        *self.in_flight_rx.borrow()
    }

    /// Live view of the in-flight count for progress displays
    pub fn in_flight_watch(&self) -> watch::Receiver<usize> {
        self.in_flight_rx.clone()
    }

    /// Start `task` as soon as a slot is free. Returns once the task has
    /// started, not when it finishes.
    pub async fn submit(&self, mut task: CleanupTask) -> PipelineResult<()> {
        let permit = Arc::clone(&self.gate)
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::Internal {
                message: "cleanup pool capacity gate closed".to_string(),
            })?;

        task.set_state(TaskState::Running);
        let ticket = {
            let mut state = self.lock_state()?;
            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.in_flight.insert(
                ticket,
                InFlight {
                    task: task.clone(),
                    _permit: permit,
                },
            );
            self.in_flight_tx.send_replace(state.in_flight.len());
            ticket
        };

        log::debug!(
            "Cleaning page {} ({} of {} slots busy)",
            task.page().raw_path().display(),
            self.in_flight_count(),
            self.capacity
        );

        let cleaner = Arc::clone(&self.cleaner);
        let completion_tx = self.completion_tx.clone();
        tokio::spawn(async move {
            // Run the cleanup in its own task so a panic still reports a completion
            let outcome = tokio::spawn(async move { cleaner.clean(&task).await }).await;
            let result = match outcome {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(error_chain(&e)),
                Err(join_error) => Err(format!("cleanup task aborted: {}", join_error)),
            };
            let _ = completion_tx.send(Completion { ticket, result });
        });

        Ok(())
    }

    /// Wait until every submitted task has finished, then report what
    /// finished since the previous drain. Returns immediately when idle.
    pub async fn drain(&self) -> PipelineResult<DrainReport> {
        let mut in_flight = self.in_flight_rx.clone();
        in_flight
            .wait_for(|count| *count == 0)
            .await
            .map_err(|_| PipelineError::Internal {
                message: "cleanup pool stopped tracking tasks".to_string(),
            })?;

        let mut state = self.lock_state()?;
        Ok(DrainReport {
            completed: std::mem::take(&mut state.completed),
            failures: std::mem::take(&mut state.failures),
        })
    }

    fn lock_state(&self) -> PipelineResult<MutexGuard<'_, PoolState>> {
        handle_mutex_poison(self.state.lock(), |message| PipelineError::Internal {
            message,
        })
    }
}

impl std::fmt::Debug for CleanupPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupPool")
            .field("capacity", &self.capacity)
            .field("in_flight", &self.in_flight_count())
            .finish()
    }
}

/// Single consumer of completions; the only place tasks leave the in-flight set
async fn reap(
    mut completions: mpsc::UnboundedReceiver<Completion>,
    state: Arc<Mutex<PoolState>>,
    in_flight_tx: Arc<watch::Sender<usize>>,
) {
    while let Some(Completion { ticket, result }) = completions.recv().await {
        // Keep reaping after a poisoned lock or drain would never return
        let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(InFlight { mut task, _permit }) = state.in_flight.remove(&ticket) else {
            log::warn!("Completion for unknown cleanup ticket {}", ticket);
            continue;
        };

        match result {
            Ok(()) => {
                task.set_state(TaskState::Done);
                state.completed += 1;
                log::debug!("Cleaned {}", task.page().cleaned_path().display());
            }
            Err(reason) => {
                task.set_state(TaskState::Failed);
                log::warn!(
                    "Cleanup of {} failed: {}",
                    task.page().raw_path().display(),
                    reason
                );
                state.failures.push(TaskFailure {
                    sequence: task.sequence(),
                    page: task.page().clone(),
                    reason,
                });
            }
        }
        in_flight_tx.send_replace(state.in_flight.len());
    }
}
