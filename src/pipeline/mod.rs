//! Scanning pipeline
//!
//! Page events parsed from the scanner's status stream are cleaned in a
//! bounded pool while scanning continues. Rounds are driven by the batch
//! controller and aggregated into one ordered session, which the runner
//! assembles into a document at the end.

pub mod controller;
pub mod error;
pub mod events;
pub mod pool;
pub mod progress;
pub mod runner;
pub mod session;
pub mod settings;
pub mod task;
pub mod workdir;

pub use controller::{BatchController, BatchDecision, BatchOutcome, BatchState, DecisionProvider, ScanRound};
pub use error::{PipelineError, PipelineResult};
pub use events::{page_events, parse_line, PageEvent};
pub use pool::{CleanupPool, DrainReport};
pub use progress::{Phase, ProgressReporter, ProgressSnapshot, ProgressWatch};
pub use runner::{Collaborators, SessionOutcome, SessionReport, SessionRunner};
pub use session::{Session, SessionDocument};
pub use settings::{ColorMode, PipelineConfig};
pub use task::{CleanupOptions, CleanupTask, TaskFailure, TaskState};
pub use workdir::WorkDir;
