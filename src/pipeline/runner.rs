//! Whole-session orchestration
//!
//! Locates the scanner, creates the working directory, runs the batch
//! controller, then assembles the cleaned pages and hands the document to
//! the arranger. Nothing touches the filesystem before the scanner has been
//! found.

use super::controller::{BatchController, DecisionProvider};
use super::error::{PipelineError, PipelineResult};
use super::pool::CleanupPool;
use super::progress::{Phase, ProgressReporter, ProgressWatch};
use super::settings::PipelineConfig;
use super::task::TaskFailure;
use super::workdir::WorkDir;
use crate::external::{
    DeviceLocator, DocumentArranger, DocumentAssembler, Img2Pdf, ImageMagickCleaner,
    LsusbLocator, PageCleaner, PdfArranger, ScanadfScanner, Scanner,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// File name of the assembled document inside the working directory
pub const DOCUMENT_NAME: &str = "cleaned.pdf";

/// The external tools a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub locator: Arc<dyn DeviceLocator>,
    pub scanner: Arc<dyn Scanner>,
    pub cleaner: Arc<dyn PageCleaner>,
    pub assembler: Arc<dyn DocumentAssembler>,
    pub arranger: Arc<dyn DocumentArranger>,
}

impl Collaborators {
    /// Process-backed collaborators for a real scanner
    pub fn system() -> Self {
        Self {
            locator: Arc::new(LsusbLocator::new()),
            scanner: Arc::new(ScanadfScanner::new()),
            cleaner: Arc::new(ImageMagickCleaner::new()),
            assembler: Arc::new(Img2Pdf::new()),
            arranger: Arc::new(PdfArranger::new()),
        }
    }
}

/// How the session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The document was assembled and the arranger closed
    Assembled { document: PathBuf },
    /// No page made it through; nothing was assembled
    Empty,
    /// Stopped by a shutdown signal before assembly
    Interrupted,
}

#[derive(Debug)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    pub work_dir: WorkDir,
    /// Pages that went into the document, in order
    pub pages: Vec<PathBuf>,
    pub failures: Vec<TaskFailure>,
    pub rounds: u32,
}

pub struct SessionRunner {
    config: PipelineConfig,
    collaborators: Collaborators,
    pool: CleanupPool,
    progress: ProgressReporter,
    shutdown: Option<broadcast::Receiver<()>>,
}

impl SessionRunner {
    /// Must be called inside a tokio runtime
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        let pool = CleanupPool::new(config.concurrency, Arc::clone(&collaborators.cleaner));
        Self {
            config,
            collaborators,
            pool,
            progress: ProgressReporter::new(),
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Live progress for display while `run` is in progress
    pub fn progress(&self) -> ProgressWatch {
        ProgressWatch {
            snapshot: self.progress.subscribe(),
            in_flight: self.pool.in_flight_watch(),
        }
    }

    pub async fn run(
        mut self,
        decisions: &mut dyn DecisionProvider,
    ) -> PipelineResult<SessionReport> {
        let address = self
            .collaborators
            .locator
            .locate(&self.config.vendor_id)
            .await
            .map_err(PipelineError::Locate)?;
        let device_name = address.sane_name(&self.config.sane_model);
        log::info!("Using scanner {} ({})", device_name, address);

        let work_dir = WorkDir::create(self.config.work_dir_parent.as_deref())?;
        match self.run_in(&work_dir, device_name, decisions).await {
            Ok((outcome, pages, failures, rounds)) => {
                self.progress.set_phase(Phase::Finished);
                Ok(SessionReport {
                    outcome,
                    work_dir,
                    pages,
                    failures,
                    rounds,
                })
            }
            Err(e) => {
                let kept = work_dir.keep();
                log::warn!("Working directory kept at {}", kept.display());
                Err(e)
            }
        }
    }

    async fn run_in(
        &mut self,
        work_dir: &WorkDir,
        device_name: String,
        decisions: &mut dyn DecisionProvider,
    ) -> PipelineResult<(SessionOutcome, Vec<PathBuf>, Vec<TaskFailure>, u32)> {
        let mut controller = BatchController::new(
            Arc::clone(&self.collaborators.scanner),
            &self.pool,
            &self.progress,
            &self.config,
            device_name,
            work_dir.path(),
        );
        if let Some(shutdown) = self.shutdown.take() {
            controller = controller.with_shutdown(shutdown);
        }
        let batch = controller.run(decisions).await?;

        let document = batch.session.finalize();
        for failure in &batch.failures {
            log::warn!("Excluded from document: {}", failure);
        }
        let pages = document.pages().to_vec();

        let outcome = if batch.interrupted {
            SessionOutcome::Interrupted
        } else if document.is_empty() {
            log::warn!("No pages were cleaned; skipping PDF assembly");
            SessionOutcome::Empty
        } else {
            let path = work_dir.path().join(DOCUMENT_NAME);
            self.assemble(&pages, &path).await?;
            SessionOutcome::Assembled { document: path }
        };

        Ok((outcome, pages, batch.failures, batch.rounds))
    }

    async fn assemble(&self, pages: &[PathBuf], document: &Path) -> PipelineResult<()> {
        self.progress.set_phase(Phase::Assembling);
        self.collaborators
            .assembler
            .assemble(pages, document)
            .await
            .map_err(PipelineError::Assembly)?;

        self.progress.set_phase(Phase::Arranging);
        self.collaborators
            .arranger
            .arrange(document)
            .await
            .map_err(|source| PipelineError::Arrangement {
                document: document.to_path_buf(),
                source,
            })
    }
}
