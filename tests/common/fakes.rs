//! Fake collaborators recording how the pipeline drove them

use async_trait::async_trait;
use futures::future::{self, FutureExt};
use futures::stream::{self, StreamExt};
use scanpipe::external::{
    DeviceAddress, DeviceLocator, DocumentArranger, DocumentAssembler, PageCleaner, ScanRequest,
    ScanRun, Scanner, ToolError, ToolResult,
};
use scanpipe::pipeline::{CleanupTask, Collaborators, DecisionProvider, PipelineResult};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Locator that finds one fixed device, or none
pub struct FakeLocator {
    address: Option<DeviceAddress>,
    pub calls: AtomicUsize,
}

impl FakeLocator {
    pub fn found() -> Self {
        Self {
            address: Some(DeviceAddress::new("001", "007")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            address: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DeviceLocator for FakeLocator {
    async fn locate(&self, vendor_id: &str) -> ToolResult<DeviceAddress> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.address.clone().ok_or_else(|| ToolError::NoDevice {
            vendor: vendor_id.to_string(),
        })
    }
}

/// One line of scripted scanner output
#[derive(Debug, Clone)]
pub enum Line {
    /// `Scanned document` line for page `n` of the round's output pattern
    Page(u32),
    Noise(&'static str),
    /// Status stream stays open without further output
    Hang,
}

/// Scanner replaying one script per round
pub struct ScriptedScanner {
    rounds: Mutex<VecDeque<Vec<Line>>>,
    requests: Mutex<Vec<ScanRequest>>,
    fail_exit: bool,
}

impl ScriptedScanner {
    pub fn new(rounds: Vec<Vec<Line>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
            fail_exit: false,
        }
    }

    /// Rounds of `pages[i]` pages each, followed by feeder chatter
    pub fn pages(pages: &[u32]) -> Self {
        Self::new(
            pages
                .iter()
                .map(|&count| {
                    let mut lines: Vec<Line> = (1..=count).map(Line::Page).collect();
                    lines.push(Line::Noise("scanadf: sane_start: Document feeder out of documents"));
                    lines
                })
                .collect(),
        )
    }

    /// Driver exits non-zero after its output ends
    pub fn failing_exit(mut self) -> Self {
        self.fail_exit = true;
        self
    }

    pub fn requests(&self) -> Vec<ScanRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scanner for ScriptedScanner {
    async fn start(&self, request: &ScanRequest) -> ToolResult<ScanRun> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.rounds.lock().unwrap().pop_front().unwrap_or_default();
        let pattern = request.output_pattern.to_string_lossy().to_string();

        let mut lines = Vec::new();
        let mut hang = false;
        for line in script {
            match line {
                Line::Page(n) => lines.push(format!(
                    "Scanned document {}",
                    pattern.replace("%d", &n.to_string())
                )),
                Line::Noise(text) => lines.push(text.to_string()),
                Line::Hang => {
                    hang = true;
                    break;
                }
            }
        }

        if hang {
            let lines = stream::iter(lines).chain(stream::pending()).boxed();
            return Ok(ScanRun::new(lines, future::pending().boxed()));
        }
        if self.fail_exit {
            let exit = future::ready(Err(ToolError::Failed {
                program: "scanadf".to_string(),
                status: "exit status: 7".to_string(),
                detail: None,
            }))
            .boxed();
            return Ok(ScanRun::new(stream::iter(lines).boxed(), exit));
        }
        Ok(ScanRun::from_lines(lines))
    }
}

/// Cleaner with per-page delays that tracks concurrency and completion order
pub struct RecordingCleaner {
    delays_ms: Vec<u64>,
    failing: HashSet<u64>,
    current: AtomicUsize,
    max: AtomicUsize,
    completed: Mutex<Vec<u64>>,
}

impl RecordingCleaner {
    /// Page `n` sleeps `delays_ms[n % len]` milliseconds
    pub fn with_delays(delays_ms: Vec<u64>) -> Self {
        Self {
            delays_ms,
            failing: HashSet::new(),
            current: AtomicUsize::new(0),
            max: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn instant() -> Self {
        Self::with_delays(vec![0])
    }

    pub fn failing_on(mut self, sequences: &[u64]) -> Self {
        self.failing = sequences.iter().copied().collect();
        self
    }

    pub fn max_concurrent(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }

    /// Sequence numbers in the order their cleanups finished
    pub fn completion_order(&self) -> Vec<u64> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageCleaner for RecordingCleaner {
    async fn clean(&self, task: &CleanupTask) -> ToolResult<()> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays_ms[task.sequence() as usize % self.delays_ms.len()];
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(task.sequence());
        if self.failing.contains(&task.sequence()) {
            return Err(ToolError::Failed {
                program: "convert".to_string(),
                status: "exit status: 1".to_string(),
                detail: Some("convert: improper image header".to_string()),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAssembler {
    pub calls: Mutex<Vec<(Vec<PathBuf>, PathBuf)>>,
    pub fail: bool,
}

impl RecordingAssembler {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<(Vec<PathBuf>, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentAssembler for RecordingAssembler {
    async fn assemble(&self, pages: &[PathBuf], output: &Path) -> ToolResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((pages.to_vec(), output.to_path_buf()));
        if self.fail {
            return Err(ToolError::Failed {
                program: "img2pdf".to_string(),
                status: "exit status: 1".to_string(),
                detail: None,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingArranger {
    pub documents: Mutex<Vec<PathBuf>>,
}

impl RecordingArranger {
    pub fn documents(&self) -> Vec<PathBuf> {
        self.documents.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentArranger for RecordingArranger {
    async fn arrange(&self, document: &Path) -> ToolResult<()> {
        self.documents.lock().unwrap().push(document.to_path_buf());
        Ok(())
    }
}

/// Operator answers fed to the batch controller
pub struct ScriptedDecisions {
    answers: VecDeque<String>,
    pub asked: Vec<u32>,
}

impl ScriptedDecisions {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl DecisionProvider for ScriptedDecisions {
    async fn read_choice(&mut self, next_round: u32) -> PipelineResult<Option<String>> {
        self.asked.push(next_round);
        Ok(self.answers.pop_front())
    }
}

/// Handles on every fake plus the collaborator set wired to them
pub struct Harness {
    pub locator: Arc<FakeLocator>,
    pub scanner: Arc<ScriptedScanner>,
    pub cleaner: Arc<RecordingCleaner>,
    pub assembler: Arc<RecordingAssembler>,
    pub arranger: Arc<RecordingArranger>,
}

impl Harness {
    pub fn new(scanner: ScriptedScanner, cleaner: RecordingCleaner) -> Self {
        Self {
            locator: Arc::new(FakeLocator::found()),
            scanner: Arc::new(scanner),
            cleaner: Arc::new(cleaner),
            assembler: Arc::new(RecordingAssembler::default()),
            arranger: Arc::new(RecordingArranger::default()),
        }
    }

    pub fn with_locator(mut self, locator: FakeLocator) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    pub fn with_assembler(mut self, assembler: RecordingAssembler) -> Self {
        self.assembler = Arc::new(assembler);
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            locator: self.locator.clone(),
            scanner: self.scanner.clone(),
            cleaner: self.cleaner.clone(),
            assembler: self.assembler.clone(),
            arranger: self.arranger.clone(),
        }
    }
}
