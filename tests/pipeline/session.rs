//! Whole sessions: locate, rounds, assembly, arrangement

use crate::common::fakes::{
    FakeLocator, Harness, Line, RecordingAssembler, RecordingCleaner, ScriptedDecisions,
    ScriptedScanner,
};
use scanpipe::pipeline::{PipelineConfig, PipelineError, SessionOutcome, SessionRunner};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::timeout;

fn config(parent: &TempDir, concurrency: usize, batch: bool) -> PipelineConfig {
    PipelineConfig {
        concurrency,
        batch,
        work_dir_parent: Some(parent.path().to_path_buf()),
        ..PipelineConfig::default()
    }
}

fn names(pages: &[PathBuf]) -> Vec<String> {
    pages
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[tokio::test]
async fn test_single_round_end_to_end_with_one_slot() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        ScriptedScanner::new(vec![vec![
            Line::Page(1),
            Line::Noise("scanadf: rounding value of br-y"),
            Line::Page(2),
        ]]),
        RecordingCleaner::with_delays(vec![20, 0]),
    );
    let runner = SessionRunner::new(config(&parent, 1, false), harness.collaborators());

    let report = runner.run(&mut ScriptedDecisions::none()).await.unwrap();

    assert_eq!(harness.cleaner.max_concurrent(), 1);
    assert_eq!(harness.cleaner.completion_order(), vec![0, 1]);
    assert_eq!(names(&report.pages), vec!["cleaned-0-1.png", "cleaned-0-2.png"]);
    assert!(report.pages.iter().all(|p| p.starts_with(report.work_dir.path())));

    let document = report.work_dir.path().join("cleaned.pdf");
    assert_eq!(
        report.outcome,
        SessionOutcome::Assembled {
            document: document.clone()
        }
    );
    assert_eq!(harness.assembler.calls(), vec![(report.pages.clone(), document.clone())]);
    assert_eq!(harness.arranger.documents(), vec![document]);

    let request = &harness.scanner.requests()[0];
    assert_eq!(request.device_name, "BrotherADS2700:libusb:001:007");
    assert!(!request.duplex);
    assert_eq!(report.rounds, 1);
}

#[tokio::test]
async fn test_zero_pages_skips_assembly() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(ScriptedScanner::pages(&[0]), RecordingCleaner::instant());
    let runner = SessionRunner::new(config(&parent, 4, false), harness.collaborators());

    let report = runner.run(&mut ScriptedDecisions::none()).await.unwrap();

    assert_eq!(report.outcome, SessionOutcome::Empty);
    assert!(report.pages.is_empty());
    assert!(harness.assembler.calls().is_empty());
    assert!(harness.arranger.documents().is_empty());
}

#[tokio::test]
async fn test_missing_scanner_aborts_before_any_work() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(ScriptedScanner::pages(&[3]), RecordingCleaner::instant())
        .with_locator(FakeLocator::missing());
    let runner = SessionRunner::new(config(&parent, 4, false), harness.collaborators());

    let err = runner.run(&mut ScriptedDecisions::none()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Locate(_)));
    assert!(harness.scanner.requests().is_empty());
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_batch_rounds_keep_scan_order_despite_completion_order() {
    let parent = tempfile::tempdir().unwrap();
    // Later pages finish first within every round
    let harness = Harness::new(
        ScriptedScanner::pages(&[3, 2, 2]),
        RecordingCleaner::with_delays(vec![60, 30, 0]),
    );
    let runner = SessionRunner::new(config(&parent, 3, true), harness.collaborators());
    let mut decisions = ScriptedDecisions::new(&["s", "bogus", "D", ""]);

    let report = runner.run(&mut decisions).await.unwrap();

    assert_eq!(
        names(&report.pages),
        vec![
            "cleaned-0-1.png",
            "cleaned-0-2.png",
            "cleaned-0-3.png",
            "cleaned-1-1.png",
            "cleaned-1-2.png",
            "cleaned-2-1.png",
            "cleaned-2-2.png",
        ]
    );
    assert_ne!(
        harness.cleaner.completion_order()[..3],
        [0, 1, 2],
        "cleanups should have finished out of order"
    );

    let duplex: Vec<bool> = harness.scanner.requests().iter().map(|r| r.duplex).collect();
    assert_eq!(duplex, vec![false, false, true]);
    assert_eq!(report.rounds, 3);
    // Invalid answer re-asked for the same round
    assert_eq!(decisions.asked, vec![1, 2, 2, 3]);
}

#[tokio::test]
async fn test_duplex_flag_applies_to_first_round() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(ScriptedScanner::pages(&[1]), RecordingCleaner::instant());
    let mut config = config(&parent, 2, false);
    config.duplex = true;
    let runner = SessionRunner::new(config, harness.collaborators());

    runner.run(&mut ScriptedDecisions::none()).await.unwrap();

    let request = &harness.scanner.requests()[0];
    assert!(request.duplex);
    assert_eq!(request.source(), "Automatic Document Feeder(left aligned,Duplex)");
}

#[tokio::test]
async fn test_failed_cleanup_excluded_and_reported() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        ScriptedScanner::pages(&[3]),
        RecordingCleaner::instant().failing_on(&[1]),
    );
    let runner = SessionRunner::new(config(&parent, 2, false), harness.collaborators());

    let report = runner.run(&mut ScriptedDecisions::none()).await.unwrap();

    assert_eq!(names(&report.pages), vec!["cleaned-0-1.png", "cleaned-0-3.png"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].sequence, 1);
    assert_eq!(harness.assembler.calls()[0].0, report.pages);
}

#[tokio::test]
async fn test_scanner_exit_error_is_not_fatal() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        ScriptedScanner::pages(&[2]).failing_exit(),
        RecordingCleaner::instant(),
    );
    let runner = SessionRunner::new(config(&parent, 2, false), harness.collaborators());

    let report = runner.run(&mut ScriptedDecisions::none()).await.unwrap();
    assert!(matches!(report.outcome, SessionOutcome::Assembled { .. }));
    assert_eq!(report.pages.len(), 2);
}

#[tokio::test]
async fn test_assembly_failure_is_fatal_and_keeps_work_dir() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(ScriptedScanner::pages(&[1]), RecordingCleaner::instant())
        .with_assembler(RecordingAssembler::failing());
    let runner = SessionRunner::new(config(&parent, 2, false), harness.collaborators());

    let err = runner.run(&mut ScriptedDecisions::none()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Assembly(_)));
    assert!(harness.arranger.documents().is_empty());
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_interrupt_drains_and_skips_assembly() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(
        ScriptedScanner::new(vec![vec![Line::Page(1), Line::Page(2), Line::Hang]]),
        RecordingCleaner::with_delays(vec![30]),
    );
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let runner = SessionRunner::new(config(&parent, 2, true), harness.collaborators())
        .with_shutdown(shutdown_rx);

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let _ = shutdown_tx.send(());
        shutdown_tx
    });

    let report = timeout(Duration::from_secs(5), runner.run(&mut ScriptedDecisions::none()))
        .await
        .expect("interrupted session should end")
        .unwrap();

    assert_eq!(report.outcome, SessionOutcome::Interrupted);
    // Both submitted cleanups were drained, not cancelled
    assert_eq!(harness.cleaner.completion_order().len(), 2);
    assert_eq!(report.pages.len(), 2);
    assert!(harness.assembler.calls().is_empty());
    let _ = trigger.await;
}

#[tokio::test]
async fn test_progress_reaches_finished() {
    let parent = tempfile::tempdir().unwrap();
    let harness = Harness::new(ScriptedScanner::pages(&[2]), RecordingCleaner::instant());
    let runner = SessionRunner::new(config(&parent, 2, false), harness.collaborators());
    let progress = runner.progress();

    runner.run(&mut ScriptedDecisions::none()).await.unwrap();

    let snapshot = *progress.snapshot.borrow();
    assert_eq!(snapshot.phase, scanpipe::pipeline::Phase::Finished);
    assert_eq!(snapshot.scanned, 2);
    assert_eq!(*progress.in_flight.borrow(), 0);
}
