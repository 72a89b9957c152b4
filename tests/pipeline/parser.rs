//! Status line fixtures through the page event stream

use futures::stream::{self, StreamExt};
use scanpipe::pipeline::{page_events, PageEvent};
use std::path::Path;

const FIXTURE: &[&str] = &[
    "scanadf: rounding value of br-x from 215.9 to 215.88",
    "Scanned document /tmp/scanpipe-ab12/scanned-0-1.pnm",
    "",
    "Scanned document /tmp/scanpipe-ab12/scanned-0-2.pnm   ",
    "Scanned docu",
    "scanned document /tmp/scanpipe-ab12/scanned-0-9.pnm",
    "Scanned document ",
    "Scanned document /tmp/scanpipe-ab12/scanned-0-3.pnm",
    "scanadf: sane_start: Document feeder out of documents",
];

async fn collect(lines: &[&str]) -> Vec<PageEvent> {
    let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
    page_events(stream::iter(lines)).collect().await
}

#[tokio::test]
async fn test_only_complete_prefixed_lines_become_events() {
    let events = collect(FIXTURE).await;
    let raw: Vec<&Path> = events.iter().map(|e| e.raw_path()).collect();
    assert_eq!(
        raw,
        vec![
            Path::new("/tmp/scanpipe-ab12/scanned-0-1.pnm"),
            Path::new("/tmp/scanpipe-ab12/scanned-0-2.pnm"),
            Path::new("/tmp/scanpipe-ab12/scanned-0-3.pnm"),
        ]
    );
}

#[tokio::test]
async fn test_cleaned_names_follow_raw_names() {
    let events = collect(FIXTURE).await;
    assert_eq!(
        events[1].cleaned_path(),
        Path::new("/tmp/scanpipe-ab12/cleaned-0-2.png")
    );
}

#[tokio::test]
async fn test_noise_only_stream_is_empty() {
    let events = collect(&["", "scanadf: device busy", "Scanned"]).await;
    assert!(events.is_empty());
}
