//! Progress spinner for terminal feedback
//!
//! Renders the pipeline's progress snapshot next to a braille spinner on
//! stderr. The line is cleared while the operator is being asked for the
//! next batch so the prompt owns the terminal.

use crate::core::styles::StyleRole;
use crate::pipeline::progress::{Phase, ProgressWatch};
use std::io::Write;
use tokio::sync::broadcast;
use tokio::time::{interval, Duration};

const BRAILLE_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Check if spinner should be displayed
pub fn should_show_spinner() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stderr()) && !log::log_enabled!(log::Level::Info)
}

pub struct ProgressSpinner {
    frame_index: usize,
    color: bool,
}

impl ProgressSpinner {
    pub fn new(color: bool) -> Self {
        Self {
            frame_index: 0,
            color,
        }
    }

    pub fn tick(&mut self, message: &str) {
        let frame = BRAILLE_FRAMES[self.frame_index];
        self.frame_index = (self.frame_index + 1) % BRAILLE_FRAMES.len();

        // Clear line and show spinner with message
        eprint!("\r\x1b[2K{frame} {message}");
        let _ = std::io::stderr().flush();
    }

    /// Replace the spinner line with a completed step
    pub fn complete(&self, message: &str) {
        let mark = StyleRole::Success.paint("✔", self.color);
        eprintln!("\r\x1b[2K{mark} {message}");
    }

    pub fn finish(&self) {
        eprint!("\r\x1b[2K");
        let _ = std::io::stderr().flush();
    }
}

/// Run the spinner until the pipeline finishes or shutdown is requested
pub async fn run_spinner(
    mut progress: ProgressWatch,
    mut shutdown_rx: broadcast::Receiver<()>,
    color: bool,
) {
    if !should_show_spinner() {
        return;
    }

    let mut spinner = ProgressSpinner::new(color);
    let mut update_interval = interval(Duration::from_millis(100)); // 10Hz
    let mut last_phase = Phase::Idle;
    let mut last_line = String::new();

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                spinner.finish();
                return;
            }

            changed = progress.snapshot.changed() => {
                if changed.is_err() {
                    spinner.finish();
                    return;
                }
                let phase = progress.snapshot.borrow_and_update().phase;
                if phase != last_phase {
                    if matches!(last_phase, Phase::Scanning | Phase::Processing | Phase::Assembling) {
                        spinner.complete(&last_line);
                    }
                    last_phase = phase;
                }
                match phase {
                    Phase::Finished => {
                        spinner.finish();
                        return;
                    }
                    Phase::AwaitingDecision => spinner.finish(),
                    _ => {}
                }
            }

            _ = update_interval.tick() => {
                if !matches!(last_phase, Phase::AwaitingDecision | Phase::Idle) {
                    last_line = progress.status_line();
                    spinner.tick(&last_line);
                }
            }
        }
    }
}
