//! Application startup: arguments, logging, session and exit code

use super::cli::Args;
use super::prompt::{confirm_removal, ConsolePrompt};
use super::spinner::{run_spinner, should_show_spinner, ProgressSpinner};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::{ShutdownCoordinator, INTERRUPTED_EXIT_CODE};
use crate::core::styles::{palette_to_clap, StyleRole};
use crate::core::validation::ValidationError;
use crate::core::version::long_version;
use crate::pipeline::{
    Collaborators, SessionOutcome, SessionReport, SessionRunner,
};
use clap::{CommandFactory, FromArgMatches};
use std::io::IsTerminal;

pub const EXIT_OK: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_INVALID: i32 = 2;

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let color = std::io::stderr().is_terminal();

    let matches = Args::command().styles(palette_to_clap(color)).get_matches();
    let mut args = match Args::from_arg_matches(&matches) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    // The configuration file may set the log options, so it is read first
    if let Err(e) = args.load_config_file().await {
        report_invalid(&e, color);
        return EXIT_INVALID;
    }

    let log_file = args.effective_log_file().map(|p| p.to_string_lossy().to_string());
    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        log_file.as_deref(),
        color,
    ) {
        eprintln!("{} {}", StyleRole::Error.paint("Error:", color), e);
        return EXIT_INVALID;
    }
    log::info!("scanpipe {} starting", long_version());

    let config = match args.to_pipeline_config() {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Invalid arguments");
            return EXIT_INVALID;
        }
    };
    log::debug!("Pipeline configuration: {:?}", config);

    let (coordinator, _shutdown_rx) = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    let runner =
        SessionRunner::new(config, Collaborators::system()).with_shutdown(coordinator.subscribe());
    let spinner = tokio::spawn(run_spinner(runner.progress(), coordinator.subscribe(), color));

    let mut prompt = ConsolePrompt::new();
    let result = runner.run(&mut prompt).await;

    spinner.abort();
    let _ = spinner.await;
    if should_show_spinner() {
        ProgressSpinner::new(color).finish();
    }

    match result {
        Ok(report) => finish(report, args.yes, color).await,
        Err(e) => {
            log_error_with_context(&e, "Scanning session failed");
            EXIT_FATAL
        }
    }
}

fn report_invalid(error: &ValidationError, color: bool) {
    eprintln!("{} {}", StyleRole::Error.paint("Error:", color), error);
}

/// Print the summary, then keep or remove the working directory
async fn finish(report: SessionReport, assume_yes: bool, color: bool) -> i32 {
    for line in summary_lines(&report, color) {
        println!("{}", line);
    }

    let path = report.work_dir.path().to_path_buf();
    if report.outcome == SessionOutcome::Interrupted {
        let kept = report.work_dir.keep();
        eprintln!("Interrupted; working directory kept at {}", kept.display());
        return INTERRUPTED_EXIT_CODE;
    }

    if confirm_removal(&path, assume_yes).await {
        if let Err(e) = report.work_dir.remove() {
            log::warn!("Could not remove {}: {}", path.display(), e);
        }
    } else {
        let kept = report.work_dir.keep();
        println!("Working directory kept at {}", kept.display());
    }
    EXIT_OK
}

/// Human-readable end-of-session summary
pub fn summary_lines(report: &SessionReport, color: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let rounds = if report.rounds == 1 { "round" } else { "rounds" };

    match &report.outcome {
        SessionOutcome::Assembled { document } => lines.push(format!(
            "{} {} pages from {} {} in {}",
            StyleRole::Success.paint("Assembled", color),
            report.pages.len(),
            report.rounds,
            rounds,
            StyleRole::Literal.paint(&document.display().to_string(), color)
        )),
        SessionOutcome::Empty => lines.push(format!(
            "{} no pages to assemble after {} {}",
            StyleRole::Dim.paint("Nothing scanned:", color),
            report.rounds,
            rounds
        )),
        SessionOutcome::Interrupted => lines.push(format!(
            "{} after {} cleaned pages",
            StyleRole::Error.paint("Interrupted", color),
            report.pages.len()
        )),
    }

    if !report.failures.is_empty() {
        lines.push(format!(
            "{} {} pages could not be cleaned:",
            StyleRole::Invalid.paint("Excluded", color),
            report.failures.len()
        ));
        lines.extend(report.failures.iter().map(|f| format!("  {}", f)));
    }
    lines
}
