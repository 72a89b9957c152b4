//! Generic error handling utilities
//!
//! Fatal errors from any layer are reported through one function so the
//! terminal always shows a single `FATAL:` line, with the full error chain
//! available at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a message the operator can act on (plug in the scanner,
/// fix a configuration value). System errors return `None` and are reported
/// with the generic operation context instead.
pub trait ContextualError: std::error::Error {
    /// Returns true if this error carries a message the operator can act on
    fn is_user_actionable(&self) -> bool;

    /// Returns the specific user message if this is a user-actionable error
    fn user_message(&self) -> Option<String>;
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use scanpipe::core::error_handling::log_error_with_context;
/// # use scanpipe::core::validation::ValidationError;
/// let err = ValidationError::new("Resolution must be one of 100, 150, 200, 300, 400, 600");
/// log_error_with_context(&err, "Argument validation");
/// // Logs: "FATAL: Resolution must be one of 100, 150, 200, 300, 400, 600"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}: {}", operation_context, error),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}

/// Render an error and its `source()` chain as a single line
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
