//! Synchronization utilities for robust mutex handling
//!
//! Lock poisoning is converted into a caller-supplied error instead of
//! panicking, so a panic inside one cleanup completion cannot take the
//! control loop down with it.

use std::sync::LockResult;

/// Handle poisoned mutex cases with consistent error handling
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use scanpipe::core::sync::handle_mutex_poison;
/// use scanpipe::pipeline::PipelineError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| PipelineError::Internal { message },
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). This indicates a panic occurred while holding a lock. PoisonError: {:?}",
            poison_err
        ))
    })
}
