//! Generic error handling utilities
//!
//! Lets the binary report any top-level failure the same way: a single FATAL
//! line for the user, details at debug level.

/// Errors that know whether the user can fix them
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)` with a message the user can act on (bad threshold, unknown
/// analyzer, missing config file). System errors (I/O, git plumbing) return
/// `false` and `None`.
pub trait ContextualError: std::error::Error {
    /// True if the error message should be shown to the user verbatim
    fn is_user_actionable(&self) -> bool;

    /// The user-facing message of an actionable error
    fn user_message(&self) -> Option<&str>;
}

/// Log an error with a level of detail that depends on who can fix it
///
/// User-actionable errors show their own message, system errors show the
/// operation context. The full error is always logged at debug level.
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}: {}", operation_context, error),
    }
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
