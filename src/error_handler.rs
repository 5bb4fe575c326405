use crate::Error;

/// A sink for recoverable errors.
///
/// The decision core never returns these errors from lookups; a miss returns an empty default
/// and the structured error is handed to this sink instead, once per occurrence.
pub trait ErrorHandler: Send + Sync {
    /// Handle a recoverable error.
    ///
    /// This method should not panic. It is called on the decision path, so it should not block
    /// the calling thread either.
    fn handle_error(&self, error: &Error);
}

/// Ignores every error.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpErrorHandler;

impl ErrorHandler for NoOpErrorHandler {
    fn handle_error(&self, _error: &Error) {}
}

impl<T: Fn(&Error) + Send + Sync> ErrorHandler for T {
    fn handle_error(&self, error: &Error) {
        self(error);
    }
}
