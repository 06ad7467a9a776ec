// report.rs — Error reporting collaborator.

use std::error::Error;

/// Fire-and-forget error reporting. Implementations must never panic.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, context: &str, error: &dyn Error);
}

/// Reports errors through `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, context: &str, error: &dyn Error) {
        tracing::error!(context, "{}", error);
    }
}
