//! Progress/warning reporting and cancellation, supplied by the caller.
//!
//! The core never prints and never owns a thread; it only calls into a
//! `Reporter` the caller hands it. This keeps `whitebox_stream_network`
//! testable in isolation while the CLI layer's `Reporter` impl can print
//! exactly the way the rest of `whitebox_tools` does (`if verbose { println!
//! ... }` once per percent of progress).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sink for warnings and progress updates emitted by a long-running core
/// operation.
pub trait Reporter {
    /// A non-fatal condition worth surfacing to the caller (e.g. a stray
    /// direction code, a tied mainstem choice).
    fn warn(&mut self, message: &str);

    /// Percent-complete update, `0..=100`. Implementations may ignore
    /// repeated calls with the same value.
    fn progress(&mut self, percent: usize) {
        let _ = percent;
    }
}

/// A `Reporter` that discards everything; useful for tests and for callers
/// that don't care about progress/warnings.
#[derive(Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn warn(&mut self, _message: &str) {}
}

/// A cancellation flag shared between the caller and a running core
/// operation. Polled between outer iterations (per source, per segment, per
/// topological node); once set, the operation returns `CoreError::Cancelled`
/// without writing partial output.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
