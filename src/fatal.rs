//! Fatal error sinks
//!
//! Every contract violation is reported to a [`FatalErrorSink`] exactly once,
//! before the operation returns `Err`. In a deployed system the sink halts
//! ([`HaltOnFatal`]); tests use a sink that records and returns so the typed
//! error can be asserted on.

use std::cell::RefCell;

use crate::error::{FatalCode, RxError};

/// Receiver of contract violations
pub trait FatalErrorSink {
    /// Report one violation. Implementations may never return.
    fn report(&self, error: &RxError);
}

impl<F> FatalErrorSink for F
where
    F: Fn(&RxError),
{
    fn report(&self, error: &RxError) {
        self(error)
    }
}

/// Logs the violation and returns; the caller receives `Err` and must stop
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFatalSink;

impl FatalErrorSink for LogFatalSink {
    fn report(&self, error: &RxError) {
        log::error!("fatal receive buffer violation ({}): {}", code_name(error), error);
    }
}

/// Production sink: logs the violation and aborts the process
#[derive(Debug, Clone, Copy, Default)]
pub struct HaltOnFatal;

impl FatalErrorSink for HaltOnFatal {
    fn report(&self, error: &RxError) {
        log::error!("halting on receive buffer violation ({}): {}", code_name(error), error);
        log::logger().flush();
        std::process::abort();
    }
}

/// Records every reported code, for tests and diagnostics
#[derive(Debug, Default)]
pub struct RecordingFatalSink {
    reports: RefCell<Vec<FatalCode>>,
}

impl RecordingFatalSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes reported so far, oldest first
    pub fn codes(&self) -> Vec<FatalCode> {
        self.reports.borrow().clone()
    }

    /// Most recent code
    pub fn last(&self) -> Option<FatalCode> {
        self.reports.borrow().last().copied()
    }

    /// Number of reports
    pub fn count(&self) -> usize {
        self.reports.borrow().len()
    }

    /// Forget recorded reports
    pub fn clear(&self) {
        self.reports.borrow_mut().clear();
    }
}

impl FatalErrorSink for RecordingFatalSink {
    fn report(&self, error: &RxError) {
        if let Some(code) = error.code() {
            self.reports.borrow_mut().push(code);
        }
    }
}

fn code_name(error: &RxError) -> &'static str {
    error.code().map_or("Unclassified", |code| code.name())
}
