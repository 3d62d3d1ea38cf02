//! Normalized error reporting
//!
//! Every failure caught at a boundary is converted into one `ErrorReport`,
//! logged with its context, and retained in a bounded buffer that backs the
//! user-facing failure surface. Nothing propagates uncaught past the
//! boundary that produced the report.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;

/// Default retained-report capacity
pub const DEFAULT_CAPACITY: usize = 32;

/// Normalized record of one caught failure
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// Human-readable message
    pub message: String,
    /// Optional machine code
    pub code: Option<String>,
    /// Label of the boundary that caught the failure
    pub context: String,
    /// When the failure was caught
    pub at: DateTime<Utc>,
}

/// Bounded buffer of recent error reports
#[derive(Debug)]
pub struct ErrorReporter {
    buffer: Mutex<VecDeque<ErrorReport>>,
    cap: usize,
}

impl ErrorReporter {
    /// Create a reporter with the default capacity
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a reporter retaining at most `cap` reports (minimum 1)
    #[inline]
    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::new()),
            cap: cap.max(1),
        }
    }

    /// Normalize, log and retain one failure
    pub fn report(&self, context: &str, error: &dyn fmt::Display) -> ErrorReport {
        self.push(context, error, None)
    }

    /// Normalize, log and retain one failure with a machine code
    pub fn report_with_code(
        &self,
        context: &str,
        error: &dyn fmt::Display,
        code: impl Into<String>,
    ) -> ErrorReport {
        self.push(context, error, Some(code.into()))
    }

    fn push(&self, context: &str, error: &dyn fmt::Display, code: Option<String>) -> ErrorReport {
        let report = ErrorReport {
            message: error.to_string(),
            code,
            context: context.to_string(),
            at: Utc::now(),
        };
        tracing::error!(
            context = %report.context,
            code = report.code.as_deref().unwrap_or("-"),
            "{}",
            report.message
        );
        let mut guard = self.buffer.lock();
        if guard.len() == self.cap {
            guard.pop_front();
        }
        guard.push_back(report.clone());
        report
    }

    /// Snapshot of retained reports, most recent first
    #[must_use]
    pub fn recent(&self) -> Vec<ErrorReport> {
        self.buffer.lock().iter().rev().cloned().collect()
    }

    /// Number of retained reports
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Whether no report has been retained
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}
