//! Failure vocabulary for storage-facing errors
//!
//! Errors implement [`ErrorClassification`] so their owner can choose between
//! retrying in place, rebuilding, and surfacing the failure without matching
//! on module-specific variants.

use std::fmt;

pub trait ErrorClassification {
    /// The same call may succeed on its own if repeated
    fn is_retryable(&self) -> bool;

    fn severity(&self) -> ErrorSeverity;

    /// Needs a destructive reset or an operator
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}

/// How loudly a failure is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
