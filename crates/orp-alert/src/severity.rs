//! Alert severity vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an alert, ascending
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// Severity label as stored on source rows
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
            AlertSeverity::High => "high",
            AlertSeverity::Critical => "critical",
        }
    }

    /// Parse a severity label from a source row
    ///
    /// Lenient on case; unknown labels yield `None` so the caller decides
    /// its own fallback.
    #[inline]
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(AlertSeverity::Low),
            "medium" => Some(AlertSeverity::Medium),
            "high" => Some(AlertSeverity::High),
            "critical" => Some(AlertSeverity::Critical),
            _ => None,
        }
    }

    /// Whether this severity sits at the top of the scale
    #[inline]
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, AlertSeverity::Critical)
    }

    /// Whether this severity meets or exceeds a floor
    #[inline]
    #[must_use]
    pub fn at_least(&self, floor: AlertSeverity) -> bool {
        *self >= floor
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
