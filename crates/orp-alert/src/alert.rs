//! Normalized alert record

use crate::severity::AlertSeverity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Alert category, fixed per source table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// Operational incident
    Incident,
    /// Key-risk-indicator appetite breach
    KriBreach,
    /// Critical-dependency tolerance failure
    DependencyFailure,
    /// Compliance gap
    ///
    /// Part of the alert vocabulary but no event source is wired to produce
    /// it yet; the classifier never emits this variant.
    ComplianceGap,
}

impl AlertCategory {
    /// Category label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCategory::Incident => "incident",
            AlertCategory::KriBreach => "kri_breach",
            AlertCategory::DependencyFailure => "dependency_failure",
            AlertCategory::ComplianceGap => "compliance_gap",
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized alert derived from a qualifying change event
///
/// Created by the classifier, mutated only by acknowledgement, never
/// deleted; retention is the feed's rolling window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Identifier, reused from the source row
    pub id: Uuid,
    /// Owning organization
    pub org_id: String,
    /// Category
    pub category: AlertCategory,
    /// Severity
    pub severity: AlertSeverity,
    /// Short headline
    pub title: String,
    /// Field-interpolated description
    pub description: String,
    /// When the underlying event occurred
    pub timestamp: DateTime<Utc>,
    /// Whether a user has acknowledged the alert
    pub acknowledged: bool,
    /// Module that sourced the event
    pub source: String,
}

impl Alert {
    /// Create an unacknowledged alert
    #[inline]
    #[must_use]
    pub fn new(
        id: Uuid,
        org_id: impl Into<String>,
        category: AlertCategory,
        severity: AlertSeverity,
        title: impl Into<String>,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            org_id: org_id.into(),
            category,
            severity,
            title: title.into(),
            description: description.into(),
            timestamp,
            acknowledged: false,
            source: source.into(),
        }
    }
}

/// Alert feed errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    /// No alert with the given id is in the window
    #[error("alert {0} not found")]
    NotFound(Uuid),
}
