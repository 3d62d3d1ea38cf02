//! Escalation execution records

use crate::tier::EscalationTier;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique escalation identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EscalationId(pub Ulid);

impl EscalationId {
    /// Generate new escalation ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for EscalationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EscalationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an escalation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationStatus {
    /// Awaiting human action
    Active,
    /// Closed with a resolution
    Resolved,
    /// Withdrawn without a resolution
    Cancelled,
}

impl EscalationStatus {
    /// Status label
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EscalationStatus::Active => "active",
            EscalationStatus::Resolved => "resolved",
            EscalationStatus::Cancelled => "cancelled",
        }
    }
}

/// One tracked escalation
///
/// Retained indefinitely for audit history; status and `resolved_at` are
/// the only fields that mutate after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationExecution {
    /// Identifier
    pub id: EscalationId,
    /// Owning organization
    pub org_id: String,
    /// Title of the alert that required escalation
    pub alert_title: String,
    /// Escalation level, 1-indexed ascending severity
    pub level: u8,
    /// Why the escalation was raised
    pub reason: String,
    /// Who the escalation is assigned to
    pub assigned_to: String,
    /// Lifecycle state
    pub status: EscalationStatus,
    /// When the escalation was raised
    pub escalated_at: DateTime<Utc>,
    /// When it was resolved, if it has been
    pub resolved_at: Option<DateTime<Utc>>,
}

impl EscalationExecution {
    /// Assignment tier for this escalation's level
    #[inline]
    #[must_use]
    pub fn tier(&self) -> EscalationTier {
        EscalationTier::from_level(self.level)
    }

    /// Time from escalation to resolution, for resolved records
    #[inline]
    #[must_use]
    pub fn resolution_time(&self) -> Option<Duration> {
        self.resolved_at.map(|at| at - self.escalated_at)
    }

    /// Whether the escalation still awaits action
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EscalationStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: u8) -> EscalationExecution {
        EscalationExecution {
            id: EscalationId::new(),
            org_id: "org-1".to_string(),
            alert_title: "New critical incident".to_string(),
            level,
            reason: "Critical alert raised".to_string(),
            assigned_to: "cro".to_string(),
            status: EscalationStatus::Active,
            escalated_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn escalation_id_generation() {
        let a = EscalationId::new();
        let b = EscalationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn tier_follows_level() {
        assert_eq!(record(2).tier(), EscalationTier::SeniorManagement);
        assert_eq!(record(9).tier(), EscalationTier::Unassigned);
    }

    #[test]
    fn resolution_time_requires_resolved_at() {
        let mut rec = record(1);
        assert!(rec.resolution_time().is_none());

        rec.resolved_at = Some(rec.escalated_at + Duration::hours(3));
        assert_eq!(rec.resolution_time(), Some(Duration::hours(3)));
    }
}
