//! Derived system metrics
//!
//! Always recomputed from the current alert window and escalation records;
//! never stored or independently mutated.

use orp_alert::{Alert, AlertCategory, AlertSeverity};
use orp_escalation::EscalationExecution;

/// Point-in-time posture derived from the live collections
#[derive(Debug, Clone, PartialEq)]
pub struct SystemMetrics {
    /// Unacknowledged incident alerts in the window
    pub active_incidents: usize,
    /// KRI breach alerts in the window
    pub kri_breaches: usize,
    /// Active escalations at senior-management level or above, i.e. the
    /// ones awaiting a sign-off
    pub pending_approvals: usize,
    /// Health score: 100 minus a weighted penalty per unacknowledged
    /// high/critical alert, floored at 0
    pub system_health_pct: f64,
    /// Compliance score: 100 minus a weighted penalty per breach alert and
    /// per active escalation, floored at 0
    pub compliance_score_pct: f64,
}

impl SystemMetrics {
    /// Compute metrics from the current collections
    #[must_use]
    pub fn compute(alerts: &[Alert], active_escalations: &[EscalationExecution]) -> Self {
        let active_incidents = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::Incident && !a.acknowledged)
            .count();
        let kri_breaches = alerts
            .iter()
            .filter(|a| a.category == AlertCategory::KriBreach)
            .count();
        let pending_approvals = active_escalations
            .iter()
            .filter(|e| e.level >= 2)
            .count();

        let critical_open = alerts
            .iter()
            .filter(|a| !a.acknowledged && a.severity == AlertSeverity::Critical)
            .count();
        let high_open = alerts
            .iter()
            .filter(|a| !a.acknowledged && a.severity == AlertSeverity::High)
            .count();

        let system_health_pct =
            (100.0 - 20.0 * critical_open as f64 - 10.0 * high_open as f64).max(0.0);
        let compliance_score_pct = (100.0
            - 15.0 * kri_breaches as f64
            - 10.0 * active_escalations.len() as f64)
            .max(0.0);

        Self {
            active_incidents,
            kri_breaches,
            pending_approvals,
            system_health_pct,
            compliance_score_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use orp_escalation::{EscalationId, EscalationStatus};
    use uuid::Uuid;

    fn alert(category: AlertCategory, severity: AlertSeverity, acknowledged: bool) -> Alert {
        let mut alert = Alert::new(
            Uuid::new_v4(),
            "org-1",
            category,
            severity,
            "title",
            "detail",
            Utc::now(),
            "test",
        );
        alert.acknowledged = acknowledged;
        alert
    }

    fn escalation(level: u8) -> EscalationExecution {
        EscalationExecution {
            id: EscalationId::new(),
            org_id: "org-1".to_string(),
            alert_title: "title".to_string(),
            level,
            reason: "reason".to_string(),
            assigned_to: "assignee".to_string(),
            status: EscalationStatus::Active,
            escalated_at: Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn empty_collections_score_perfectly() {
        let metrics = SystemMetrics::compute(&[], &[]);
        assert_eq!(metrics.active_incidents, 0);
        assert_eq!(metrics.system_health_pct, 100.0);
        assert_eq!(metrics.compliance_score_pct, 100.0);
    }

    #[test]
    fn acknowledged_incidents_leave_the_active_count() {
        let alerts = vec![
            alert(AlertCategory::Incident, AlertSeverity::Critical, false),
            alert(AlertCategory::Incident, AlertSeverity::High, true),
        ];
        let metrics = SystemMetrics::compute(&alerts, &[]);
        assert_eq!(metrics.active_incidents, 1);
        // Only the unacknowledged critical one is penalized
        assert_eq!(metrics.system_health_pct, 80.0);
    }

    #[test]
    fn pending_approvals_count_senior_levels_only() {
        let escalations = vec![escalation(1), escalation(2), escalation(3)];
        let metrics = SystemMetrics::compute(&[], &escalations);
        assert_eq!(metrics.pending_approvals, 2);
    }

    #[test]
    fn scores_floor_at_zero() {
        let alerts: Vec<Alert> = (0..8)
            .map(|_| alert(AlertCategory::KriBreach, AlertSeverity::Critical, false))
            .collect();
        let metrics = SystemMetrics::compute(&alerts, &[]);
        assert_eq!(metrics.system_health_pct, 0.0);
        assert_eq!(metrics.compliance_score_pct, 0.0);
        assert_eq!(metrics.kri_breaches, 8);
    }
}
