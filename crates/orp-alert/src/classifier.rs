//! Alert qualification and mapping rules
//!
//! Decides, per change event, whether it becomes a user-visible alert and
//! with what severity, category and description. Pure: produces zero or one
//! alert per event and nothing else; persistence and dispatch belong to the
//! caller.
//!
//! Qualification rules, by source table:
//! - incident inserts qualify only at high or critical severity
//! - appetite-breach inserts always qualify
//! - dependency inserts and updates qualify only while the tolerance is
//!   breached; a critical impact level escalates the alert to critical

use crate::alert::{Alert, AlertCategory};
use crate::severity::AlertSeverity;
use chrono::Utc;
use orp_event::{BreachRow, ChangeEvent, ChangeOp, DependencyRow, IncidentRow, RowPayload};

/// Fallback description when an incident row carries no title
pub const UNTITLED_INCIDENT: &str = "Untitled incident";

/// Fallback narrative when a dependency row carries no description
pub const NO_FAILURE_DETAIL: &str = "No failure detail recorded";

/// Classify one change event into zero or one alert
#[must_use]
pub fn classify(event: &ChangeEvent) -> Option<Alert> {
    let row = event.row()?;
    match row {
        RowPayload::Incident(incident) => classify_incident(event.op, incident),
        RowPayload::Breach(breach) => classify_breach(event.op, breach),
        RowPayload::Dependency(dependency) => classify_dependency(event.op, dependency),
    }
}

fn classify_incident(op: ChangeOp, row: &IncidentRow) -> Option<Alert> {
    if op != ChangeOp::Insert {
        return None;
    }
    let severity = AlertSeverity::from_label(&row.severity)?;
    if !severity.at_least(AlertSeverity::High) {
        return None;
    }
    let description = if row.title.is_empty() {
        UNTITLED_INCIDENT.to_string()
    } else {
        row.title.clone()
    };
    Some(Alert::new(
        row.id,
        row.org_id.clone(),
        AlertCategory::Incident,
        severity,
        format!("New {severity} incident"),
        description,
        row.occurred_at.unwrap_or_else(Utc::now),
        "incident-log",
    ))
}

fn classify_breach(op: ChangeOp, row: &BreachRow) -> Option<Alert> {
    if op != ChangeOp::Insert {
        return None;
    }
    // Every logged breach is user-visible regardless of severity
    let severity = AlertSeverity::from_label(&row.severity).unwrap_or(AlertSeverity::Medium);
    let kri = if row.kri_name.is_empty() {
        "unnamed KRI"
    } else {
        row.kri_name.as_str()
    };
    Some(Alert::new(
        row.id,
        row.org_id.clone(),
        AlertCategory::KriBreach,
        severity,
        format!("Risk appetite breach: {kri}"),
        format!(
            "Threshold breached: {} vs {}",
            row.actual_value, row.threshold_value
        ),
        row.breached_at.unwrap_or_else(Utc::now),
        "risk-appetite",
    ))
}

fn classify_dependency(op: ChangeOp, row: &DependencyRow) -> Option<Alert> {
    // Tolerance flags flip on updates, so both inserts and updates qualify
    if op == ChangeOp::Delete {
        return None;
    }
    if !row.tolerance_breached {
        return None;
    }
    let severity = if AlertSeverity::from_label(&row.impact_level) == Some(AlertSeverity::Critical)
    {
        AlertSeverity::Critical
    } else {
        AlertSeverity::High
    };
    let detail = row.description.as_deref().unwrap_or(NO_FAILURE_DETAIL);
    Some(Alert::new(
        row.id,
        row.org_id.clone(),
        AlertCategory::DependencyFailure,
        severity,
        "Dependency tolerance breached".to_string(),
        format!("{}: {detail}", row.dependency_name),
        Utc::now(),
        "dependency-monitor",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orp_event::{RawChange, TableKind};
    use serde_json::json;
    use uuid::Uuid;

    fn incident_event(op: ChangeOp, severity: &str, title: &str) -> ChangeEvent {
        let raw = RawChange::new_row(
            TableKind::IncidentLogs.as_str(),
            op,
            json!({"id": Uuid::new_v4(), "org_id": "org-1", "title": title, "severity": severity}),
        );
        ChangeEvent::decode(&raw).unwrap()
    }

    fn breach_event(severity: &str, actual: f64, threshold: f64) -> ChangeEvent {
        let raw = RawChange::new_row(
            TableKind::AppetiteBreachLogs.as_str(),
            ChangeOp::Insert,
            json!({
                "id": Uuid::new_v4(),
                "org_id": "org-1",
                "kri_name": "settlement-lag",
                "severity": severity,
                "actual_value": actual,
                "threshold_value": threshold,
            }),
        );
        ChangeEvent::decode(&raw).unwrap()
    }

    fn dependency_event(op: ChangeOp, breached: bool, impact: &str) -> ChangeEvent {
        let raw = RawChange::new_row(
            TableKind::DependencyLogs.as_str(),
            op,
            json!({
                "id": Uuid::new_v4(),
                "org_id": "org-1",
                "dependency_name": "payments-gateway",
                "tolerance_breached": breached,
                "impact_level": impact,
            }),
        );
        ChangeEvent::decode(&raw).unwrap()
    }

    #[test]
    fn low_and_medium_incidents_do_not_qualify() {
        for severity in ["low", "medium"] {
            let event = incident_event(ChangeOp::Insert, severity, "minor blip");
            assert!(classify(&event).is_none(), "{severity} must not qualify");
        }
    }

    #[test]
    fn high_and_critical_incidents_qualify() {
        let event = incident_event(ChangeOp::Insert, "critical", "Core banking outage");
        let alert = classify(&event).expect("critical incident qualifies");
        assert_eq!(alert.category, AlertCategory::Incident);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.title, "New critical incident");
        assert_eq!(alert.description, "Core banking outage");
        assert_eq!(alert.source, "incident-log");

        let event = incident_event(ChangeOp::Insert, "high", "ATM degraded");
        assert_eq!(classify(&event).unwrap().severity, AlertSeverity::High);
    }

    #[test]
    fn incident_updates_do_not_qualify() {
        let event = incident_event(ChangeOp::Update, "critical", "still down");
        assert!(classify(&event).is_none());
    }

    #[test]
    fn unknown_incident_severity_does_not_qualify() {
        let event = incident_event(ChangeOp::Insert, "catastrophic", "mystery");
        assert!(classify(&event).is_none());
    }

    #[test]
    fn every_breach_insert_qualifies() {
        for severity in ["low", "medium", "high", "critical", ""] {
            let event = breach_event(severity, 12.5, 10.0);
            let alert = classify(&event).expect("breach inserts always qualify");
            assert_eq!(alert.category, AlertCategory::KriBreach);
            assert_eq!(alert.description, "Threshold breached: 12.5 vs 10");
        }
    }

    #[test]
    fn breach_severity_falls_back_to_medium() {
        let event = breach_event("", 1.0, 2.0);
        assert_eq!(classify(&event).unwrap().severity, AlertSeverity::Medium);
    }

    #[test]
    fn dependency_requires_breached_tolerance() {
        let event = dependency_event(ChangeOp::Insert, false, "critical");
        assert!(classify(&event).is_none());
    }

    #[test]
    fn dependency_severity_follows_impact_level() {
        let event = dependency_event(ChangeOp::Update, true, "critical");
        let alert = classify(&event).expect("breached tolerance qualifies");
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.category, AlertCategory::DependencyFailure);

        let event = dependency_event(ChangeOp::Insert, true, "moderate");
        assert_eq!(classify(&event).unwrap().severity, AlertSeverity::High);
    }

    #[test]
    fn dependency_detail_falls_back_when_missing() {
        let event = dependency_event(ChangeOp::Insert, true, "high");
        let alert = classify(&event).unwrap();
        assert_eq!(alert.description, format!("payments-gateway: {NO_FAILURE_DETAIL}"));
    }

    #[test]
    fn alert_id_is_reused_from_source_row() {
        let id = Uuid::new_v4();
        let raw = RawChange::new_row(
            TableKind::IncidentLogs.as_str(),
            ChangeOp::Insert,
            json!({"id": id, "org_id": "org-1", "title": "x", "severity": "high"}),
        );
        let event = ChangeEvent::decode(&raw).unwrap();
        assert_eq!(classify(&event).unwrap().id, id);
    }
}
