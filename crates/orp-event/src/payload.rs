//! Typed row payloads per source table
//!
//! The change stream delivers loosely-typed key-value rows; this module
//! resolves them into one tagged variant per known table so downstream
//! classification can match exhaustively. Decoding is tolerant: missing
//! fields take their documented defaults and a payload that fails to decode
//! altogether falls back to the default row.

use crate::event::TableKind;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incident-log row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IncidentRow {
    /// Row identifier (reused as the alert identifier)
    pub id: Uuid,
    /// Owning organization
    pub org_id: String,
    /// Incident title
    pub title: String,
    /// Incident description
    pub description: String,
    /// Declared severity label (low/medium/high/critical)
    pub severity: String,
    /// Workflow status
    pub status: String,
    /// When the incident occurred
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Risk-appetite breach-log row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BreachRow {
    /// Row identifier (reused as the alert identifier)
    pub id: Uuid,
    /// Owning organization
    pub org_id: String,
    /// Breached key risk indicator
    pub kri_name: String,
    /// Measured value at breach time
    pub actual_value: f64,
    /// Configured tolerance threshold
    pub threshold_value: f64,
    /// Declared severity label
    pub severity: String,
    /// Business-impact narrative, if recorded
    pub business_impact: Option<String>,
    /// When the breach was logged
    pub breached_at: Option<DateTime<Utc>>,
}

/// Dependency-monitoring row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyRow {
    /// Row identifier (reused as the alert identifier)
    pub id: Uuid,
    /// Owning organization
    pub org_id: String,
    /// Monitored dependency name
    pub dependency_name: String,
    /// Whether the disruption tolerance is currently breached
    pub tolerance_breached: bool,
    /// Declared impact level label (critical escalates the alert severity)
    pub impact_level: String,
    /// Failure description, if recorded
    pub description: Option<String>,
}

/// Tagged row payload, discriminated by source table
#[derive(Debug, Clone)]
pub enum RowPayload {
    /// `incident_logs` row
    Incident(IncidentRow),
    /// `appetite_breach_logs` row
    Breach(BreachRow),
    /// `dependency_logs` row
    Dependency(DependencyRow),
}

impl RowPayload {
    /// Decode a raw payload for a known table
    ///
    /// Never fails: a payload that does not decode yields the table's
    /// default row, logged at debug level.
    #[must_use]
    pub fn decode(table: TableKind, value: &serde_json::Value) -> Self {
        match table {
            TableKind::IncidentLogs => RowPayload::Incident(decode_row(table, value)),
            TableKind::AppetiteBreachLogs => RowPayload::Breach(decode_row(table, value)),
            TableKind::DependencyLogs => RowPayload::Dependency(decode_row(table, value)),
        }
    }

    /// Row identifier, shared across all payload variants
    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            RowPayload::Incident(row) => row.id,
            RowPayload::Breach(row) => row.id,
            RowPayload::Dependency(row) => row.id,
        }
    }

    /// Owning organization, shared across all payload variants
    #[inline]
    #[must_use]
    pub fn org_id(&self) -> &str {
        match self {
            RowPayload::Incident(row) => &row.org_id,
            RowPayload::Breach(row) => &row.org_id,
            RowPayload::Dependency(row) => &row.org_id,
        }
    }
}

fn decode_row<T: DeserializeOwned + Default>(table: TableKind, value: &serde_json::Value) -> T {
    serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        tracing::debug!(
            table = table.as_str(),
            error = %err,
            "payload failed to decode, substituting defaults"
        );
        T::default()
    })
}
