//! Change-event types
//!
//! Defines the wire-facing shape of a row mutation (`RawChange`) and its
//! typed, table-discriminated form (`ChangeEvent`). Raw changes are what the
//! transport delivers; decoding resolves the table name into a known source
//! table and the payload into a tagged row variant.

use crate::payload::RowPayload;
use serde::{Deserialize, Serialize};

/// Row mutation kind as declared by the change stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
}

impl ChangeOp {
    /// Wire name of the operation
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOp::Insert => "INSERT",
            ChangeOp::Update => "UPDATE",
            ChangeOp::Delete => "DELETE",
        }
    }
}

/// Which operations a subscription wants delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventFilter {
    /// Inserts only
    Insert,
    /// Updates only
    Update,
    /// Deletes only
    Delete,
    /// Every operation
    #[default]
    Any,
}

impl EventFilter {
    /// Check whether an operation passes this filter
    #[inline]
    #[must_use]
    pub fn matches(&self, op: ChangeOp) -> bool {
        match self {
            EventFilter::Insert => op == ChangeOp::Insert,
            EventFilter::Update => op == ChangeOp::Update,
            EventFilter::Delete => op == ChangeOp::Delete,
            EventFilter::Any => true,
        }
    }
}

/// Known source tables
///
/// Only these tables produce typed change events; changes on any other table
/// are dropped by the dispatch loop before reaching a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableKind {
    /// Operational incident log
    IncidentLogs,
    /// Risk-appetite breach log
    AppetiteBreachLogs,
    /// Critical-dependency monitoring log
    DependencyLogs,
}

impl TableKind {
    /// Resolve a table name from the stream into a known source table
    #[inline]
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "incident_logs" => Some(TableKind::IncidentLogs),
            "appetite_breach_logs" => Some(TableKind::AppetiteBreachLogs),
            "dependency_logs" => Some(TableKind::DependencyLogs),
            _ => None,
        }
    }

    /// Table name as it appears on the stream
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::IncidentLogs => "incident_logs",
            TableKind::AppetiteBreachLogs => "appetite_breach_logs",
            TableKind::DependencyLogs => "dependency_logs",
        }
    }

    /// Module name reported on alerts sourced from this table
    #[inline]
    #[must_use]
    pub fn source_module(&self) -> &'static str {
        match self {
            TableKind::IncidentLogs => "incident-log",
            TableKind::AppetiteBreachLogs => "risk-appetite",
            TableKind::DependencyLogs => "dependency-monitor",
        }
    }
}

/// Untyped row mutation as delivered by the transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChange {
    /// Source table name
    pub table: String,
    /// Operation kind
    pub op: ChangeOp,
    /// New row payload (inserts and updates)
    pub new: Option<serde_json::Value>,
    /// Old row payload (updates and deletes)
    pub old: Option<serde_json::Value>,
}

impl RawChange {
    /// Create a raw change for a new-row mutation
    #[inline]
    #[must_use]
    pub fn new_row(table: impl Into<String>, op: ChangeOp, new: serde_json::Value) -> Self {
        Self {
            table: table.into(),
            op,
            new: Some(new),
            old: None,
        }
    }
}

/// Typed change event for a known source table
///
/// Ephemeral: consumed once per delivery, never persisted by this layer.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Source table
    pub table: TableKind,
    /// Operation kind
    pub op: ChangeOp,
    /// Decoded new row (inserts and updates)
    pub new: Option<RowPayload>,
    /// Decoded old row (updates and deletes)
    pub old: Option<RowPayload>,
}

impl ChangeEvent {
    /// Decode a raw change into a typed event
    ///
    /// Returns `None` for tables this subsystem does not know; payloads that
    /// fail to decode fall back to default rows so a malformed event never
    /// crashes the dispatch loop.
    #[must_use]
    pub fn decode(raw: &RawChange) -> Option<Self> {
        let table = TableKind::from_name(&raw.table)?;
        Some(Self {
            table,
            op: raw.op,
            new: raw.new.as_ref().map(|v| RowPayload::decode(table, v)),
            old: raw.old.as_ref().map(|v| RowPayload::decode(table, v)),
        })
    }

    /// The row this event is about: the new payload, falling back to the old
    #[inline]
    #[must_use]
    pub fn row(&self) -> Option<&RowPayload> {
        self.new.as_ref().or(self.old.as_ref())
    }
}
