//! Testing utilities for the ORP workspace
//!
//! Fakes for every injected seam:
//! - `ScriptedStream`: a change stream test code feeds by hand
//! - `RecordingEmailChannel` / `RecordingSmsChannel`: capture delivery
//!   calls and can be scripted to fail
//! - `ManualClock`: an explicitly advanced time source
//! - Payload builders for the three monitored source tables

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use orp_escalation::Clock;
use orp_event::{ChangeOp, ChangeStream, ChannelSpec, RawChange, StreamError};
use orp_notify::{ChannelError, EmailChannel, EmailMessage, SmsChannel, SmsMessage};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Change stream fed by test code
///
/// `open` hands out one channel per table; `emit` pushes a raw change to
/// whichever channel is registered for its table. Tables listed via
/// `refuse` fail to open, for exercising channel-failure paths.
#[derive(Default)]
pub struct ScriptedStream {
    senders: Mutex<HashMap<String, mpsc::Sender<RawChange>>>,
    refused: Mutex<HashSet<String>>,
}

impl ScriptedStream {
    /// Create an empty stream
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `open` fail for a table
    pub fn refuse(&self, table: impl Into<String>) {
        self.refused.lock().insert(table.into());
    }

    /// Whether a channel is currently open for a table
    #[must_use]
    pub fn has_channel(&self, table: &str) -> bool {
        self.senders.lock().contains_key(table)
    }

    /// Push a raw change to the channel registered for its table
    ///
    /// # Panics
    /// Panics if no channel is open for the table; tests should subscribe
    /// first.
    pub async fn emit(&self, raw: RawChange) {
        let sender = self
            .senders
            .lock()
            .get(&raw.table)
            .cloned()
            .unwrap_or_else(|| panic!("no channel open for table {}", raw.table));
        sender.send(raw).await.expect("subscription task alive");
    }

    /// Push an insert built from a JSON payload
    pub async fn emit_insert(&self, table: &str, payload: serde_json::Value) {
        self.emit(RawChange::new_row(table, ChangeOp::Insert, payload))
            .await;
    }

    /// Drop the channel for a table, as a transport-side close
    pub fn close(&self, table: &str) {
        self.senders.lock().remove(table);
    }
}

#[async_trait]
impl ChangeStream for ScriptedStream {
    async fn open(&self, spec: &ChannelSpec) -> Result<mpsc::Receiver<RawChange>, StreamError> {
        if self.refused.lock().contains(&spec.table) {
            return Err(StreamError::Rejected(format!(
                "scripted refusal for {}",
                spec.table
            )));
        }
        let (tx, rx) = mpsc::channel(32);
        self.senders.lock().insert(spec.table.clone(), tx);
        Ok(rx)
    }
}

/// Email channel that records every delivery
#[derive(Default)]
pub struct RecordingEmailChannel {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<bool>,
}

impl RecordingEmailChannel {
    /// Create a recording channel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Snapshot of delivered messages
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl EmailChannel for RecordingEmailChannel {
    async fn send(&self, message: EmailMessage) -> Result<(), ChannelError> {
        if *self.failing.lock() {
            return Err(ChannelError::Transport("scripted email failure".to_string()));
        }
        self.sent.lock().push(message);
        Ok(())
    }
}

/// SMS channel that records every delivery
#[derive(Default)]
pub struct RecordingSmsChannel {
    sent: Mutex<Vec<SmsMessage>>,
    failing: Mutex<bool>,
}

impl RecordingSmsChannel {
    /// Create a recording channel
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    /// Snapshot of delivered messages
    #[must_use]
    pub fn sent(&self) -> Vec<SmsMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl SmsChannel for RecordingSmsChannel {
    async fn send(&self, message: SmsMessage) -> Result<(), ChannelError> {
        if *self.failing.lock() {
            return Err(ChannelError::Transport("scripted sms failure".to_string()));
        }
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Explicitly advanced time source
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock reading `start`
    #[must_use]
    pub fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock();
        *guard += by;
    }

    /// Set an absolute reading
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Incident-row payload for `incident_logs`
#[must_use]
pub fn incident_payload(org_id: &str, title: &str, severity: &str) -> serde_json::Value {
    serde_json::json!({
        "id": Uuid::new_v4(),
        "org_id": org_id,
        "title": title,
        "description": title,
        "severity": severity,
        "status": "open",
    })
}

/// Breach-row payload for `appetite_breach_logs`
#[must_use]
pub fn breach_payload(
    org_id: &str,
    kri_name: &str,
    actual: f64,
    threshold: f64,
    severity: &str,
) -> serde_json::Value {
    serde_json::json!({
        "id": Uuid::new_v4(),
        "org_id": org_id,
        "kri_name": kri_name,
        "actual_value": actual,
        "threshold_value": threshold,
        "severity": severity,
    })
}

/// Dependency-row payload for `dependency_logs`
#[must_use]
pub fn dependency_payload(
    org_id: &str,
    dependency_name: &str,
    tolerance_breached: bool,
    impact_level: &str,
) -> serde_json::Value {
    serde_json::json!({
        "id": Uuid::new_v4(),
        "org_id": org_id,
        "dependency_name": dependency_name,
        "tolerance_breached": tolerance_breached,
        "impact_level": impact_level,
    })
}
