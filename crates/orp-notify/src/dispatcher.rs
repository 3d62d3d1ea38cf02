//! Notification dispatcher
//!
//! Given an alert (or raw breach payload) and a delivery configuration,
//! invokes the enabled channels and reports one outcome per channel.
//! Channels are independent: each failure is caught and logged where it
//! happens and never aborts a sibling attempt.

use crate::channel::{EmailChannel, SmsChannel};
use crate::config::DeliveryConfig;
use crate::template::{breach_email, breach_sms};
use orp_alert::{Alert, AlertSeverity};
use orp_event::BreachRow;
use std::fmt;
use std::sync::Arc;

/// Normalized content for a breach notification
#[derive(Debug, Clone)]
pub struct BreachNotice {
    /// Headline
    pub title: String,
    /// Severity driving channel eligibility
    pub severity: AlertSeverity,
    /// Breached measure name
    pub metric: String,
    /// Measured value, when the source event carries one
    pub actual: Option<f64>,
    /// Tolerance threshold, when the source event carries one
    pub threshold: Option<f64>,
    /// One-line narrative
    pub summary: String,
}

impl BreachNotice {
    /// Build a notice from a normalized alert
    #[must_use]
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            title: alert.title.clone(),
            severity: alert.severity,
            metric: alert.source.clone(),
            actual: None,
            threshold: None,
            summary: alert.description.clone(),
        }
    }

    /// Build a notice straight from an appetite-breach row
    #[must_use]
    pub fn from_breach(row: &BreachRow) -> Self {
        let severity =
            AlertSeverity::from_label(&row.severity).unwrap_or(AlertSeverity::Medium);
        Self {
            title: format!("Risk appetite breach: {}", row.kri_name),
            severity,
            metric: row.kri_name.clone(),
            actual: Some(row.actual_value),
            threshold: Some(row.threshold_value),
            summary: format!(
                "Threshold breached: {} vs {}",
                row.actual_value, row.threshold_value
            ),
        }
    }
}

/// Why a channel was skipped without an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The caller disabled the channel
    Disabled,
    /// SMS is gated to critical severity and the alert sits below it
    BelowSeverityFloor,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("channel disabled"),
            SkipReason::BelowSeverityFloor => f.write_str("severity below channel floor"),
        }
    }
}

/// Outcome of one channel within a dispatch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The delivery function accepted the message
    Sent,
    /// The delivery function failed; the reason is logged and recorded
    Failed(String),
    /// No attempt was made
    Skipped(SkipReason),
}

impl ChannelOutcome {
    /// Whether the channel delivered
    #[inline]
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, ChannelOutcome::Sent)
    }

    /// Whether an attempt was made and failed
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, ChannelOutcome::Failed(_))
    }
}

/// Per-channel result of one dispatch call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Email outcome
    pub email: ChannelOutcome,
    /// SMS outcome
    pub sms: ChannelOutcome,
    /// Escalation delay carried through from the delivery config (metadata
    /// for the escalation layer; nothing here schedules it)
    pub escalation_delay_minutes: u32,
}

impl DispatchReport {
    /// Whether at least one channel delivered
    #[inline]
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.email.is_sent() || self.sms.is_sent()
    }

    /// Whether any attempted channel failed
    #[inline]
    #[must_use]
    pub fn failed(&self) -> bool {
        self.email.is_failed() || self.sms.is_failed()
    }
}

/// Multi-channel notification dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    email: Arc<dyn EmailChannel>,
    sms: Arc<dyn SmsChannel>,
}

impl Dispatcher {
    /// Create a dispatcher over the given delivery channels
    #[inline]
    #[must_use]
    pub fn new(email: Arc<dyn EmailChannel>, sms: Arc<dyn SmsChannel>) -> Self {
        Self { email, sms }
    }

    /// Deliver a breach notice over the enabled channels
    ///
    /// Best effort: channel failures are captured in the report, not
    /// returned as errors. SMS only fires for critical severity regardless
    /// of the caller's flag.
    pub async fn dispatch(&self, notice: &BreachNotice, config: &DeliveryConfig) -> DispatchReport {
        let (email, sms) = futures::join!(
            self.dispatch_email(notice, config),
            self.dispatch_sms(notice, config),
        );
        DispatchReport {
            email,
            sms,
            escalation_delay_minutes: config.escalation_delay_minutes,
        }
    }

    async fn dispatch_email(&self, notice: &BreachNotice, config: &DeliveryConfig) -> ChannelOutcome {
        if !config.email_enabled {
            return ChannelOutcome::Skipped(SkipReason::Disabled);
        }
        match self.email.send(breach_email(notice)).await {
            Ok(()) => {
                tracing::info!(title = %notice.title, "breach email delivered");
                ChannelOutcome::Sent
            }
            Err(err) => {
                tracing::error!(title = %notice.title, error = %err, "breach email failed");
                ChannelOutcome::Failed(err.to_string())
            }
        }
    }

    async fn dispatch_sms(&self, notice: &BreachNotice, config: &DeliveryConfig) -> ChannelOutcome {
        if !config.sms_enabled {
            return ChannelOutcome::Skipped(SkipReason::Disabled);
        }
        if !notice.severity.is_critical() {
            tracing::debug!(
                title = %notice.title,
                severity = %notice.severity,
                "sms skipped below critical severity"
            );
            return ChannelOutcome::Skipped(SkipReason::BelowSeverityFloor);
        }
        match self.sms.send(breach_sms(notice, config.priority)).await {
            Ok(()) => {
                tracing::info!(title = %notice.title, "breach sms delivered");
                ChannelOutcome::Sent
            }
            Err(err) => {
                tracing::error!(title = %notice.title, error = %err, "breach sms failed");
                ChannelOutcome::Failed(err.to_string())
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}
