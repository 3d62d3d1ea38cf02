//! The resilience alerting engine
//!
//! Owns the per-organization pipeline: change stream in, classified alerts
//! into the rolling window, notifications out over the configured channels,
//! escalations raised for critical alerts. Collaborators are injected so
//! the whole pipeline runs against fakes in tests.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::metrics::SystemMetrics;
use crate::report::ErrorReporter;
use async_trait::async_trait;
use orp_alert::{classify, Alert, AlertFeed};
use orp_escalation::EscalationTracker;
use orp_event::{
    subscribe, ChangeEvent, ChangeStream, EventFilter, EventHandler, HandlerError, RowFilter,
    RowPayload, SubscribeOptions, SubscriptionHandle, TableKind,
};
use orp_notify::{BreachNotice, DispatchReport, Dispatcher};
use parking_lot::Mutex;
use std::sync::Arc;

/// Reason recorded on automatically raised escalations
const AUTO_ESCALATION_REASON: &str = "Critical alert raised";

/// The composition root of the alerting pipeline
pub struct Engine {
    config: EngineConfig,
    stream: Arc<dyn ChangeStream>,
    dispatcher: Dispatcher,
    tracker: Arc<EscalationTracker>,
    feed: Arc<AlertFeed>,
    reporter: Arc<ErrorReporter>,
    handles: Mutex<Vec<SubscriptionHandle>>,
}

impl Engine {
    /// Create an engine over injected collaborators
    #[must_use]
    pub fn new(
        config: EngineConfig,
        stream: Arc<dyn ChangeStream>,
        dispatcher: Dispatcher,
        tracker: Arc<EscalationTracker>,
    ) -> Self {
        let feed = Arc::new(AlertFeed::with_capacity(config.alert_window));
        Self {
            config,
            stream,
            dispatcher,
            tracker,
            feed,
            reporter: Arc::new(ErrorReporter::new()),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe the monitored tables and start processing
    ///
    /// Each table gets its own channel, filtered to the configured
    /// organization. A table whose channel fails to open is reported and
    /// skipped; the engine only errors out when no channel opened at all.
    ///
    /// # Errors
    /// `EngineError::NoChannels` when every subscription failed.
    pub async fn start(&self) -> Result<(), EngineError> {
        let handler: Arc<dyn EventHandler> = Arc::new(EngineHandler {
            config: self.config.clone(),
            feed: Arc::clone(&self.feed),
            dispatcher: self.dispatcher.clone(),
            tracker: Arc::clone(&self.tracker),
            reporter: Arc::clone(&self.reporter),
        });

        let subscriptions = [
            (TableKind::IncidentLogs, EventFilter::Insert),
            (TableKind::AppetiteBreachLogs, EventFilter::Insert),
            (TableKind::DependencyLogs, EventFilter::Any),
        ];

        let mut opened = Vec::new();
        for (table, events) in subscriptions {
            let options = SubscribeOptions::new(table.as_str())
                .with_events(events)
                .with_row_filter(RowFilter::eq("org_id", self.config.org_id.as_str()));
            match subscribe(Arc::clone(&self.stream), options, Arc::clone(&handler)).await {
                Ok(handle) => opened.push(handle),
                Err(err) => {
                    self.reporter.report("change-stream", &err);
                }
            }
        }

        if opened.is_empty() {
            return Err(EngineError::NoChannels);
        }
        tracing::info!(
            org = %self.config.org_id,
            channels = opened.len(),
            "engine started"
        );
        self.handles.lock().extend(opened);
        Ok(())
    }

    /// Tear down every subscription
    ///
    /// Idempotent; a stopped engine can be started again.
    pub fn stop(&self) {
        for handle in self.handles.lock().drain(..) {
            handle.unsubscribe();
        }
        tracing::info!(org = %self.config.org_id, "engine stopped");
    }

    /// Whether any subscription is currently live
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handles.lock().iter().any(SubscriptionHandle::is_active)
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rolling alert window
    #[inline]
    #[must_use]
    pub fn feed(&self) -> &AlertFeed {
        &self.feed
    }

    /// Escalation tracker
    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &EscalationTracker {
        &self.tracker
    }

    /// Recent-error buffer
    #[inline]
    #[must_use]
    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    /// Derive the current system metrics from the live collections
    #[must_use]
    pub fn system_metrics(&self) -> SystemMetrics {
        SystemMetrics::compute(
            &self.feed.recent(),
            &self.tracker.active(&self.config.org_id),
        )
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("org_id", &self.config.org_id)
            .field("subscriptions", &self.handles.lock().len())
            .finish_non_exhaustive()
    }
}

/// Per-event pipeline shared by every table subscription
struct EngineHandler {
    config: EngineConfig,
    feed: Arc<AlertFeed>,
    dispatcher: Dispatcher,
    tracker: Arc<EscalationTracker>,
    reporter: Arc<ErrorReporter>,
}

impl EngineHandler {
    async fn process(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        let Some(alert) = classify(event) else {
            return Ok(());
        };
        tracing::debug!(
            category = alert.category.as_str(),
            severity = %alert.severity,
            title = %alert.title,
            "alert classified"
        );
        self.feed.push(alert.clone());

        // Breach rows carry the measured values; everything else notifies
        // from the normalized alert
        let notice = match event.row() {
            Some(RowPayload::Breach(row)) => BreachNotice::from_breach(row),
            _ => BreachNotice::from_alert(&alert),
        };
        let report = self
            .dispatcher
            .dispatch(&notice, &self.config.delivery)
            .await;
        self.record_dispatch_failures(&report);

        if alert.severity.is_critical() && self.config.auto_escalate_critical {
            self.escalate(&alert);
        }
        Ok(())
    }

    fn record_dispatch_failures(&self, report: &DispatchReport) {
        if let orp_notify::ChannelOutcome::Failed(reason) = &report.email {
            self.reporter
                .report_with_code("notification-dispatch", reason, "EMAIL_FAILED");
        }
        if let orp_notify::ChannelOutcome::Failed(reason) = &report.sms {
            self.reporter
                .report_with_code("notification-dispatch", reason, "SMS_FAILED");
        }
    }

    fn escalate(&self, alert: &Alert) {
        let record = self.tracker.create(
            alert,
            self.config.critical_escalation_level,
            AUTO_ESCALATION_REASON,
            self.config.escalation_assignee.as_str(),
        );
        tracing::info!(
            escalation = %record.id,
            alert = %alert.title,
            "critical alert escalated"
        );
    }
}

#[async_trait]
impl EventHandler for EngineHandler {
    async fn on_insert(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        self.process(event).await
    }

    async fn on_update(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
        self.process(event).await
    }
}
