//! Subscription adapter
//!
//! Wraps the external change-stream API behind per-table handler
//! registration and owns the channel lifecycle:
//! - One channel per `subscribe` call
//! - Exactly one handler invocation per delivered event, matched to its
//!   declared operation
//! - Handler failures caught individually; the channel stays up
//! - Idempotent teardown

use crate::error::{HandlerError, StreamError, SubscriptionError};
use crate::event::{ChangeEvent, ChangeOp, EventFilter, RawChange};
use crate::filter::RowFilter;
use crate::state::{validate_transition, ChannelState};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

/// Channel request passed to the transport
#[derive(Debug, Clone)]
pub struct ChannelSpec {
    /// Source table name
    pub table: String,
    /// Operations the channel should deliver
    pub events: EventFilter,
    /// Optional server-side row filter
    pub row_filter: Option<RowFilter>,
}

/// Caller-facing subscription options
#[derive(Debug, Clone)]
pub struct SubscribeOptions {
    /// Source table name (required, non-empty)
    pub table: String,
    /// Operations to deliver (default: all)
    pub events: EventFilter,
    /// Optional row filter, re-applied client-side
    pub row_filter: Option<RowFilter>,
    /// When false, no channel is opened and the handle stays unsubscribed
    pub enabled: bool,
}

impl SubscribeOptions {
    /// Create options for a table with defaults
    #[inline]
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            events: EventFilter::default(),
            row_filter: None,
            enabled: true,
        }
    }

    /// With an event filter
    #[inline]
    #[must_use]
    pub fn with_events(mut self, events: EventFilter) -> Self {
        self.events = events;
        self
    }

    /// With a row filter
    #[inline]
    #[must_use]
    pub fn with_row_filter(mut self, filter: RowFilter) -> Self {
        self.row_filter = Some(filter);
        self
    }

    /// Disabled: the returned handle never opens a channel
    #[inline]
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Transport seam over the hosted change-notification stream
///
/// Injected into `subscribe` rather than reached through a shared client
/// singleton, so tests and alternative transports can substitute their own.
#[async_trait]
pub trait ChangeStream: Send + Sync {
    /// Open one channel for the given spec
    async fn open(&self, spec: &ChannelSpec) -> Result<mpsc::Receiver<RawChange>, StreamError>;
}

/// Caller-supplied event callbacks
///
/// All methods default to no-ops so a handler implements only the
/// operations it cares about. A returned error is logged and dropped; it
/// never affects sibling deliveries or the channel itself.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_insert(&self, _event: &ChangeEvent) -> Result<(), HandlerError> {
        Ok(())
    }

    async fn on_update(&self, _event: &ChangeEvent) -> Result<(), HandlerError> {
        Ok(())
    }

    async fn on_delete(&self, _event: &ChangeEvent) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Handle to a live (or torn-down) subscription
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    table: String,
    state: Arc<Mutex<ChannelState>>,
    stop: Arc<Notify>,
}

impl SubscriptionHandle {
    /// Subscribed table name
    #[inline]
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> ChannelState {
        *self.state.lock()
    }

    /// Whether events are currently flowing
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state() == ChannelState::Subscribed
    }

    /// Tear the channel down
    ///
    /// Idempotent: safe to call any number of times; the handle ends in
    /// `Unsubscribed` either way and no further handler invocations fire.
    pub fn unsubscribe(&self) {
        {
            let mut guard = self.state.lock();
            if *guard == ChannelState::Unsubscribed {
                return;
            }
            *guard = ChannelState::Unsubscribed;
        }
        self.stop.notify_one();
        tracing::info!(table = %self.table, "unsubscribed from change stream");
    }
}

/// Subscribe a handler to change events for one table
///
/// # Errors
/// - `SubscriptionError::EmptyTable` if no table name was given
/// - `SubscriptionError::ChannelFailed` if the transport refused the
///   channel; the failure is also logged, and the caller may simply call
///   `subscribe` again to retry (no automatic retry is performed)
pub async fn subscribe(
    stream: Arc<dyn ChangeStream>,
    options: SubscribeOptions,
    handler: Arc<dyn EventHandler>,
) -> Result<SubscriptionHandle, SubscriptionError> {
    if options.table.trim().is_empty() {
        return Err(SubscriptionError::EmptyTable);
    }

    let state = Arc::new(Mutex::new(ChannelState::Unsubscribed));
    let stop = Arc::new(Notify::new());
    let handle = SubscriptionHandle {
        table: options.table.clone(),
        state: Arc::clone(&state),
        stop: Arc::clone(&stop),
    };

    if !options.enabled {
        tracing::debug!(table = %options.table, "subscription disabled, no channel opened");
        return Ok(handle);
    }

    advance(&state, &options.table, ChannelState::Subscribing);
    let spec = ChannelSpec {
        table: options.table.clone(),
        events: options.events,
        row_filter: options.row_filter.clone(),
    };
    let mut rx = match stream.open(&spec).await {
        Ok(rx) => rx,
        Err(err) => {
            advance(&state, &options.table, ChannelState::Failed);
            tracing::error!(table = %options.table, error = %err, "channel open failed");
            return Err(SubscriptionError::ChannelFailed(err));
        }
    };
    advance(&state, &options.table, ChannelState::Subscribed);
    tracing::info!(table = %options.table, events = ?options.events, "subscribed to change stream");

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = stop.notified() => break,
                received = rx.recv() => match received {
                    Some(raw) => deliver(&options, handler.as_ref(), raw).await,
                    None => {
                        let mut guard = task_state.lock();
                        if *guard == ChannelState::Subscribed {
                            *guard = ChannelState::Unsubscribed;
                            tracing::warn!(table = %options.table, "change stream closed the channel");
                        }
                        break;
                    }
                },
            }
        }
    });

    Ok(handle)
}

/// Route one raw change to the handler method matching its operation
async fn deliver(options: &SubscribeOptions, handler: &dyn EventHandler, raw: RawChange) {
    if !options.events.matches(raw.op) {
        return;
    }
    if let Some(filter) = &options.row_filter {
        let row = raw.new.as_ref().or(raw.old.as_ref());
        if !row.is_some_and(|r| filter.matches(r)) {
            return;
        }
    }
    let Some(event) = ChangeEvent::decode(&raw) else {
        tracing::debug!(table = %raw.table, "change on unknown table dropped");
        return;
    };
    let outcome = match event.op {
        ChangeOp::Insert => handler.on_insert(&event).await,
        ChangeOp::Update => handler.on_update(&event).await,
        ChangeOp::Delete => handler.on_delete(&event).await,
    };
    if let Err(err) = outcome {
        tracing::error!(
            table = event.table.as_str(),
            op = event.op.as_str(),
            error = %err,
            "event handler failed"
        );
    }
}

fn advance(state: &Mutex<ChannelState>, table: &str, to: ChannelState) {
    let mut guard = state.lock();
    match validate_transition(*guard, to) {
        Ok(()) => *guard = to,
        Err(err) => tracing::error!(table, error = %err, "refused lifecycle transition"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RowPayload;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    struct FakeStream {
        sender: Mutex<Option<mpsc::Sender<RawChange>>>,
        refuse: AtomicBool,
    }

    impl FakeStream {
        fn new() -> Self {
            Self {
                sender: Mutex::new(None),
                refuse: AtomicBool::new(false),
            }
        }

        fn refusing() -> Self {
            let stream = Self::new();
            stream.refuse.store(true, Ordering::SeqCst);
            stream
        }

        async fn emit(&self, raw: RawChange) {
            let sender = self.sender.lock().clone().expect("channel open");
            sender.send(raw).await.expect("receiver alive");
        }

        fn close(&self) {
            self.sender.lock().take();
        }
    }

    #[async_trait]
    impl ChangeStream for FakeStream {
        async fn open(&self, _spec: &ChannelSpec) -> Result<mpsc::Receiver<RawChange>, StreamError> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(StreamError::Rejected("refused by test".to_string()));
            }
            let (tx, rx) = mpsc::channel(16);
            *self.sender.lock() = Some(tx);
            Ok(rx)
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        inserts: Mutex<Vec<ChangeEvent>>,
        deletes: Mutex<Vec<ChangeEvent>>,
        fail_next: AtomicBool,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn on_insert(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(HandlerError::new("simulated handler failure"));
            }
            self.inserts.lock().push(event.clone());
            Ok(())
        }

        async fn on_delete(&self, event: &ChangeEvent) -> Result<(), HandlerError> {
            self.deletes.lock().push(event.clone());
            Ok(())
        }
    }

    async fn wait_until(mut probe: impl FnMut() -> bool) {
        for _ in 0..200 {
            if probe() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    fn incident(title: &str) -> RawChange {
        RawChange::new_row("incident_logs", ChangeOp::Insert, json!({"title": title}))
    }

    #[tokio::test]
    async fn empty_table_is_rejected() {
        let stream = Arc::new(FakeStream::new());
        let result = subscribe(
            stream,
            SubscribeOptions::new("  "),
            Arc::new(RecordingHandler::default()),
        )
        .await;
        assert!(matches!(result, Err(SubscriptionError::EmptyTable)));
    }

    #[tokio::test]
    async fn disabled_subscription_opens_no_channel() {
        // A refusing stream would fail the test if open were ever called
        let stream = Arc::new(FakeStream::refusing());
        let handle = subscribe(
            stream,
            SubscribeOptions::new("incident_logs").disabled(),
            Arc::new(RecordingHandler::default()),
        )
        .await
        .unwrap();
        assert_eq!(handle.state(), ChannelState::Unsubscribed);
    }

    #[tokio::test]
    async fn channel_refusal_surfaces_as_typed_error() {
        let stream = Arc::new(FakeStream::refusing());
        let result = subscribe(
            stream,
            SubscribeOptions::new("incident_logs"),
            Arc::new(RecordingHandler::default()),
        )
        .await;
        assert!(matches!(result, Err(SubscriptionError::ChannelFailed(_))));
    }

    #[tokio::test]
    async fn events_reach_matching_callback() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        let handle = subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs"),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();
        assert!(handle.is_active());

        stream.emit(incident("Core banking outage")).await;
        wait_until(|| handler.inserts.lock().len() == 1).await;
        assert!(handler.deletes.lock().is_empty());
    }

    #[tokio::test]
    async fn event_filter_drops_other_operations() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs").with_events(EventFilter::Delete),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();

        stream.emit(incident("filtered out")).await;
        stream
            .emit(RawChange {
                table: "incident_logs".to_string(),
                op: ChangeOp::Delete,
                new: None,
                old: Some(json!({"title": "removed"})),
            })
            .await;

        wait_until(|| handler.deletes.lock().len() == 1).await;
        assert!(handler.inserts.lock().is_empty());
    }

    #[tokio::test]
    async fn row_filter_is_applied_client_side() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs").with_row_filter(RowFilter::eq("org_id", "org-1")),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();

        stream
            .emit(RawChange::new_row(
                "incident_logs",
                ChangeOp::Insert,
                json!({"org_id": "org-2", "title": "other tenant"}),
            ))
            .await;
        stream
            .emit(RawChange::new_row(
                "incident_logs",
                ChangeOp::Insert,
                json!({"org_id": "org-1", "title": "ours"}),
            ))
            .await;

        wait_until(|| handler.inserts.lock().len() == 1).await;
        let inserts = handler.inserts.lock();
        match inserts[0].row() {
            Some(RowPayload::Incident(row)) => assert_eq!(row.title, "ours"),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn handler_failure_does_not_tear_down_channel() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        handler.fail_next.store(true, Ordering::SeqCst);
        let handle = subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs"),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();

        stream.emit(incident("first fails")).await;
        stream.emit(incident("second lands")).await;

        wait_until(|| handler.inserts.lock().len() == 1).await;
        assert!(handle.is_active());
    }

    #[tokio::test]
    async fn unsubscribe_is_idempotent() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        let handle = subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs"),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();

        handle.unsubscribe();
        assert_eq!(handle.state(), ChannelState::Unsubscribed);
        handle.unsubscribe();
        assert_eq!(handle.state(), ChannelState::Unsubscribed);
    }

    #[tokio::test]
    async fn no_events_after_unsubscribe() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        let handle = subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs"),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();

        stream.emit(incident("before teardown")).await;
        wait_until(|| handler.inserts.lock().len() == 1).await;

        handle.unsubscribe();
        // Give the drain task time to observe the stop signal
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = stream
            .sender
            .lock()
            .clone()
            .expect("channel open")
            .send(incident("after teardown"))
            .await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handler.inserts.lock().len(), 1);
    }

    #[tokio::test]
    async fn stream_close_settles_to_unsubscribed() {
        let stream = Arc::new(FakeStream::new());
        let handler = Arc::new(RecordingHandler::default());
        let handle = subscribe(
            Arc::clone(&stream) as Arc<dyn ChangeStream>,
            SubscribeOptions::new("incident_logs"),
            Arc::clone(&handler) as Arc<dyn EventHandler>,
        )
        .await
        .unwrap();

        stream.close();
        wait_until(|| handle.state() == ChannelState::Unsubscribed).await;
    }
}
