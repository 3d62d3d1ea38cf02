//! ORP Event - change-event model and subscription adapter
//!
//! Binds caller-supplied handlers to row-level change events for the
//! monitored source tables:
//! - Typed change events (tagged row payloads per source table)
//! - Row-filter expressions applied to the change stream
//! - Channel lifecycle state machine with idempotent teardown
//! - Per-event handler dispatch that survives individual handler failures
//!
//! # Example
//!
//! ```rust,ignore
//! use orp_event::prelude::*;
//!
//! # async fn example(stream: std::sync::Arc<dyn ChangeStream>) -> Result<(), SubscriptionError> {
//! let options = SubscribeOptions::new("incident_logs").with_events(EventFilter::Insert);
//! let handle = subscribe(stream, options, std::sync::Arc::new(MyHandler)).await?;
//!
//! handle.unsubscribe(); // idempotent
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod error;
pub mod event;
pub mod filter;
pub mod payload;
pub mod state;
pub mod subscription;

// Re-exports for convenience
pub use error::{HandlerError, StreamError, SubscriptionError};
pub use event::{ChangeEvent, ChangeOp, EventFilter, RawChange, TableKind};
pub use filter::RowFilter;
pub use payload::{BreachRow, DependencyRow, IncidentRow, RowPayload};
pub use state::{allowed_transitions, validate_transition, ChannelState};
pub use subscription::{
    subscribe, ChangeStream, ChannelSpec, EventHandler, SubscribeOptions, SubscriptionHandle,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ORP change events
    pub use crate::{
        subscribe, ChangeEvent, ChangeOp, ChangeStream, ChannelState, EventFilter, EventHandler,
        RawChange, RowFilter, RowPayload, SubscribeOptions, SubscriptionError, SubscriptionHandle,
        TableKind,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
