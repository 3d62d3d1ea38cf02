//! ORP Core - resilience alerting engine
//!
//! The composition root that:
//! - Subscribes the monitored source tables for one organization
//! - Classifies change events into alerts and feeds the rolling window
//! - Dispatches notifications per the configured delivery channels
//! - Raises escalations for critical alerts
//! - Derives system metrics and keeps a bounded trail of reported errors
//!
//! # Example
//!
//! ```rust,ignore
//! use orp_core::prelude::*;
//!
//! # async fn example(stream: std::sync::Arc<dyn orp_event::ChangeStream>,
//! #                  dispatcher: orp_notify::Dispatcher) -> Result<(), EngineError> {
//! let config = EngineConfig::new("org-1");
//! let engine = Engine::new(config, stream, dispatcher, Default::default());
//!
//! engine.start().await?;
//! let metrics = engine.system_metrics();
//! engine.stop();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;

// Re-exports for convenience
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ConfigError, EngineError};
pub use metrics::SystemMetrics;
pub use report::{ErrorReport, ErrorReporter};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the ORP engine
    pub use crate::{
        Engine, EngineConfig, EngineError, ErrorReport, ErrorReporter, SystemMetrics,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the workspace tracing subscriber
///
/// Filter comes from `RUST_LOG`; safe to call more than once (later calls
/// are no-ops).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
