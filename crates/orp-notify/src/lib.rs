//! ORP Notify - notification fan-out
//!
//! Delivers qualifying alerts over the enabled external channels:
//! - Email and SMS channel seams over the hosted delivery functions
//! - Regulatory message content (OSFI E-21 heading, citation, disclaimer)
//! - Per-channel dispatch outcomes; one failing channel never blocks another
//! - SMS proportionality rule: critical severity only

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod channel;
pub mod config;
pub mod dispatcher;
pub mod template;

// Re-exports for convenience
pub use channel::{ChannelError, EmailChannel, EmailMessage, SmsChannel, SmsMessage};
pub use config::{DeliveryConfig, NotifyPriority};
pub use dispatcher::{BreachNotice, ChannelOutcome, DispatchReport, Dispatcher, SkipReason};
pub use template::{breach_email, breach_sms, DISCLAIMER, PRINCIPLE_CITATION, REGULATORY_HEADING};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with ORP notifications
    pub use crate::{
        BreachNotice, ChannelOutcome, DeliveryConfig, DispatchReport, Dispatcher, EmailChannel,
        NotifyPriority, SkipReason, SmsChannel,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
