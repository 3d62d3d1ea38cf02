//! Delivery channel seams
//!
//! The hosted email/SMS delivery functions sit behind these traits so the
//! dispatcher never touches a shared client singleton and tests can record
//! calls with fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Body accepted by the email delivery function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Subject line
    pub subject: String,
    /// HTML body
    pub html: String,
}

/// Body accepted by the SMS delivery function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    /// Delivery priority label
    pub priority: String,
    /// Message text
    pub message: String,
}

/// Failure reported by a delivery channel
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The delivery function rejected the payload
    #[error("delivery rejected: {0}")]
    Rejected(String),

    /// The delivery function could not be reached
    #[error("delivery transport failed: {0}")]
    Transport(String),
}

/// Email delivery function
#[async_trait]
pub trait EmailChannel: Send + Sync {
    /// Deliver one email
    async fn send(&self, message: EmailMessage) -> Result<(), ChannelError>;
}

/// SMS delivery function
#[async_trait]
pub trait SmsChannel: Send + Sync {
    /// Deliver one SMS
    async fn send(&self, message: SmsMessage) -> Result<(), ChannelError>;
}
