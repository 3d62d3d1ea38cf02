//! Error types for the change-event layer
//!
//! Covers:
//! - Transport failures when opening a channel
//! - Subscription lifecycle violations
//! - Handler execution failures (caught per event, never fatal)

use crate::state::ChannelState;

/// Transport-level failure from the underlying change stream
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The stream could not be reached
    #[error("stream connection failed: {0}")]
    Connection(String),

    /// The stream rejected the channel request
    #[error("channel rejected: {0}")]
    Rejected(String),
}

/// Subscription adapter errors
#[derive(Debug, thiserror::Error)]
pub enum SubscriptionError {
    /// A table name is required to open a channel
    #[error("table name must not be empty")]
    EmptyTable,

    /// Opening the channel failed at the transport
    #[error("channel open failed: {0}")]
    ChannelFailed(#[from] StreamError),

    /// A lifecycle transition outside the allowed set was attempted
    #[error("illegal subscription transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// State the channel was in
        from: ChannelState,
        /// State that was requested
        to: ChannelState,
    },

    /// A row-filter expression could not be parsed
    #[error("invalid row filter: {0}")]
    InvalidFilter(String),
}

/// Error raised by a caller-supplied event handler
///
/// Handler errors are caught individually by the dispatch loop: one failing
/// handler invocation is logged and must never tear down the channel.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Create a handler error from any displayable cause
    #[inline]
    #[must_use]
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_error_display() {
        let err = StreamError::Connection("socket closed".to_string());
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn subscription_error_from_stream() {
        let err = SubscriptionError::from(StreamError::Rejected("bad filter".to_string()));
        assert!(matches!(err, SubscriptionError::ChannelFailed(_)));
    }

    #[test]
    fn handler_error_new() {
        let err = HandlerError::new("dispatch refused");
        assert_eq!(err.to_string(), "dispatch refused");
    }
}
