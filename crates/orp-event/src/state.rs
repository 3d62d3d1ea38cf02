//! Subscription channel lifecycle state machine

use crate::error::SubscriptionError;

/// Lifecycle state of a subscription channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// No channel open; also the terminal state after teardown
    Unsubscribed,
    /// Channel open requested, not yet confirmed
    Subscribing,
    /// Channel live, events flowing
    Subscribed,
    /// Channel open failed; equivalent to `Unsubscribed` for retry purposes
    Failed,
}

/// Validates a lifecycle transition.
///
/// Teardown is idempotent, so `Unsubscribed -> Unsubscribed` is allowed as a
/// no-op; every other transition must be in the allowed set.
pub fn validate_transition(from: ChannelState, to: ChannelState) -> Result<(), SubscriptionError> {
    if from == ChannelState::Unsubscribed && to == ChannelState::Unsubscribed {
        return Ok(());
    }
    if allowed(from, to) {
        Ok(())
    } else {
        Err(SubscriptionError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: ChannelState) -> Vec<ChannelState> {
    use ChannelState::*;
    match from {
        Unsubscribed => vec![Subscribing],
        Subscribing => vec![Subscribed, Failed, Unsubscribed],
        Subscribed => vec![Unsubscribed],
        Failed => vec![Subscribing, Unsubscribed],
    }
}

fn allowed(from: ChannelState, to: ChannelState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
