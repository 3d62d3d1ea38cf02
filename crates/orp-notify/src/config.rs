//! Delivery configuration
//!
//! A parameter object supplied per dispatch call; nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery priority forwarded to the SMS channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPriority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl NotifyPriority {
    /// Priority label as the delivery function expects it
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyPriority::Normal => "normal",
            NotifyPriority::High => "high",
            NotifyPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for NotifyPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel configuration bound to one dispatch call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Attempt email delivery
    pub email_enabled: bool,
    /// Attempt SMS delivery (still gated to critical severity)
    pub sms_enabled: bool,
    /// Delivery priority
    pub priority: NotifyPriority,
    /// Escalation delay forwarded as metadata; dispatch performs no timed
    /// scheduling itself
    pub escalation_delay_minutes: u32,
}

impl DeliveryConfig {
    /// Create the default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With email enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_email(mut self, enabled: bool) -> Self {
        self.email_enabled = enabled;
        self
    }

    /// With SMS enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_sms(mut self, enabled: bool) -> Self {
        self.sms_enabled = enabled;
        self
    }

    /// With a delivery priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: NotifyPriority) -> Self {
        self.priority = priority;
        self
    }

    /// With an escalation delay in minutes
    #[inline]
    #[must_use]
    pub fn with_escalation_delay(mut self, minutes: u32) -> Self {
        self.escalation_delay_minutes = minutes;
        self
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            email_enabled: true,
            sms_enabled: false,
            priority: NotifyPriority::Normal,
            escalation_delay_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = DeliveryConfig::new();
        assert!(config.email_enabled);
        assert!(!config.sms_enabled);
        assert_eq!(config.priority, NotifyPriority::Normal);
        assert_eq!(config.escalation_delay_minutes, 30);
    }

    #[test]
    fn builder_chain() {
        let config = DeliveryConfig::new()
            .with_email(false)
            .with_sms(true)
            .with_priority(NotifyPriority::Urgent)
            .with_escalation_delay(5);
        assert!(!config.email_enabled);
        assert!(config.sms_enabled);
        assert_eq!(config.priority.as_str(), "urgent");
        assert_eq!(config.escalation_delay_minutes, 5);
    }
}
