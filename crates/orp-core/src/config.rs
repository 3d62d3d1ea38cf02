//! Engine configuration
//!
//! Serde-derived, TOML-loadable, with builder methods for tests and
//! embedders. Every field has a default so a config file only states what
//! it overrides.

use crate::error::ConfigError;
use orp_alert::feed::DEFAULT_WINDOW;
use orp_escalation::EscalationTier;
use orp_notify::DeliveryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Organization whose rows this engine watches
    pub org_id: String,
    /// Rolling alert-window capacity
    pub alert_window: usize,
    /// Default delivery configuration for dispatched notifications
    pub delivery: DeliveryConfig,
    /// Raise an escalation automatically for critical alerts
    pub auto_escalate_critical: bool,
    /// Escalation level used for automatic escalations
    pub critical_escalation_level: u8,
    /// Assignee recorded on automatic escalations
    pub escalation_assignee: String,
}

impl EngineConfig {
    /// Create a configuration for one organization with defaults
    #[inline]
    #[must_use]
    pub fn new(org_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            ..Self::default()
        }
    }

    /// With an alert-window capacity
    #[inline]
    #[must_use]
    pub fn with_alert_window(mut self, cap: usize) -> Self {
        self.alert_window = cap;
        self
    }

    /// With a delivery configuration
    #[inline]
    #[must_use]
    pub fn with_delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }

    /// With automatic critical escalation on or off
    #[inline]
    #[must_use]
    pub fn with_auto_escalation(mut self, enabled: bool) -> Self {
        self.auto_escalate_critical = enabled;
        self
    }

    /// With the level used for automatic escalations
    #[inline]
    #[must_use]
    pub fn with_escalation_level(mut self, level: u8) -> Self {
        self.critical_escalation_level = level;
        self.escalation_assignee = EscalationTier::from_level(level)
            .assignee_label()
            .to_string();
        self
    }

    /// Parse a configuration from TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` when the text is not a valid config document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration from a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, `ConfigError::Parse`
    /// when its contents do not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let level = 2;
        Self {
            org_id: "default".to_string(),
            alert_window: DEFAULT_WINDOW,
            delivery: DeliveryConfig::default(),
            auto_escalate_critical: true,
            critical_escalation_level: level,
            escalation_assignee: EscalationTier::from_level(level)
                .assignee_label()
                .to_string(),
        }
    }
}
