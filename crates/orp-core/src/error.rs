//! Error types for the engine

use orp_event::SubscriptionError;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for `EngineConfig`
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Engine errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration failed to load
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A subscription could not be established
    #[error("subscription failed: {0}")]
    Subscription(#[from] SubscriptionError),

    /// Every monitored table failed to open a channel
    #[error("no change-stream channel could be opened")]
    NoChannels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_from_subscription() {
        let err = EngineError::from(SubscriptionError::EmptyTable);
        assert!(matches!(err, EngineError::Subscription(_)));
        assert!(err.to_string().contains("subscription failed"));
    }
}
