//! Tunables for the safe-mode fork monitor, loaded as a section of the
//! node's main configuration file.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::NodeConfigValidationError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SafeModeConfig {
    /// Forks shorter than this (in blocks, from the common ancestor) are not
    /// worth reporting at all.
    pub min_fork_length: u64,
    /// Forks whose base is more than this many blocks behind the active tip
    /// are considered stale and dropped.
    pub max_fork_distance: u64,
    /// Signed work-delta tolerance applied against the active tip's
    /// chain-work to form the proof-of-work floor a fork must clear. A
    /// negative value relaxes the floor below the active tip's work; it
    /// saturates at zero rather than going negative.
    pub min_fork_height_difference: i64,
    /// `POST` destination for status-change notifications. `None` disables
    /// webhook delivery entirely (log-only).
    pub webhook_address: Option<String>,
    #[serde(with = "duration_serde")]
    pub webhook_timeout: Duration,
}

impl Default for SafeModeConfig {
    fn default() -> Self {
        Self {
            min_fork_length: 7,
            max_fork_distance: 288,
            min_fork_height_difference: 72,
            webhook_address: None,
            webhook_timeout: Duration::from_secs(5),
        }
    }
}

impl SafeModeConfig {
    pub fn validate(&self) -> Result<(), NodeConfigValidationError> {
        if self.min_fork_length == 0 {
            return Err(NodeConfigValidationError::InvalidValue(
                "safe_mode.min_fork_length must be > 0".to_string(),
            ));
        }
        if self.webhook_timeout.as_millis() == 0 {
            return Err(NodeConfigValidationError::InvalidValue(
                "safe_mode.webhook_timeout must be > 0".to_string(),
            ));
        }
        if let Some(address) = &self.webhook_address {
            if !(address.starts_with("http://") || address.starts_with("https://")) {
                return Err(NodeConfigValidationError::InvalidValue(
                    "safe_mode.webhook_address must be an http(s) URL".to_string(),
                ));
            }
        }
        Ok(())
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SafeModeConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_min_fork_length_is_rejected() {
        let config = SafeModeConfig {
            min_fork_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_webhook_address_is_rejected() {
        let config = SafeModeConfig {
            webhook_address: Some("ftp://example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
