//! Audit recorder configuration.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default number of audit batches that may wait for the writer task.
const fn default_channel_capacity() -> usize {
    1024
}

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    /// Whether mutations enqueue audit events at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Capacity of the in-process audit queue. Batches arriving while it
    /// is full are dropped with a warning.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl AuditConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the queue capacity is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "audit.channel_capacity".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
