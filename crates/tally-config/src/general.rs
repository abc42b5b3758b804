//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default page size for audit history.
const fn default_page_size() -> u32 {
    20
}

/// Upper bound callers cannot page past.
const fn default_max_page_size() -> u32 {
    100
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size used when a caller does not ask for one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size honoured.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl GeneralConfig {
    /// Resolve a requested page size against the configured default and cap.
    #[must_use]
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn page_size_is_clamped() {
        let config = GeneralConfig::default();
        assert_eq!(config.page_size(None), 20);
        assert_eq!(config.page_size(Some(0)), 1);
        assert_eq!(config.page_size(Some(500)), 100);
        assert_eq!(config.page_size(Some(7)), 7);
    }
}
