//! Database location configuration.

use serde::{Deserialize, Serialize};

/// Path used by SQLite/libSQL for a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

fn default_path() -> String {
    ".tally/tally.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Local libSQL database file, or `:memory:`.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    #[must_use]
    pub fn is_in_memory(&self) -> bool {
        self.path == IN_MEMORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_on_disk() {
        let config = DatabaseConfig::default();
        assert_eq!(config.path, ".tally/tally.db");
        assert!(!config.is_in_memory());
    }

    #[test]
    fn memory_detection() {
        let config = DatabaseConfig {
            path: IN_MEMORY.into(),
        };
        assert!(config.is_in_memory());
    }
}
