//! Configuration for the roster reconciler.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Default ceiling on the serialized record, in bytes of compact JSON.
pub const DEFAULT_SIZE_LIMIT: usize = 5000;

/// Default separator placed between appended notes.
pub const DEFAULT_NOTE_SEPARATOR: &str = "; ";

const SIZE_LIMIT_VAR: &str = "NPC_MEMORY_SIZE_LIMIT";
const NOTE_SEPARATOR_VAR: &str = "NPC_MEMORY_NOTE_SEPARATOR";

/// Tunables for [`RosterReconciler`](crate::RosterReconciler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Maximum length of the serialized record. Members are evicted to stay under it.
    pub size_limit: usize,

    /// Inserted between an actor's existing notes and a newly appended note.
    pub note_separator: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
            note_separator: DEFAULT_NOTE_SEPARATOR.to_string(),
        }
    }
}

impl RosterConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config from `NPC_MEMORY_SIZE_LIMIT` and `NPC_MEMORY_NOTE_SEPARATOR`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(SIZE_LIMIT_VAR) {
            config.size_limit = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: SIZE_LIMIT_VAR,
                    value,
                })?;
        }

        if let Ok(separator) = std::env::var(NOTE_SEPARATOR_VAR) {
            config.note_separator = separator;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    pub fn with_note_separator(mut self, separator: impl Into<String>) -> Self {
        self.note_separator = separator.into();
        self
    }

    /// Check that the settings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size_limit == 0 {
            return Err(ConfigError::ZeroSizeLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RosterConfig::new();
        assert_eq!(config.size_limit, 5000);
        assert_eq!(config.note_separator, "; ");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RosterConfig::new()
            .with_size_limit(4800)
            .with_note_separator("\n");
        assert_eq!(config.size_limit, 4800);
        assert_eq!(config.note_separator, "\n");
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = RosterConfig::new().with_size_limit(0);
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSizeLimit)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RosterConfig = serde_json::from_str(r#"{"size_limit": 4800}"#).unwrap();
        assert_eq!(config.size_limit, 4800);
        assert_eq!(config.note_separator, DEFAULT_NOTE_SEPARATOR);
    }
}
