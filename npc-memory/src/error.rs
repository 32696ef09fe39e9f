//! Error types.
//!
//! Reconciliation, note edits and reply extraction never fail in steady
//! state. Errors only surface at the configuration and persistence
//! boundaries, plus the per-entry skip reasons collected while reading a
//! snapshot.

use thiserror::Error;

/// Errors from loading a [`RosterConfig`](crate::RosterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Size limit must be greater than zero")]
    ZeroSizeLimit,
}

/// Errors at the persistence boundary of a [`RosterRecord`](crate::RosterRecord).
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Serialized record is {len} bytes, limit is {limit}")]
    TooLarge { len: usize, limit: usize },
}

/// Why a snapshot entry was skipped during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Snapshot entry has no id")]
    MissingId,

    #[error("Snapshot entry has no name")]
    MissingName,
}
