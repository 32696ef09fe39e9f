//! Actor types tracked in an observer's roster.
//!
//! Field ownership:
//! - `name`, `appearance`, `present` and `last_seen` belong to the
//!   observation source and are written by reconciliation.
//! - `notes` belongs to the observing agent and is only written through
//!   the note operations (`append_note`, `replace_note`).

use crate::error::SnapshotError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of an actor, unique within a roster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A player or NPC visible to the observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Same as the key this actor is stored under.
    pub id: ActorId,
    /// Display name.
    pub name: String,
    /// Free-text description; may change between snapshots.
    #[serde(default)]
    pub appearance: String,
    /// Observations written by the observing agent.
    #[serde(default)]
    pub notes: String,
    /// Whether the actor was included in the latest snapshot.
    #[serde(default)]
    pub present: bool,
    /// Time of the last snapshot that included this actor.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Actor {
    /// Create an actor that has not yet been seen in a snapshot.
    pub fn new(id: impl Into<ActorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            appearance: String::new(),
            notes: String::new(),
            present: false,
            last_seen: None,
        }
    }

    /// Check if a name matches this actor (case-insensitive).
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase() == query.to_lowercase()
    }

    /// Merge observed fields from a snapshot entry. `notes` is left alone.
    pub(crate) fn observe(&mut self, entry: &ValidSnapshot<'_>, now: DateTime<Utc>) {
        self.name = entry.name.to_string();
        if let Some(appearance) = entry.appearance {
            self.appearance = appearance.to_string();
        }
        self.present = true;
        self.last_seen = Some(entry.last_seen.unwrap_or(now));
    }
}

/// One partial actor description from the observation source.
///
/// Only `id` and `name` are required. Any other field the source sends,
/// `notes` included, is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    /// Sighting time reported by the source; defaults to the reconciliation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

impl ActorSnapshot {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = Some(appearance.into());
        self
    }

    pub fn with_last_seen(mut self, last_seen: DateTime<Utc>) -> Self {
        self.last_seen = Some(last_seen);
        self
    }

    /// Check the required fields. Blank strings count as missing.
    pub(crate) fn validate(&self) -> Result<ValidSnapshot<'_>, SnapshotError> {
        let id = non_blank(&self.id).ok_or(SnapshotError::MissingId)?;
        let name = non_blank(&self.name).ok_or(SnapshotError::MissingName)?;
        Ok(ValidSnapshot {
            id,
            name,
            appearance: self.appearance.as_deref(),
            last_seen: self.last_seen,
        })
    }
}

/// A snapshot entry with its required fields present.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValidSnapshot<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub appearance: Option<&'a str>,
    pub last_seen: Option<DateTime<Utc>>,
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}
