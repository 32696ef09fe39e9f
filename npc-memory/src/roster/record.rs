//! The persisted, bounded group-membership record of one observer.

use super::actor::{Actor, ActorId};
use crate::error::RecordError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::io;

/// Maximum number of membership events kept in `updates`.
pub const MAX_UPDATES: usize = 10;

/// Summary used when no member is present.
pub const EMPTY_SUMMARY: &str = "No members present";

/// Group membership as seen by one observer.
///
/// Created empty when the observer starts and afterwards only changed
/// through [`RosterReconciler`](crate::RosterReconciler) operations. The
/// JSON shape of this struct is the persisted blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    /// Every known actor, keyed by id.
    #[serde(default)]
    pub members: BTreeMap<ActorId, Actor>,

    /// Human-readable membership events, oldest first.
    #[serde(default)]
    pub updates: VecDeque<String>,

    /// One-line description of who is present. Derived from `members`.
    #[serde(default = "empty_summary")]
    pub summary: String,

    /// Time of the last reconciliation.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl RosterRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self {
            members: BTreeMap::new(),
            updates: VecDeque::new(),
            summary: empty_summary(),
            last_updated: None,
        }
    }

    /// Get a member by id.
    pub fn member(&self, id: &str) -> Option<&Actor> {
        self.members.get(&ActorId::new(id))
    }

    /// Find a member by display name (case-insensitive exact match).
    ///
    /// If several members share the name, the one with the smallest id wins.
    pub fn find_by_name(&self, name: &str) -> Option<&Actor> {
        self.members.values().find(|a| a.matches_name(name))
    }

    /// Members currently present, in id order.
    pub fn present_members(&self) -> impl Iterator<Item = &Actor> {
        self.members.values().filter(|a| a.present)
    }

    /// Number of members currently present.
    pub fn present_count(&self) -> usize {
        self.present_members().count()
    }

    /// Length in bytes of the compact JSON form of this record.
    pub fn serialized_len(&self) -> usize {
        let mut counter = ByteCounter(0);
        match serde_json::to_writer(&mut counter, self) {
            Ok(()) => counter.0,
            Err(e) => {
                // Only string keys and plain values are serialized, so this is unreachable.
                tracing::error!(error = %e, "Failed to measure roster record");
                0
            }
        }
    }

    /// Serialize to the persisted JSON blob.
    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a record from its persisted JSON blob.
    ///
    /// Members are keyed by their own `id`, whatever key the blob stored
    /// them under. When two entries carry the same id the later key wins.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let mut record: Self = serde_json::from_str(json)?;
        if record.members.iter().any(|(key, actor)| *key != actor.id) {
            tracing::warn!("Re-keying roster members whose key differs from their id");
            record.members = std::mem::take(&mut record.members)
                .into_values()
                .map(|actor| (actor.id.clone(), actor))
                .collect();
        }
        Ok(record)
    }

    /// Load a record, refusing blobs over `limit` bytes.
    pub fn from_json_bounded(json: &str, limit: usize) -> Result<Self, RecordError> {
        if json.len() > limit {
            return Err(RecordError::TooLarge {
                len: json.len(),
                limit,
            });
        }
        Self::from_json(json)
    }

    /// Append an event, discarding the oldest beyond [`MAX_UPDATES`].
    pub(crate) fn push_update(&mut self, event: String) {
        self.updates.push_back(event);
        while self.updates.len() > MAX_UPDATES {
            self.updates.pop_front();
        }
    }

    /// Regenerate `summary` from the present members.
    pub(crate) fn refresh_summary(&mut self) {
        let names: Vec<&str> = self.present_members().map(|a| a.name.as_str()).collect();
        self.summary = if names.is_empty() {
            empty_summary()
        } else {
            format!("Current members: {}", names.join(", "))
        };
    }
}

impl Default for RosterRecord {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_summary() -> String {
    EMPTY_SUMMARY.to_string()
}

/// Counts serialized bytes without buffering them.
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let record = RosterRecord::new();
        assert!(record.members.is_empty());
        assert!(record.updates.is_empty());
        assert_eq!(record.summary, EMPTY_SUMMARY);
        assert!(record.last_updated.is_none());
    }

    #[test]
    fn test_push_update_is_fifo() {
        let mut record = RosterRecord::new();
        for i in 0..15 {
            record.push_update(format!("event {i}"));
        }
        assert_eq!(record.updates.len(), MAX_UPDATES);
        assert_eq!(record.updates.front().unwrap(), "event 5");
        assert_eq!(record.updates.back().unwrap(), "event 14");
    }

    #[test]
    fn test_serialized_len_matches_json() {
        let mut record = RosterRecord::new();
        record
            .members
            .insert(ActorId::new("p1"), Actor::new("p1", "Zoë"));
        record.push_update("Zoë joined the group".into());
        assert_eq!(record.serialized_len(), record.to_json().unwrap().len());
    }

    #[test]
    fn test_json_round_trip_keeps_field_names() {
        let mut record = RosterRecord::new();
        record
            .members
            .insert(ActorId::new("p1"), Actor::new("p1", "Alice"));
        let json = record.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["members"]["p1"]["name"], "Alice");
        assert!(value.get("updates").is_some());
        assert!(value.get("summary").is_some());
        assert!(value.get("last_updated").is_some());

        assert_eq!(RosterRecord::from_json(&json).unwrap(), record);
    }

    #[test]
    fn test_from_json_bounded() {
        let json = RosterRecord::new().to_json().unwrap();
        assert!(RosterRecord::from_json_bounded(&json, 5000).is_ok());
        assert!(matches!(
            RosterRecord::from_json_bounded(&json, 10),
            Err(RecordError::TooLarge { limit: 10, .. })
        ));
    }

    #[test]
    fn test_from_json_rekeys_members_by_id() {
        let json = r#"{"members": {"stale": {"id": "p1", "name": "Alice"}}, "updates": []}"#;
        let record = RosterRecord::from_json(json).unwrap();

        assert_eq!(record.members.len(), 1);
        assert!(record.members.contains_key(&ActorId::new("p1")));
        assert_eq!(record.member("p1").unwrap().name, "Alice");
        assert_eq!(record.summary, EMPTY_SUMMARY);
    }

    #[test]
    fn test_find_by_name() {
        let mut record = RosterRecord::new();
        record
            .members
            .insert(ActorId::new("p2"), Actor::new("p2", "Bob"));
        assert_eq!(record.find_by_name("bob").unwrap().id.as_str(), "p2");
        assert!(record.find_by_name("Carol").is_none());
    }
}
