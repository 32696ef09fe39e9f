//! Testing utilities.
//!
//! Fixtures for building snapshots and records with fixed timestamps, so
//! reconciliation scenarios are deterministic.

use crate::roster::{Actor, ActorId, ActorSnapshot, RosterRecord};
use chrono::{DateTime, Utc};

/// A snapshot entry with just the required fields.
pub fn snapshot(id: impl Into<String>, name: impl Into<String>) -> ActorSnapshot {
    ActorSnapshot::new(id, name)
}

/// A snapshot entry carrying an appearance.
pub fn snapshot_with_appearance(
    id: impl Into<String>,
    name: impl Into<String>,
    appearance: impl Into<String>,
) -> ActorSnapshot {
    ActorSnapshot::new(id, name).with_appearance(appearance)
}

/// A timestamp `seconds` after the Unix epoch.
pub fn fixed_time(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

/// A record whose members are all present and last seen at the epoch.
///
/// No events are logged; use a reconciliation to get those.
pub fn record_with_present(members: &[(&str, &str)]) -> RosterRecord {
    let mut record = RosterRecord::new();
    for &(id, name) in members {
        let mut actor = Actor::new(id, name);
        actor.present = true;
        actor.last_seen = Some(fixed_time(0));
        record.members.insert(ActorId::new(id), actor);
    }
    record.refresh_summary();
    record
}
