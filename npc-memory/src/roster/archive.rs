//! Moving members out of the roster into long-term memory.

use super::actor::{Actor, ActorId};
use super::notes::NoteEdit;
use super::reconcile::RosterReconciler;
use super::record::RosterRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What is kept about an actor after it leaves the roster for good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedProfile {
    pub id: ActorId,
    pub name: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub notes: String,
}

impl From<Actor> for ArchivedProfile {
    fn from(actor: Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name,
            last_seen: actor.last_seen,
            notes: actor.notes,
        }
    }
}

impl fmt::Display for ArchivedProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player profile for {}: Last seen ", self.id)?;
        match self.last_seen {
            Some(at) => write!(f, "{}", at.to_rfc3339())?,
            None => f.write_str("never")?,
        }
        write!(f, ". Notes: {}", self.notes)
    }
}

impl RosterReconciler {
    /// Remove a member and hand back its archived profile.
    ///
    /// The summary is regenerated. No event is logged: archiving is the
    /// agent's decision, not a presence change.
    pub fn archive(
        &self,
        mut record: RosterRecord,
        actor_id: &str,
    ) -> (RosterRecord, Option<ArchivedProfile>) {
        let removed = record.members.remove(&ActorId::new(actor_id));
        if removed.is_some() {
            record.refresh_summary();
        }
        (record, removed.map(ArchivedProfile::from))
    }

    /// Bring an archived actor back, noting it as a previous visitor.
    ///
    /// The profile is appended to the actor's notes as
    /// `"Previous visitor: <profile>"`. An actor missing from the roster is
    /// recreated under its archived name without being marked present; the
    /// next snapshot that includes it reports the join.
    pub fn restore(&self, mut record: RosterRecord, profile: &ArchivedProfile) -> RosterRecord {
        self.try_restore(&mut record, profile);
        record
    }

    /// In-place [`restore`](Self::restore) that reports what happened.
    pub fn try_restore(&self, record: &mut RosterRecord, profile: &ArchivedProfile) -> NoteEdit {
        let base = record.members.get(&profile.id).cloned().unwrap_or_else(|| {
            let mut actor = Actor::new(profile.id.clone(), profile.name.clone());
            actor.last_seen = profile.last_seen;
            actor
        });
        self.append_to(record, base, &format!("Previous visitor: {profile}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::testing::{fixed_time, record_with_present};

    #[test]
    fn test_archive_present_member() {
        let reconciler = RosterReconciler::new();
        let record = record_with_present(&[("p1", "Alice"), ("p2", "Bob")]);
        let record = reconciler.append_note(record, "p1", "loves exploring the garden");

        let (record, profile) = reconciler.archive(record, "p1");
        let profile = profile.unwrap();

        assert!(record.member("p1").is_none());
        assert_eq!(record.summary, "Current members: Bob");
        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.last_seen, Some(fixed_time(0)));
        assert_eq!(
            profile.to_string(),
            "Player profile for p1: Last seen 1970-01-01T00:00:00+00:00. Notes: loves exploring the garden"
        );
        assert!(record.updates.is_empty());
    }

    #[test]
    fn test_archive_unknown_member() {
        let reconciler = RosterReconciler::new();
        let record = record_with_present(&[("p1", "Alice")]);
        let (after, profile) = reconciler.archive(record.clone(), "nobody");
        assert!(profile.is_none());
        assert_eq!(after, record);
    }

    #[test]
    fn test_never_seen_profile() {
        let reconciler = RosterReconciler::new();
        let record = reconciler.append_note(RosterRecord::new(), "p7", "rumoured thief");
        let (_, profile) = reconciler.archive(record, "p7");
        assert_eq!(
            profile.unwrap().to_string(),
            "Player profile for p7: Last seen never. Notes: rumoured thief"
        );
    }

    #[test]
    fn test_archive_then_restore() {
        let reconciler = RosterReconciler::new();
        let record = record_with_present(&[("p1", "Alice"), ("p2", "Bob")]);
        let record = reconciler.append_note(record, "p1", "loves exploring the garden");

        let (record, profile) = reconciler.archive(record, "p1");
        let profile = profile.unwrap();
        let record = reconciler.restore(record, &profile);

        let alice = record.member("p1").unwrap();
        assert_eq!(alice.name, "Alice");
        assert!(!alice.present);
        assert_eq!(alice.last_seen, Some(fixed_time(0)));
        assert_eq!(
            alice.notes,
            "Previous visitor: Player profile for p1: Last seen 1970-01-01T00:00:00+00:00. \
             Notes: loves exploring the garden"
        );
        assert_eq!(record.summary, "Current members: Bob");
        assert!(record.updates.is_empty());
    }

    #[test]
    fn test_restore_appends_to_existing_notes() {
        let reconciler = RosterReconciler::new();
        let record = reconciler.append_note(record_with_present(&[("p1", "Alice")]), "p1", "back again");
        let profile = ArchivedProfile {
            id: ActorId::new("p1"),
            name: "Alice".into(),
            last_seen: None,
            notes: "shy".into(),
        };

        let record = reconciler.restore(record, &profile);
        let alice = record.member("p1").unwrap();
        assert!(alice.present);
        assert_eq!(
            alice.notes,
            "back again; Previous visitor: Player profile for p1: Last seen never. Notes: shy"
        );
    }

    #[test]
    fn test_restore_refused_over_limit() {
        let reconciler = RosterReconciler::with_config(RosterConfig::new().with_size_limit(300));
        let mut record = RosterRecord::new();
        let profile = ArchivedProfile {
            id: ActorId::new("p1"),
            name: "Alice".into(),
            last_seen: None,
            notes: "x".repeat(400),
        };

        assert_eq!(reconciler.try_restore(&mut record, &profile), NoteEdit::ExceedsLimit);
        assert!(record.members.is_empty());
    }
}
