//! Agent-driven note edits.
//!
//! Notes are the only field the observing agent writes. They change by
//! appending or by replacing an exact substring, never by a snapshot merge.

use super::actor::{Actor, ActorId};
use super::reconcile::RosterReconciler;
use super::record::RosterRecord;

/// Outcome of a note edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEdit {
    /// The notes were changed.
    Applied,
    /// No member has the given id.
    ActorNotFound,
    /// The substring to replace does not occur in the notes.
    NoMatch,
    /// The edit would push the record over the size ceiling.
    ExceedsLimit,
}

impl NoteEdit {
    pub fn is_applied(&self) -> bool {
        matches!(self, NoteEdit::Applied)
    }
}

impl RosterReconciler {
    /// Append a note to an actor, creating the actor if it is unknown.
    ///
    /// A created actor is an out-of-band observation: it is named after its
    /// id and is not marked present.
    pub fn append_note(&self, mut record: RosterRecord, actor_id: &str, note: &str) -> RosterRecord {
        self.try_append_note(&mut record, actor_id, note);
        record
    }

    /// Replace the first occurrence of `old` in an actor's notes with `new`.
    ///
    /// Returns the record unchanged when the actor or the substring is
    /// missing; two agents editing the same note can race into this.
    pub fn replace_note(
        &self,
        mut record: RosterRecord,
        actor_id: &str,
        old: &str,
        new: &str,
    ) -> RosterRecord {
        self.try_replace_note(&mut record, actor_id, old, new);
        record
    }

    /// In-place [`append_note`](Self::append_note) that reports what happened.
    pub fn try_append_note(&self, record: &mut RosterRecord, actor_id: &str, note: &str) -> NoteEdit {
        let id = ActorId::new(actor_id);
        let base = record
            .members
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Actor::new(id.clone(), actor_id));
        self.append_to(record, base, note)
    }

    /// [`append_note`](Self::append_note) addressed by display name.
    ///
    /// Names match case-insensitively. An unknown name leaves the record
    /// unchanged, since there is no id to create an actor under.
    pub fn append_note_by_name(&self, mut record: RosterRecord, name: &str, note: &str) -> RosterRecord {
        self.try_append_note_by_name(&mut record, name, note);
        record
    }

    /// [`replace_note`](Self::replace_note) addressed by display name.
    pub fn replace_note_by_name(
        &self,
        mut record: RosterRecord,
        name: &str,
        old: &str,
        new: &str,
    ) -> RosterRecord {
        self.try_replace_note_by_name(&mut record, name, old, new);
        record
    }

    pub fn try_append_note_by_name(&self, record: &mut RosterRecord, name: &str, note: &str) -> NoteEdit {
        let Some(base) = record.find_by_name(name).cloned() else {
            return NoteEdit::ActorNotFound;
        };
        self.append_to(record, base, note)
    }

    pub fn try_replace_note_by_name(
        &self,
        record: &mut RosterRecord,
        name: &str,
        old: &str,
        new: &str,
    ) -> NoteEdit {
        let Some(id) = record.find_by_name(name).map(|a| a.id.to_string()) else {
            return NoteEdit::ActorNotFound;
        };
        self.try_replace_note(record, &id, old, new)
    }

    /// In-place [`replace_note`](Self::replace_note) that reports what happened.
    ///
    /// An empty `old` never matches.
    pub fn try_replace_note(
        &self,
        record: &mut RosterRecord,
        actor_id: &str,
        old: &str,
        new: &str,
    ) -> NoteEdit {
        let Some(actor) = record.members.get(&ActorId::new(actor_id)) else {
            return NoteEdit::ActorNotFound;
        };
        if old.is_empty() || !actor.notes.contains(old) {
            return NoteEdit::NoMatch;
        }

        let mut updated = actor.clone();
        updated.notes = actor.notes.replacen(old, new, 1);
        self.commit(record, updated)
    }

    /// Append `note` to the notes of `base` and store it.
    pub(crate) fn append_to(&self, record: &mut RosterRecord, mut base: Actor, note: &str) -> NoteEdit {
        if !base.notes.is_empty() {
            base.notes.push_str(&self.config().note_separator);
        }
        base.notes.push_str(note);
        self.commit(record, base)
    }

    /// Store `updated` unless that would exceed the ceiling.
    fn commit(&self, record: &mut RosterRecord, updated: Actor) -> NoteEdit {
        let id = updated.id.clone();
        let previous = record.members.insert(id.clone(), updated);
        if record.serialized_len() <= self.config().size_limit {
            return NoteEdit::Applied;
        }

        match previous {
            Some(actor) => record.members.insert(id, actor),
            None => record.members.remove(&id),
        };
        tracing::debug!(limit = self.config().size_limit, "Note edit refused: record too large");
        NoteEdit::ExceedsLimit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosterConfig;
    use crate::testing::record_with_present;

    #[test]
    fn test_append_to_existing_notes() {
        let reconciler = RosterReconciler::new();
        let record = record_with_present(&[("p1", "Alice")]);

        let record = reconciler.append_note(record, "p1", "likes gardens");
        let record = reconciler.append_note(record, "p1", "asked about the well");

        assert_eq!(
            record.member("p1").unwrap().notes,
            "likes gardens; asked about the well"
        );
    }

    #[test]
    fn test_append_creates_absent_actor() {
        let reconciler = RosterReconciler::new();
        let record = reconciler.append_note(RosterRecord::new(), "p9", "heard about from Bob");

        let actor = record.member("p9").unwrap();
        assert_eq!(actor.name, "p9");
        assert_eq!(actor.notes, "heard about from Bob");
        assert!(!actor.present);
        assert!(actor.last_seen.is_none());
        assert!(record.updates.is_empty());
    }

    #[test]
    fn test_replace_first_occurrence_only() {
        let reconciler = RosterReconciler::new();
        let mut record = reconciler.append_note(record_with_present(&[("p1", "Alice")]), "p1", "shy");
        record = reconciler.append_note(record, "p1", "shy around guards");

        let before = record.member("p1").unwrap().last_seen;
        let record = reconciler.replace_note(record, "p1", "shy", "bold");

        let alice = record.member("p1").unwrap();
        assert_eq!(alice.notes, "bold; shy around guards");
        assert_eq!(alice.last_seen, before);
    }

    #[test]
    fn test_replace_no_match_is_noop() {
        let reconciler = RosterReconciler::new();
        let mut record = reconciler.append_note(record_with_present(&[("p1", "Alice")]), "p1", "shy");
        let before = record.to_json().unwrap();

        assert_eq!(
            reconciler.try_replace_note(&mut record, "p1", "brave", "bold"),
            NoteEdit::NoMatch
        );
        assert_eq!(
            reconciler.try_replace_note(&mut record, "p2", "shy", "bold"),
            NoteEdit::ActorNotFound
        );
        assert_eq!(
            reconciler.try_replace_note(&mut record, "p1", "", "bold"),
            NoteEdit::NoMatch
        );
        assert_eq!(record.to_json().unwrap(), before);
    }

    #[test]
    fn test_append_refused_over_limit() {
        let reconciler = RosterReconciler::with_config(RosterConfig::new().with_size_limit(400));
        let mut record = record_with_present(&[("p1", "Alice")]);
        let before = record.clone();

        let long_note = "x".repeat(500);
        assert_eq!(
            reconciler.try_append_note(&mut record, "p1", &long_note),
            NoteEdit::ExceedsLimit
        );
        assert_eq!(
            reconciler.try_append_note(&mut record, "p2", &long_note),
            NoteEdit::ExceedsLimit
        );
        assert_eq!(record, before);
    }

    #[test]
    fn test_edit_by_name() {
        let reconciler = RosterReconciler::new();
        let record = record_with_present(&[("p1", "Alice"), ("p2", "Bob")]);

        let record = reconciler.append_note_by_name(record, "bob", "carries a lute");
        let record = reconciler.replace_note_by_name(record, "BOB", "lute", "harp");
        assert_eq!(record.member("p2").unwrap().notes, "carries a harp");
        assert_eq!(record.member("p1").unwrap().notes, "");

        let mut record = record;
        assert_eq!(
            reconciler.try_append_note_by_name(&mut record, "Carol", "late"),
            NoteEdit::ActorNotFound
        );
        assert_eq!(
            reconciler.try_replace_note_by_name(&mut record, "Carol", "a", "b"),
            NoteEdit::ActorNotFound
        );
        assert_eq!(record.members.len(), 2);
    }
}
