//! Group-membership memory for one observer.
//!
//! A [`RosterRecord`] is the bounded, persisted view of who is around the
//! observer. [`RosterRecord`]s are only changed through the
//! [`RosterReconciler`]:
//!
//! - `reconcile` merges a snapshot of nearby actors, logs batched join and
//!   leave events and prunes the record to its size ceiling.
//! - `append_note` / `replace_note` are the agent's own edits to `notes`.
//! - `archive` removes a member and returns its profile for long-term storage;
//!   `restore` brings one back with that profile in its notes.

mod actor;
mod archive;
mod notes;
mod reconcile;
mod record;

pub use actor::{Actor, ActorId, ActorSnapshot};
pub use archive::ArchivedProfile;
pub use notes::NoteEdit;
pub use reconcile::{Reconciliation, RosterReconciler};
pub use record::{RosterRecord, EMPTY_SUMMARY, MAX_UPDATES};
