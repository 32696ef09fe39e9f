//! Merging snapshots of nearby actors into a roster record.

use super::actor::{Actor, ActorId, ActorSnapshot};
use super::record::RosterRecord;
use crate::config::RosterConfig;
use crate::error::SnapshotError;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Produces new roster records from old ones and fresh observations.
///
/// Holds only configuration. Every operation is a pure read-modify-write
/// of the record passed in; callers must serialize operations per observer.
#[derive(Debug, Clone, Default)]
pub struct RosterReconciler {
    config: RosterConfig,
}

/// Result of one reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The updated record, within the size ceiling.
    pub record: RosterRecord,
    /// Ids that joined, in snapshot order. An id may also appear in
    /// `pruned` when the size ceiling evicted it in the same call.
    pub joined: Vec<ActorId>,
    /// Ids that left, in id order.
    pub left: Vec<ActorId>,
    /// Ids evicted to fit the size ceiling, least recently seen first.
    pub pruned: Vec<ActorId>,
    /// Snapshot entries that were skipped, by position, with the reason.
    pub skipped: Vec<(usize, SnapshotError)>,
}

impl Reconciliation {
    /// Whether any membership change happened.
    pub fn changed(&self) -> bool {
        !self.joined.is_empty() || !self.left.is_empty() || !self.pruned.is_empty()
    }

    pub fn into_record(self) -> RosterRecord {
        self.record
    }
}

impl RosterReconciler {
    /// Create a reconciler with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconciler with the given config.
    pub fn with_config(config: RosterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Reconcile `old` with a snapshot taken now.
    pub fn reconcile(&self, old: &RosterRecord, snapshot: &[ActorSnapshot]) -> Reconciliation {
        self.reconcile_at(old, snapshot, Utc::now())
    }

    /// Reconcile `old` with a snapshot taken at `now`.
    ///
    /// Joins and leaves are each reported as one batched event, joins first.
    /// Entries missing an `id` or `name` are skipped. `notes` are never
    /// touched.
    pub fn reconcile_at(
        &self,
        old: &RosterRecord,
        snapshot: &[ActorSnapshot],
        now: DateTime<Utc>,
    ) -> Reconciliation {
        let mut record = old.clone();
        let mut joined = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = BTreeSet::new();

        for (index, entry) in snapshot.iter().enumerate() {
            let entry = match entry.validate() {
                Ok(entry) => entry,
                Err(reason) => {
                    tracing::warn!(index, %reason, "Skipping snapshot entry");
                    skipped.push((index, reason));
                    continue;
                }
            };

            let id = ActorId::new(entry.id);
            let was_present = old.members.get(&id).is_some_and(|a| a.present);
            if !was_present && !seen.contains(&id) {
                joined.push(id.clone());
            }

            record
                .members
                .entry(id.clone())
                .or_insert_with(|| Actor::new(id.clone(), entry.name))
                .observe(&entry, now);
            seen.insert(id);
        }

        let left: Vec<ActorId> = old
            .present_members()
            .filter(|a| !seen.contains(&a.id))
            .map(|a| a.id.clone())
            .collect();
        for id in &left {
            if let Some(actor) = record.members.get_mut(id) {
                actor.present = false;
            }
        }

        if !joined.is_empty() {
            let names = names_of(&record, &joined);
            record.push_update(format!("{names} joined the group"));
        }
        if !left.is_empty() {
            let names = names_of(old, &left);
            record.push_update(format!("{names} left the group"));
        }

        record.refresh_summary();
        record.last_updated = Some(now);

        let (record, pruned) = self.enforce_size_limit(record);

        tracing::debug!(
            joined = joined.len(),
            left = left.len(),
            pruned = pruned.len(),
            skipped = skipped.len(),
            present = record.present_count(),
            "Reconciled roster"
        );

        Reconciliation {
            record,
            joined,
            left,
            pruned,
            skipped,
        }
    }

    /// Evict least-recently-seen members until the record fits the ceiling.
    ///
    /// A single "Pruned N stale member(s)" event is appended when anything
    /// was evicted; its size is counted against the ceiling too.
    pub(crate) fn enforce_size_limit(&self, record: RosterRecord) -> (RosterRecord, Vec<ActorId>) {
        let limit = self.config.size_limit;
        if record.serialized_len() <= limit {
            return (record, Vec::new());
        }

        let mut order: Vec<(Option<DateTime<Utc>>, ActorId)> = record
            .members
            .values()
            .map(|a| (a.last_seen, a.id.clone()))
            .collect();
        order.sort();

        let mut base = record;
        let mut pruned = Vec::new();
        for (_, id) in order {
            base.members.remove(&id);
            pruned.push(id);
            base.refresh_summary();

            let mut candidate = base.clone();
            candidate.push_update(pruned_event(pruned.len()));
            if candidate.serialized_len() <= limit {
                return (candidate, pruned);
            }
        }

        // Updates and summary alone exceed the ceiling; they are never dropped.
        tracing::warn!(
            limit,
            len = base.serialized_len(),
            "Roster record exceeds size limit with no members left"
        );
        base.push_update(pruned_event(pruned.len()));
        (base, pruned)
    }
}

fn pruned_event(count: usize) -> String {
    format!("Pruned {count} stale member(s) to fit size limit")
}

fn names_of(record: &RosterRecord, ids: &[ActorId]) -> String {
    ids.iter()
        .map(|id| {
            record
                .members
                .get(id)
                .map_or(id.as_str(), |a| a.name.as_str())
        })
        .collect::<Vec<_>>()
        .join(", ")
}
