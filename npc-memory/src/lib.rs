//! Shared-state memory for NPC agents.
//!
//! This crate provides two independent components:
//! - [`RosterReconciler`]: keeps a bounded group-membership record in sync
//!   with snapshots of nearby actors, with batched join/leave events, a
//!   FIFO event log and a serialized-size ceiling.
//! - [`ResponseExtractor`]: folds a multi-part agent reply into a single
//!   [`ExtractedResponse`] with the final message, tool calls, results and
//!   reasoning.
//!
//! Both are pure and synchronous. Persisting records and serializing
//! operations per observer is up to the caller.
//!
//! # Quick Start
//!
//! ```
//! use npc_memory::{ActorSnapshot, RosterReconciler, RosterRecord};
//!
//! let reconciler = RosterReconciler::new();
//! let record = reconciler
//!     .reconcile(&RosterRecord::new(), &[ActorSnapshot::new("p1", "Alice")])
//!     .into_record();
//! assert_eq!(record.summary, "Current members: Alice");
//!
//! let record = reconciler.append_note(record, "p1", "asked about the old well");
//! let blob = record.to_json().unwrap();
//! assert!(blob.len() <= reconciler.config().size_limit);
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod response;
pub mod roster;
pub mod testing;

// Primary public API
pub use config::RosterConfig;
pub use dedup::DuplicateFilter;
pub use error::{ConfigError, RecordError, SnapshotError};
pub use response::{
    AgentReplyFragment, ExtractedResponse, ResponseExtractor, ToolCall, ToolCallResult, ToolStatus,
};
pub use roster::{
    Actor, ActorId, ActorSnapshot, ArchivedProfile, NoteEdit, Reconciliation, RosterReconciler,
    RosterRecord,
};
