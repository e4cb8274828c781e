#![forbid(unsafe_code)]

//! Reporting and input-integrity utilities.
//!
//! These operate on a loaded [`Relations`](crate::model::Relations) snapshot and
//! never alter what the pipeline computes.

mod stats;
mod verify;

/// Relation and pipeline statistics.
///
/// Summarises row, duplicate and distinct counts per relation alongside the
/// counters of a full pipeline run.
pub use stats::{stats, RelationStatsSection, StatsReport, UniverseStatsSection};

/// Input verification.
///
/// Reports conflicting opinions, self-friendships, duplicates and similar
/// conditions the pipeline tolerates.
pub use verify::{
    verify, VerifyCounts, VerifyFinding, VerifyOptions, VerifyReport, VerifySeverity,
};
