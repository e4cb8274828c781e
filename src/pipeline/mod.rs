#![forbid(unsafe_code)]

//! Recommendation pipeline.
//!
//! ```text
//! friends ──symmetrize──▶ FriendGraph ─┐
//! likes/dislikes ──▶ OpinionIndex ─────┴─propagate─▶ Propagated
//!   ──aggregate─▶ Aggregates ──resolve─▶ Vec<Recommendation>
//! ```
//!
//! Every stage is a pure function over the immutable input snapshot.
//! Propagation and aggregation may run per partition of source persons;
//! resolution always waits for every partition.

pub mod aggregate;
pub mod explain;
pub mod propagate;
pub mod resolve;
pub mod symmetrize;

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Recommendation, Relations};
use crate::types::PersonId;

pub use aggregate::{aggregate, Aggregates};
pub use explain::{explain, explain_person, Explanation, Verdict};
pub use propagate::{propagate, propagate_sources, OpinionIndex, PersonOpinions, Propagated};
pub use resolve::resolve;
pub use symmetrize::{symmetrize, FriendGraph, SymmetrizeStats};

/// Options controlling a pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    /// Number of source-person partitions. `1` runs on the calling thread,
    /// `0` uses one partition per worker thread.
    pub partitions: usize,
    /// Keep every propagated `(source, friend, artist)` fact in the output.
    pub keep_trace: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            partitions: 1,
            keep_trace: false,
        }
    }
}

impl PipelineOptions {
    /// Sets the partition count.
    pub fn partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Enables or disables trace retention.
    pub fn keep_trace(mut self, keep: bool) -> Self {
        self.keep_trace = keep;
        self
    }

    /// Never more partitions than source persons; extra buckets would be empty.
    fn effective_partitions(&self, sources: usize) -> usize {
        let requested = match self.partitions {
            0 => rayon::current_num_threads(),
            n => n,
        };
        requested.min(sources).max(1)
    }
}

/// Per-stage counters of a pipeline run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PipelineStats {
    /// Rows in `likes`.
    pub like_rows: u64,
    /// Rows in `dislikes`.
    pub dislike_rows: u64,
    /// Symmetrizer counters.
    pub symmetrize: SymmetrizeStats,
    /// Friend likes that survived the own-opinion filter.
    pub propagated_likes: u64,
    /// Friend dislikes that survived the own-opinion filter.
    pub propagated_dislikes: u64,
    /// Distinct should-like pairs.
    pub aggregated_likes: u64,
    /// Distinct should-dislike pairs.
    pub aggregated_dislikes: u64,
    /// Should-like pairs removed by a should-dislike pair.
    pub suppressed: u64,
    /// Final recommendation count.
    pub recommendations: u64,
    /// Partitions actually used.
    pub partitions: usize,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: f64,
}

/// Result of a pipeline run.
#[derive(Clone, Debug, Default)]
pub struct PipelineOutput {
    /// Recommendations sorted by `(person, artist)`.
    pub recommendations: Vec<Recommendation>,
    /// Aggregated should-like and should-dislike sets.
    pub aggregates: Aggregates,
    /// Propagated facts, present when [`PipelineOptions::keep_trace`] is set.
    pub trace: Option<Propagated>,
    /// Stage counters.
    pub stats: PipelineStats,
}

/// Configured pipeline runner.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Creates a runner with the given options.
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Options this runner was built with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Runs every stage over the snapshot.
    pub fn run(&self, relations: &Relations) -> PipelineOutput {
        let start = Instant::now();
        let (graph, sym_stats) = symmetrize(&relations.friends);
        debug!(
            input_rows = sym_stats.input_rows,
            self_loops_dropped = sym_stats.self_loops_dropped,
            directed_edges = sym_stats.directed_edges,
            "pipeline.symmetrize"
        );
        let index = OpinionIndex::build(relations);

        let persons = graph.persons();
        let partitions = self.options.effective_partitions(persons.len());
        let parts = if partitions <= 1 {
            vec![propagate_and_aggregate(&graph, &index, &persons)]
        } else {
            partition_sources(&persons, partitions)
                .par_iter()
                .map(|sources| propagate_and_aggregate(&graph, &index, sources))
                .collect()
        };

        let mut aggregates = Aggregates::default();
        let mut trace = self.options.keep_trace.then(Propagated::default);
        let mut propagated_likes = 0u64;
        let mut propagated_dislikes = 0u64;
        for (propagated, partial) in parts {
            propagated_likes += propagated.likes.len() as u64;
            propagated_dislikes += propagated.dislikes.len() as u64;
            if let Some(trace) = trace.as_mut() {
                trace.extend(propagated);
            }
            aggregates.merge(partial);
        }
        debug!(
            propagated_likes,
            propagated_dislikes,
            aggregated_likes = aggregates.should_like_count(),
            aggregated_dislikes = aggregates.should_dislike_count(),
            partitions,
            "pipeline.propagate"
        );

        let recommendations = resolve(&aggregates);
        let suppressed = (aggregates.should_like_count() - recommendations.len()) as u64;
        debug!(
            recommendations = recommendations.len(),
            suppressed, "pipeline.resolve"
        );

        let stats = PipelineStats {
            like_rows: relations.likes.len() as u64,
            dislike_rows: relations.dislikes.len() as u64,
            symmetrize: sym_stats,
            propagated_likes,
            propagated_dislikes,
            aggregated_likes: aggregates.should_like_count() as u64,
            aggregated_dislikes: aggregates.should_dislike_count() as u64,
            suppressed,
            recommendations: recommendations.len() as u64,
            partitions,
            elapsed_ms: start.elapsed().as_secs_f64() * 1_000.0,
        };
        info!(
            recommendations = stats.recommendations,
            suppressed = stats.suppressed,
            partitions = stats.partitions,
            duration_ms = stats.elapsed_ms,
            "pipeline.completed"
        );

        PipelineOutput {
            recommendations,
            aggregates,
            trace,
            stats,
        }
    }
}

/// Runs the pipeline with default options and returns only the recommendations.
pub fn recommend(relations: &Relations) -> Vec<Recommendation> {
    Pipeline::default().run(relations).recommendations
}

fn propagate_and_aggregate(
    graph: &FriendGraph,
    index: &OpinionIndex,
    sources: &[PersonId],
) -> (Propagated, Aggregates) {
    let propagated = propagate_sources(graph, index, sources);
    let aggregates = aggregate(&propagated);
    (propagated, aggregates)
}

/// Splits sources by `id mod partitions`. Aggregates are keyed by source, so
/// partitions never share an output pair.
fn partition_sources(persons: &[PersonId], partitions: usize) -> Vec<Vec<PersonId>> {
    let mut buckets = vec![Vec::new(); partitions];
    for &person in persons {
        let slot = person.0.rem_euclid(partitions as i64) as usize;
        buckets[slot].push(person);
    }
    buckets
}
