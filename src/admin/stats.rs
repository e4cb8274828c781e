use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::model::{Preference, Relations};
use crate::pipeline::{Pipeline, PipelineOptions, PipelineStats};
use crate::types::{ArtistId, PersonId};

/// Summary of the input relations plus one pipeline run over them.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    /// `likes` relation section.
    pub likes: RelationStatsSection,
    /// `dislikes` relation section.
    pub dislikes: RelationStatsSection,
    /// `friends` relation section.
    pub friends: RelationStatsSection,
    /// Cross-relation counts.
    pub universe: UniverseStatsSection,
    /// Per-stage pipeline counters.
    pub pipeline: PipelineStats,
}

/// Row counts for one relation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RelationStatsSection {
    /// Rows as loaded.
    pub rows: u64,
    /// Distinct rows; friendships count `(a, b)` and `(b, a)` once.
    pub distinct: u64,
    /// `rows - distinct`.
    pub duplicates: u64,
}

/// Counts spanning all three relations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UniverseStatsSection {
    /// Persons mentioned anywhere.
    pub persons: u64,
    /// Artists mentioned anywhere.
    pub artists: u64,
    /// Persons with at least one friend after self loops are dropped.
    pub persons_with_friends: u64,
    /// Persons with at least one recommendation.
    pub persons_with_recommendations: u64,
}

/// Builds a [`StatsReport`] by scanning the relations and running the pipeline.
pub fn stats(relations: &Relations, opts: &PipelineOptions) -> StatsReport {
    let output = Pipeline::new(opts.clone()).run(relations);

    let mut persons: FxHashSet<PersonId> = FxHashSet::default();
    let mut artists: FxHashSet<ArtistId> = FxHashSet::default();
    for row in relations.likes.iter().chain(relations.dislikes.iter()) {
        persons.insert(row.person);
        artists.insert(row.artist);
    }
    let mut with_friends: FxHashSet<PersonId> = FxHashSet::default();
    let mut distinct_friendships = FxHashSet::default();
    for row in &relations.friends {
        persons.insert(row.a);
        persons.insert(row.b);
        distinct_friendships.insert(row.canonical());
        if !row.is_self_loop() {
            with_friends.insert(row.a);
            with_friends.insert(row.b);
        }
    }
    let recommended: FxHashSet<PersonId> =
        output.recommendations.iter().map(|r| r.person).collect();

    StatsReport {
        likes: preference_section(&relations.likes),
        dislikes: preference_section(&relations.dislikes),
        friends: section(relations.friends.len(), distinct_friendships.len()),
        universe: UniverseStatsSection {
            persons: persons.len() as u64,
            artists: artists.len() as u64,
            persons_with_friends: with_friends.len() as u64,
            persons_with_recommendations: recommended.len() as u64,
        },
        pipeline: output.stats,
    }
}

fn preference_section(rows: &[Preference]) -> RelationStatsSection {
    let distinct: FxHashSet<&Preference> = rows.iter().collect();
    section(rows.len(), distinct.len())
}

fn section(rows: usize, distinct: usize) -> RelationStatsSection {
    RelationStatsSection {
        rows: rows as u64,
        distinct: distinct as u64,
        duplicates: (rows - distinct) as u64,
    }
}
