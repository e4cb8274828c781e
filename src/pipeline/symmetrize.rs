#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::model::{DirectedEdge, Friendship};
use crate::types::PersonId;

/// Directed, deduplicated friend adjacency.
///
/// Every input pair `(a, b)` contributes `a -> b` and `b -> a` exactly once,
/// whatever order or multiplicity it had in the input.
#[derive(Clone, Debug, Default)]
pub struct FriendGraph {
    adjacency: FxHashMap<PersonId, Vec<PersonId>>,
    edge_count: usize,
}

/// Counters describing a symmetrize run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SymmetrizeStats {
    /// Friendship rows seen, duplicates and self loops included.
    pub input_rows: u64,
    /// Rows naming the same person twice.
    pub self_loops_dropped: u64,
    /// Directed edges in the resulting graph.
    pub directed_edges: u64,
}

/// Expands undirected friendships into a directed adjacency relation.
pub fn symmetrize(friends: &[Friendship]) -> (FriendGraph, SymmetrizeStats) {
    let mut stats = SymmetrizeStats {
        input_rows: friends.len() as u64,
        ..SymmetrizeStats::default()
    };
    let mut adjacency: FxHashMap<PersonId, Vec<PersonId>> = FxHashMap::default();
    for row in friends {
        if row.is_self_loop() {
            stats.self_loops_dropped += 1;
            continue;
        }
        adjacency.entry(row.a).or_default().push(row.b);
        adjacency.entry(row.b).or_default().push(row.a);
    }

    let mut edge_count = 0usize;
    for friends in adjacency.values_mut() {
        friends.sort_unstable();
        friends.dedup();
        edge_count += friends.len();
    }
    stats.directed_edges = edge_count as u64;

    (
        FriendGraph {
            adjacency,
            edge_count,
        },
        stats,
    )
}

impl FriendGraph {
    /// Friends of `person`, sorted ascending. Empty for unknown persons.
    pub fn friends_of(&self, person: PersonId) -> &[PersonId] {
        self.adjacency
            .get(&person)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True when the directed edge `source -> friend` exists.
    pub fn contains(&self, source: PersonId, friend: PersonId) -> bool {
        self.friends_of(source).binary_search(&friend).is_ok()
    }

    /// Persons with at least one friend, sorted ascending.
    pub fn persons(&self) -> Vec<PersonId> {
        let mut persons: Vec<PersonId> = self.adjacency.keys().copied().collect();
        persons.sort_unstable();
        persons
    }

    /// Every directed edge, in no particular order.
    pub fn edges(&self) -> impl Iterator<Item = DirectedEdge> + '_ {
        self.adjacency.iter().flat_map(|(source, friends)| {
            friends.iter().map(move |friend| DirectedEdge {
                source: *source,
                friend: *friend,
            })
        })
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// True when no person has a friend.
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}
