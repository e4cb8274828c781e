#![forbid(unsafe_code)]

use rustc_hash::FxHashSet;

use crate::pipeline::propagate::Propagated;
use crate::types::{ArtistId, PersonId, Polarity};

/// Distinct `(person, artist)` pairs per polarity, friend identity dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Aggregates {
    /// Artists some friend likes, per person.
    pub should_like: FxHashSet<(PersonId, ArtistId)>,
    /// Artists some friend dislikes, per person.
    pub should_dislike: FxHashSet<(PersonId, ArtistId)>,
}

impl Aggregates {
    /// Pair set of the given polarity.
    pub fn of(&self, polarity: Polarity) -> &FxHashSet<(PersonId, ArtistId)> {
        match polarity {
            Polarity::Like => &self.should_like,
            Polarity::Dislike => &self.should_dislike,
        }
    }

    /// Unions another partition's aggregates into this one.
    pub fn merge(&mut self, other: Aggregates) {
        self.should_like.extend(other.should_like);
        self.should_dislike.extend(other.should_dislike);
    }

    /// Number of distinct should-like pairs.
    pub fn should_like_count(&self) -> usize {
        self.should_like.len()
    }

    /// Number of distinct should-dislike pairs.
    pub fn should_dislike_count(&self) -> usize {
        self.should_dislike.len()
    }

    /// Pairs of the given polarity sorted by `(person, artist)`.
    pub fn sorted(&self, polarity: Polarity) -> Vec<(PersonId, ArtistId)> {
        let mut pairs: Vec<_> = self.of(polarity).iter().copied().collect();
        pairs.sort_unstable();
        pairs
    }
}

/// Collapses propagated facts across mediating friends.
pub fn aggregate(propagated: &Propagated) -> Aggregates {
    let collect = |polarity: Polarity| -> FxHashSet<(PersonId, ArtistId)> {
        propagated
            .of(polarity)
            .iter()
            .map(|fact| (fact.source, fact.artist))
            .collect()
    };
    Aggregates {
        should_like: collect(Polarity::Like),
        should_dislike: collect(Polarity::Dislike),
    }
}
