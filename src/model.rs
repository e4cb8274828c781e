#![forbid(unsafe_code)]

//! Row types for the three input relations and the facts derived from them.

use serde::{Deserialize, Serialize};

use crate::types::{ArtistId, PersonId, Polarity};

/// A `(person, artist)` row of the `likes` or `dislikes` relation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Preference {
    /// Person holding the opinion.
    pub person: PersonId,
    /// Artist the opinion is about.
    pub artist: ArtistId,
}

impl Preference {
    /// Builds a preference row from raw identifiers.
    pub fn new(person: impl Into<PersonId>, artist: impl Into<ArtistId>) -> Self {
        Self {
            person: person.into(),
            artist: artist.into(),
        }
    }
}

/// An unordered `(a, b)` row of the `friends` relation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Friendship {
    /// First endpoint as stored.
    pub a: PersonId,
    /// Second endpoint as stored.
    pub b: PersonId,
}

impl Friendship {
    /// Builds a friendship row from raw identifiers.
    pub fn new(a: impl Into<PersonId>, b: impl Into<PersonId>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    /// True when both endpoints are the same person.
    pub fn is_self_loop(&self) -> bool {
        self.a == self.b
    }

    /// Endpoints ordered low to high, so `(1, 2)` and `(2, 1)` compare equal.
    pub fn canonical(&self) -> (PersonId, PersonId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

/// A directed friend edge produced by the symmetrizer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirectedEdge {
    /// Person receiving the friend's opinions.
    pub source: PersonId,
    /// Friend whose opinions are propagated.
    pub friend: PersonId,
}

/// A friend's opinion made visible to `source`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropagatedOpinion {
    /// Person the opinion is propagated to.
    pub source: PersonId,
    /// Friend the opinion came from.
    pub friend: PersonId,
    /// Artist the opinion is about.
    pub artist: ArtistId,
    /// Whether the friend likes or dislikes the artist.
    pub polarity: Polarity,
}

/// Final `(person, artist)` output pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Recommendation {
    /// Person the artist is recommended to.
    pub person: PersonId,
    /// Recommended artist.
    pub artist: ArtistId,
}

impl Recommendation {
    /// Builds a recommendation from raw identifiers.
    pub fn new(person: impl Into<PersonId>, artist: impl Into<ArtistId>) -> Self {
        Self {
            person: person.into(),
            artist: artist.into(),
        }
    }
}

/// Immutable snapshot of the three input relations.
///
/// Rows are kept exactly as loaded, duplicates included; every stage treats
/// them as sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relations {
    /// Rows of `likes(person, artist)`.
    pub likes: Vec<Preference>,
    /// Rows of `dislikes(person, artist)`.
    pub dislikes: Vec<Preference>,
    /// Rows of `friends(person1, person2)`.
    pub friends: Vec<Friendship>,
}

impl Relations {
    /// Empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from raw `(i64, i64)` pairs.
    pub fn from_pairs<L, D, F>(likes: L, dislikes: D, friends: F) -> Self
    where
        L: IntoIterator<Item = (i64, i64)>,
        D: IntoIterator<Item = (i64, i64)>,
        F: IntoIterator<Item = (i64, i64)>,
    {
        Self {
            likes: likes
                .into_iter()
                .map(|(p, a)| Preference::new(p, a))
                .collect(),
            dislikes: dislikes
                .into_iter()
                .map(|(p, a)| Preference::new(p, a))
                .collect(),
            friends: friends
                .into_iter()
                .map(|(a, b)| Friendship::new(a, b))
                .collect(),
        }
    }

    /// Adds a `likes` row.
    pub fn like(mut self, person: i64, artist: i64) -> Self {
        self.likes.push(Preference::new(person, artist));
        self
    }

    /// Adds a `dislikes` row.
    pub fn dislike(mut self, person: i64, artist: i64) -> Self {
        self.dislikes.push(Preference::new(person, artist));
        self
    }

    /// Adds a `friends` row.
    pub fn friend(mut self, a: i64, b: i64) -> Self {
        self.friends.push(Friendship::new(a, b));
        self
    }

    /// Rows of the relation holding the given polarity.
    pub fn preferences(&self, polarity: Polarity) -> &[Preference] {
        match polarity {
            Polarity::Like => &self.likes,
            Polarity::Dislike => &self.dislikes,
        }
    }

    /// Total row count across all three relations.
    pub fn row_count(&self) -> usize {
        self.likes.len() + self.dislikes.len() + self.friends.len()
    }

    /// True when every relation is empty.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
