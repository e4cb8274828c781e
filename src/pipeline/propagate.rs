#![forbid(unsafe_code)]

use rustc_hash::FxHashMap;

use crate::model::{PropagatedOpinion, Relations};
use crate::pipeline::symmetrize::FriendGraph;
use crate::types::{ArtistId, PersonId, Polarity};

/// Stated opinions of one person, each list sorted and deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PersonOpinions {
    likes: Vec<ArtistId>,
    dislikes: Vec<ArtistId>,
}

impl PersonOpinions {
    /// Artists held with the given polarity.
    pub fn artists(&self, polarity: Polarity) -> &[ArtistId] {
        match polarity {
            Polarity::Like => &self.likes,
            Polarity::Dislike => &self.dislikes,
        }
    }

    /// True when the artist appears in either list.
    pub fn has_opinion(&self, artist: ArtistId) -> bool {
        self.likes.binary_search(&artist).is_ok() || self.dislikes.binary_search(&artist).is_ok()
    }

    fn list_mut(&mut self, polarity: Polarity) -> &mut Vec<ArtistId> {
        match polarity {
            Polarity::Like => &mut self.likes,
            Polarity::Dislike => &mut self.dislikes,
        }
    }
}

/// Per-person lookup over `likes` and `dislikes`. Duplicate rows collapse.
#[derive(Clone, Debug, Default)]
pub struct OpinionIndex {
    by_person: FxHashMap<PersonId, PersonOpinions>,
}

impl OpinionIndex {
    /// Indexes both preference relations of the snapshot.
    pub fn build(relations: &Relations) -> Self {
        let mut by_person: FxHashMap<PersonId, PersonOpinions> = FxHashMap::default();
        for polarity in Polarity::ALL {
            for row in relations.preferences(polarity) {
                by_person
                    .entry(row.person)
                    .or_default()
                    .list_mut(polarity)
                    .push(row.artist);
            }
        }
        for opinions in by_person.values_mut() {
            for polarity in Polarity::ALL {
                let list = opinions.list_mut(polarity);
                list.sort_unstable();
                list.dedup();
            }
        }
        Self { by_person }
    }

    /// Opinions of `person`, if they stated any.
    pub fn get(&self, person: PersonId) -> Option<&PersonOpinions> {
        self.by_person.get(&person)
    }

    /// Artists `person` holds with the given polarity.
    pub fn artists(&self, person: PersonId, polarity: Polarity) -> &[ArtistId] {
        self.get(person)
            .map(|o| o.artists(polarity))
            .unwrap_or(&[])
    }

    /// True when `person` likes or dislikes `artist`.
    pub fn has_opinion(&self, person: PersonId, artist: ArtistId) -> bool {
        self.get(person)
            .map(|o| o.has_opinion(artist))
            .unwrap_or(false)
    }

    /// Polarities `person` holds on `artist`. Both are returned for
    /// conflicting input.
    pub fn opinion_of(&self, person: PersonId, artist: ArtistId) -> Vec<Polarity> {
        let Some(opinions) = self.get(person) else {
            return Vec::new();
        };
        Polarity::ALL
            .into_iter()
            .filter(|p| opinions.artists(*p).binary_search(&artist).is_ok())
            .collect()
    }

    /// Number of persons holding at least one opinion.
    pub fn person_count(&self) -> usize {
        self.by_person.len()
    }
}

/// Friend opinions that survived the source's own-opinion filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Propagated {
    /// `(source, friend, artist)` facts from friends' likes.
    pub likes: Vec<PropagatedOpinion>,
    /// `(source, friend, artist)` facts from friends' dislikes.
    pub dislikes: Vec<PropagatedOpinion>,
}

impl Propagated {
    /// Facts of the given polarity.
    pub fn of(&self, polarity: Polarity) -> &[PropagatedOpinion] {
        match polarity {
            Polarity::Like => &self.likes,
            Polarity::Dislike => &self.dislikes,
        }
    }

    /// Appends another partition's facts.
    pub fn extend(&mut self, other: Propagated) {
        self.likes.extend(other.likes);
        self.dislikes.extend(other.dislikes);
    }

    /// Total fact count.
    pub fn len(&self) -> usize {
        self.likes.len() + self.dislikes.len()
    }

    /// True when nothing was propagated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Propagates opinions along every directed edge of the graph.
pub fn propagate(graph: &FriendGraph, index: &OpinionIndex) -> Propagated {
    propagate_sources(graph, index, &graph.persons())
}

/// Propagates opinions to the given source persons only.
///
/// A friend's opinion on an artist reaches `source` only when `source` has
/// no stated like or dislike for that artist.
pub fn propagate_sources(
    graph: &FriendGraph,
    index: &OpinionIndex,
    sources: &[PersonId],
) -> Propagated {
    let mut out = Propagated::default();
    for &source in sources {
        let own = index.get(source);
        for &friend in graph.friends_of(source) {
            for polarity in Polarity::ALL {
                for &artist in index.artists(friend, polarity) {
                    if own.is_some_and(|o| o.has_opinion(artist)) {
                        continue;
                    }
                    let fact = PropagatedOpinion {
                        source,
                        friend,
                        artist,
                        polarity,
                    };
                    match polarity {
                        Polarity::Like => out.likes.push(fact),
                        Polarity::Dislike => out.dislikes.push(fact),
                    }
                }
            }
        }
    }
    out
}
