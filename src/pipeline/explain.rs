#![forbid(unsafe_code)]

use std::fmt;

use serde::Serialize;

use crate::model::Relations;
use crate::pipeline::propagate::OpinionIndex;
use crate::pipeline::symmetrize::{symmetrize, FriendGraph};
use crate::types::{ArtistId, PersonId, Polarity};

/// Outcome for one `(person, artist)` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// At least one friend likes the artist and none dislikes it.
    Recommended,
    /// Friends like the artist but at least one dislikes it.
    SuppressedByDislike,
    /// Only dislikes reached the person.
    DislikedByFriends,
    /// The person already likes or dislikes the artist.
    OwnOpinion,
    /// No friend holds an opinion on the artist.
    NoSignal,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::Recommended => "recommended",
            Verdict::SuppressedByDislike => "suppressed by dislike",
            Verdict::DislikedByFriends => "disliked by friends",
            Verdict::OwnOpinion => "own opinion",
            Verdict::NoSignal => "no signal",
        };
        f.write_str(text)
    }
}

/// Why a pair is, or is not, a recommendation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Explanation {
    /// Person being explained.
    pub person: PersonId,
    /// Artist being explained.
    pub artist: ArtistId,
    /// The person's own stated opinions on the artist.
    pub own: Vec<Polarity>,
    /// Friends who like the artist, sorted.
    pub liked_by: Vec<PersonId>,
    /// Friends who dislike the artist, sorted.
    pub disliked_by: Vec<PersonId>,
    /// Resulting verdict.
    pub verdict: Verdict,
}

/// Explains a single pair.
pub fn explain(relations: &Relations, person: PersonId, artist: ArtistId) -> Explanation {
    let (graph, _) = symmetrize(&relations.friends);
    let index = OpinionIndex::build(relations);
    explain_with(&graph, &index, person, artist)
}

/// Explains every artist any friend of `person` holds an opinion on.
pub fn explain_person(relations: &Relations, person: PersonId) -> Vec<Explanation> {
    let (graph, _) = symmetrize(&relations.friends);
    let index = OpinionIndex::build(relations);
    let mut artists: Vec<ArtistId> = graph
        .friends_of(person)
        .iter()
        .flat_map(|friend| {
            Polarity::ALL
                .into_iter()
                .flat_map(|p| index.artists(*friend, p).iter().copied())
        })
        .collect();
    artists.sort_unstable();
    artists.dedup();
    artists
        .into_iter()
        .map(|artist| explain_with(&graph, &index, person, artist))
        .collect()
}

fn explain_with(
    graph: &FriendGraph,
    index: &OpinionIndex,
    person: PersonId,
    artist: ArtistId,
) -> Explanation {
    let own = index.opinion_of(person, artist);
    let mut liked_by = Vec::new();
    let mut disliked_by = Vec::new();
    for &friend in graph.friends_of(person) {
        for polarity in index.opinion_of(friend, artist) {
            match polarity {
                Polarity::Like => liked_by.push(friend),
                Polarity::Dislike => disliked_by.push(friend),
            }
        }
    }
    let verdict = if !own.is_empty() {
        Verdict::OwnOpinion
    } else {
        match (liked_by.is_empty(), disliked_by.is_empty()) {
            (false, true) => Verdict::Recommended,
            (false, false) => Verdict::SuppressedByDislike,
            (true, false) => Verdict::DislikedByFriends,
            (true, true) => Verdict::NoSignal,
        }
    };
    Explanation {
        person,
        artist,
        own,
        liked_by,
        disliked_by,
        verdict,
    }
}
