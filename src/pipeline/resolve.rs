#![forbid(unsafe_code)]

use crate::model::Recommendation;
use crate::pipeline::aggregate::Aggregates;

/// Computes `should_like \ should_dislike`, sorted by `(person, artist)`.
///
/// A single dislike suppresses the pair no matter how many friends like it.
pub fn resolve(aggregates: &Aggregates) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = aggregates
        .should_like
        .iter()
        .filter(|pair| !aggregates.should_dislike.contains(*pair))
        .map(|&(person, artist)| Recommendation { person, artist })
        .collect();
    out.sort_unstable();
    out
}
