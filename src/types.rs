#![forbid(unsafe_code)]

//! Identifier and polarity types shared by every stage.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque person identifier.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PersonId(pub i64);

/// Opaque artist identifier.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ArtistId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PersonId {
    fn from(value: i64) -> Self {
        PersonId(value)
    }
}

impl From<i64> for ArtistId {
    fn from(value: i64) -> Self {
        ArtistId(value)
    }
}

/// Direction of a stated opinion.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// The person likes the artist.
    Like,
    /// The person dislikes the artist.
    Dislike,
}

impl Polarity {
    /// Both polarities, likes first.
    pub const ALL: [Polarity; 2] = [Polarity::Like, Polarity::Dislike];

    /// Lowercase name used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Like => "like",
            Polarity::Dislike => "dislike",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
