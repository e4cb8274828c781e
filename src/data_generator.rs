#![forbid(unsafe_code)]

//! Seeded synthetic relations for benchmarks and demos.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::{Result, TasteError};
use crate::model::{Friendship, Preference, Relations};

/// Shape of a generated dataset.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratorOptions {
    /// Persons, numbered `1..=people`.
    pub people: usize,
    /// Artists, numbered `1..=artists`.
    pub artists: usize,
    /// Average friendships started per person.
    pub avg_friends: usize,
    /// Average likes per person.
    pub avg_likes: usize,
    /// Average dislikes per person.
    pub avg_dislikes: usize,
    /// Share of persons that both like and dislike one artist, in `[0, 1]`.
    pub conflict_rate: f64,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            people: 1_000,
            artists: 200,
            avg_friends: 8,
            avg_likes: 12,
            avg_dislikes: 4,
            conflict_rate: 0.0,
        }
    }
}

/// Upper bound on `people` and `artists`.
pub const MAX_ENTITIES: usize = 10_000_000;
/// Upper bound on each per-person average.
pub const MAX_AVERAGE: usize = 100_000;

impl GeneratorOptions {
    fn validate(&self) -> Result<()> {
        if self.people == 0 || self.artists == 0 {
            return Err(TasteError::InvalidArgument(
                "people and artists must both be positive".into(),
            ));
        }
        if self.people > MAX_ENTITIES || self.artists > MAX_ENTITIES {
            return Err(TasteError::InvalidArgument(format!(
                "people and artists must each be at most {MAX_ENTITIES}"
            )));
        }
        for (name, avg) in [
            ("friends", self.avg_friends),
            ("likes", self.avg_likes),
            ("dislikes", self.avg_dislikes),
        ] {
            if avg > MAX_AVERAGE {
                return Err(TasteError::InvalidArgument(format!(
                    "average {name} {avg} exceeds {MAX_AVERAGE}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.conflict_rate) {
            return Err(TasteError::InvalidArgument(format!(
                "conflict rate {} is outside [0, 1]",
                self.conflict_rate
            )));
        }
        Ok(())
    }
}

/// Deterministic generator: the same seed and options give the same relations.
pub struct DataGenerator {
    rng: ChaCha8Rng,
}

impl DataGenerator {
    /// Creates a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates a social network with music preferences.
    ///
    /// Friendships never repeat and never loop; a person's likes and dislikes
    /// are disjoint except for the share selected by `conflict_rate`.
    pub fn generate(&mut self, opts: &GeneratorOptions) -> Result<Relations> {
        opts.validate()?;
        let people = opts.people as i64;
        let artists: Vec<i64> = (1..=opts.artists as i64).collect();

        let mut friends = Vec::new();
        let mut seen = FxHashSet::default();
        if people > 1 {
            for person in 1..=people {
                let count = self.rng.gen_range(0..=opts.avg_friends * 2);
                for _ in 0..count {
                    let other = self.rng.gen_range(1..=people);
                    if other == person {
                        continue;
                    }
                    let row = Friendship::new(person, other);
                    if seen.insert(row.canonical()) {
                        friends.push(row);
                    }
                }
            }
        }

        let mut likes = Vec::new();
        let mut dislikes = Vec::new();
        for person in 1..=people {
            let like_count = self.rng.gen_range(0..=opts.avg_likes * 2);
            let dislike_count = self.rng.gen_range(0..=opts.avg_dislikes * 2);
            let picked: Vec<i64> = artists
                .choose_multiple(&mut self.rng, (like_count + dislike_count).min(artists.len()))
                .copied()
                .collect();
            let split = like_count.min(picked.len());
            likes.extend(picked[..split].iter().map(|a| Preference::new(person, *a)));
            dislikes.extend(picked[split..].iter().map(|a| Preference::new(person, *a)));

            if split > 0 && self.rng.gen_bool(opts.conflict_rate) {
                dislikes.push(Preference::new(person, picked[0]));
            }
        }

        Ok(Relations {
            likes,
            dislikes,
            friends,
        })
    }
}
