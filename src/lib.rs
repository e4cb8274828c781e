//! Friends-of-friends music taste propagation.
//!
//! Given `likes(person, artist)`, `dislikes(person, artist)` and
//! `friends(person1, person2)`, derives for every person the artists some
//! friend likes, that no friend dislikes, and that the person holds no
//! opinion on.
//!
//! ```
//! use tastegraph::{recommend, Recommendation, Relations};
//!
//! let relations = Relations::new().friend(1, 2).like(2, 100);
//! assert_eq!(recommend(&relations), vec![Recommendation::new(1, 100)]);
//! ```

#![warn(missing_docs)]

pub mod admin;
pub mod cli;
pub mod data_generator;
mod error;
pub mod model;
pub mod pipeline;
pub mod sqlite_adapter;
pub mod types;

pub use error::{Result, TasteError};
pub use model::{DirectedEdge, Friendship, Preference, PropagatedOpinion, Recommendation, Relations};
pub use pipeline::{recommend, Pipeline, PipelineOptions, PipelineOutput, PipelineStats};
pub use types::{ArtistId, PersonId, Polarity};
