#![forbid(unsafe_code)]

//! SQL reference engine backed by an embedded SQLite database.
//!
//! Runs the recommendation query as plain SQL, with the set differences
//! written as `LEFT JOIN ... WHERE ... IS NULL` anti-joins, so the pipeline
//! can be cross-checked against an independent evaluator.

use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::model::{Recommendation, Relations};
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::types::{ArtistId, PersonId};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS likes (person INTEGER NOT NULL, artist INTEGER NOT NULL);
    CREATE TABLE IF NOT EXISTS dislikes (person INTEGER NOT NULL, artist INTEGER NOT NULL);
    CREATE TABLE IF NOT EXISTS friends (person1 INTEGER NOT NULL, person2 INTEGER NOT NULL);
    CREATE INDEX IF NOT EXISTS idx_likes_person ON likes (person, artist);
    CREATE INDEX IF NOT EXISTS idx_dislikes_person ON dislikes (person, artist);
";

const RECOMMENDATION_QUERY: &str = "
    WITH friend_edges AS (
        SELECT person1 AS source, person2 AS friend FROM friends WHERE person1 <> person2
        UNION
        SELECT person2 AS source, person1 AS friend FROM friends WHERE person1 <> person2
    ),
    opinions AS (
        SELECT person, artist FROM likes
        UNION
        SELECT person, artist FROM dislikes
    ),
    should_like AS (
        SELECT DISTINCT f.source AS person, l.artist AS artist
        FROM friend_edges f
        JOIN likes l ON l.person = f.friend
        LEFT JOIN opinions o ON o.person = f.source AND o.artist = l.artist
        WHERE o.person IS NULL
    ),
    should_dislike AS (
        SELECT DISTINCT f.source AS person, d.artist AS artist
        FROM friend_edges f
        JOIN dislikes d ON d.person = f.friend
        LEFT JOIN opinions o ON o.person = f.source AND o.artist = d.artist
        WHERE o.person IS NULL
    )
    SELECT sl.person, sl.artist
    FROM should_like sl
    LEFT JOIN should_dislike sd ON sd.person = sl.person AND sd.artist = sl.artist
    WHERE sd.person IS NULL
    ORDER BY sl.person, sl.artist
";

/// In-memory SQLite database holding the three relations.
pub struct SqliteReference {
    conn: Connection,
}

impl SqliteReference {
    /// Opens an empty in-memory database with the relation schema.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Inserts every row of the snapshot in a single transaction.
    pub fn load(&mut self, relations: &Relations) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut likes = tx.prepare("INSERT INTO likes (person, artist) VALUES (?1, ?2)")?;
            for row in &relations.likes {
                likes.execute(params![row.person.0, row.artist.0])?;
            }
            let mut dislikes =
                tx.prepare("INSERT INTO dislikes (person, artist) VALUES (?1, ?2)")?;
            for row in &relations.dislikes {
                dislikes.execute(params![row.person.0, row.artist.0])?;
            }
            let mut friends =
                tx.prepare("INSERT INTO friends (person1, person2) VALUES (?1, ?2)")?;
            for row in &relations.friends {
                friends.execute(params![row.a.0, row.b.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Evaluates the recommendation query.
    pub fn recommendations(&self) -> Result<Vec<Recommendation>> {
        let mut stmt = self.conn.prepare(RECOMMENDATION_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(Recommendation {
                person: PersonId(row.get(0)?),
                artist: ArtistId(row.get(1)?),
            })
        })?;
        let mut out = Vec::new();
        for rec in rows {
            out.push(rec?);
        }
        Ok(out)
    }
}

/// Outcome of comparing the pipeline with the SQL reference.
#[derive(Debug, Clone, Serialize)]
pub struct CrossCheckReport {
    /// True when both engines produced the same set.
    pub matches: bool,
    /// Recommendations produced by the pipeline.
    pub pipeline_count: u64,
    /// Recommendations produced by SQLite.
    pub sqlite_count: u64,
    /// Pairs only the pipeline produced.
    pub only_in_pipeline: Vec<Recommendation>,
    /// Pairs only SQLite produced.
    pub only_in_sqlite: Vec<Recommendation>,
}

/// Runs both engines over the snapshot and compares their outputs as sets.
pub fn cross_check(relations: &Relations, opts: &PipelineOptions) -> Result<CrossCheckReport> {
    let pipeline = Pipeline::new(opts.clone()).run(relations).recommendations;
    let mut reference = SqliteReference::open_in_memory()?;
    reference.load(relations)?;
    let sqlite = reference.recommendations()?;

    // both outputs are sorted and duplicate free
    let only_in_pipeline: Vec<Recommendation> = pipeline
        .iter()
        .filter(|r| sqlite.binary_search(r).is_err())
        .copied()
        .collect();
    let only_in_sqlite: Vec<Recommendation> = sqlite
        .iter()
        .filter(|r| pipeline.binary_search(r).is_err())
        .copied()
        .collect();

    let report = CrossCheckReport {
        matches: only_in_pipeline.is_empty() && only_in_sqlite.is_empty(),
        pipeline_count: pipeline.len() as u64,
        sqlite_count: sqlite.len() as u64,
        only_in_pipeline,
        only_in_sqlite,
    };
    info!(
        matches = report.matches,
        pipeline_count = report.pipeline_count,
        sqlite_count = report.sqlite_count,
        "sqlite.cross_check.completed"
    );
    Ok(report)
}
