use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, TasteError};
use crate::model::{Friendship, Preference, Recommendation, Relations};

/// Default file name of the `likes` relation inside a dataset directory.
pub const LIKES_FILE: &str = "likes.csv";
/// Default file name of the `dislikes` relation inside a dataset directory.
pub const DISLIKES_FILE: &str = "dislikes.csv";
/// Default file name of the `friends` relation inside a dataset directory.
pub const FRIENDS_FILE: &str = "friends.csv";

/// Where and how to read one two-column relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSource {
    /// Path to the delimited text file.
    pub path: PathBuf,
    /// Header name of the first column (person / person1).
    pub left_column: String,
    /// Header name of the second column (artist / person2).
    pub right_column: String,
    /// Whether the first line is a header. Without headers columns 0 and 1 are used.
    pub has_headers: bool,
    /// Field delimiter.
    pub delimiter: u8,
}

impl RelationSource {
    fn new(path: impl Into<PathBuf>, left: &str, right: &str) -> Self {
        Self {
            path: path.into(),
            left_column: left.to_string(),
            right_column: right.to_string(),
            has_headers: true,
            delimiter: b',',
        }
    }

    /// `person,artist` source for the `likes` relation.
    pub fn likes(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "person", "artist")
    }

    /// `person,artist` source for the `dislikes` relation.
    pub fn dislikes(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "person", "artist")
    }

    /// `person1,person2` source for the `friends` relation.
    pub fn friends(path: impl Into<PathBuf>) -> Self {
        Self::new(path, "person1", "person2")
    }

    /// Sets whether the file carries a header line.
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Overrides the header names of both columns.
    pub fn with_columns(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.left_column = left.into();
        self.right_column = right.into();
        self
    }
}

/// Sources for the three input relations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// `likes(person, artist)`.
    pub likes: RelationSource,
    /// `dislikes(person, artist)`.
    pub dislikes: RelationSource,
    /// `friends(person1, person2)`.
    pub friends: RelationSource,
}

impl ImportConfig {
    /// Sources named [`LIKES_FILE`], [`DISLIKES_FILE`] and [`FRIENDS_FILE`]
    /// inside `dir`, with default columns.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            likes: RelationSource::likes(dir.join(LIKES_FILE)),
            dislikes: RelationSource::dislikes(dir.join(DISLIKES_FILE)),
            friends: RelationSource::friends(dir.join(FRIENDS_FILE)),
        }
    }
}

/// Row counts loaded per relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows read from the likes file.
    pub like_rows: u64,
    /// Rows read from the dislikes file.
    pub dislike_rows: u64,
    /// Rows read from the friends file.
    pub friend_rows: u64,
}

/// Output settings for [`write_recommendations`].
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Emit a `person,artist` header line.
    pub header: bool,
    /// Field delimiter.
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            header: true,
            delimiter: b',',
        }
    }
}

/// Loads the three relations described by `cfg`.
///
/// Cells are trimmed and parsed as 64-bit integers; blank lines are skipped.
/// A missing or non-integer cell fails with the file and row number.
pub fn load_relations(cfg: &ImportConfig) -> Result<(Relations, ImportSummary)> {
    let likes: Vec<Preference> = read_pairs(&cfg.likes)?
        .into_iter()
        .map(|(p, a)| Preference::new(p, a))
        .collect();
    let dislikes: Vec<Preference> = read_pairs(&cfg.dislikes)?
        .into_iter()
        .map(|(p, a)| Preference::new(p, a))
        .collect();
    let friends: Vec<Friendship> = read_pairs(&cfg.friends)?
        .into_iter()
        .map(|(a, b)| Friendship::new(a, b))
        .collect();

    let summary = ImportSummary {
        like_rows: likes.len() as u64,
        dislike_rows: dislikes.len() as u64,
        friend_rows: friends.len() as u64,
    };
    info!(
        like_rows = summary.like_rows,
        dislike_rows = summary.dislike_rows,
        friend_rows = summary.friend_rows,
        "import.completed"
    );
    Ok((
        Relations {
            likes,
            dislikes,
            friends,
        },
        summary,
    ))
}

/// Reads one two-column relation as raw integer pairs.
pub fn read_pairs(src: &RelationSource) -> Result<Vec<(i64, i64)>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(src.has_headers)
        .delimiter(src.delimiter)
        .trim(Trim::All)
        .from_path(&src.path)?;
    let (left_index, right_index) = if src.has_headers {
        let headers = reader.headers()?.clone();
        (
            find_column(&headers, &src.left_column, &src.path)?,
            find_column(&headers, &src.right_column, &src.path)?,
        )
    } else {
        (0, 1)
    };

    let mut pairs = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row = idx as u64 + 1;
        let left = parse_cell(&record, left_index, &src.left_column, &src.path, row)?;
        let right = parse_cell(&record, right_index, &src.right_column, &src.path, row)?;
        pairs.push((left, right));
    }
    debug!(
        path = %src.path.display(),
        rows = pairs.len(),
        "import.relation_read"
    );
    Ok(pairs)
}

/// Writes recommendations as delimited text to `writer`. Returns rows written.
pub fn write_recommendations_to<W: io::Write>(
    writer: W,
    recommendations: &[Recommendation],
    opts: &ExportOptions,
) -> Result<u64> {
    let mut out = WriterBuilder::new()
        .delimiter(opts.delimiter)
        .from_writer(writer);
    if opts.header {
        out.write_record(["person", "artist"])?;
    }
    for rec in recommendations {
        out.write_record([rec.person.0.to_string(), rec.artist.0.to_string()])?;
    }
    out.flush()?;
    Ok(recommendations.len() as u64)
}

/// Writes recommendations to a file, creating parent directories as needed.
pub fn write_recommendations(
    path: impl AsRef<Path>,
    recommendations: &[Recommendation],
    opts: &ExportOptions,
) -> Result<u64> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let file = fs::File::create(path)?;
    let written = write_recommendations_to(io::BufWriter::new(file), recommendations, opts)?;
    info!(path = %path.display(), rows = written, "export.recommendations");
    Ok(written)
}

/// Writes the three relations into `dir` using the default file names and
/// headers, returning an [`ImportConfig`] that reads them back.
pub fn write_relations(dir: impl AsRef<Path>, relations: &Relations) -> Result<ImportConfig> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let cfg = ImportConfig::in_dir(dir);
    write_pairs(
        &cfg.likes,
        relations.likes.iter().map(|r| (r.person.0, r.artist.0)),
    )?;
    write_pairs(
        &cfg.dislikes,
        relations.dislikes.iter().map(|r| (r.person.0, r.artist.0)),
    )?;
    write_pairs(
        &cfg.friends,
        relations.friends.iter().map(|r| (r.a.0, r.b.0)),
    )?;
    info!(
        dir = %dir.display(),
        rows = relations.row_count(),
        "export.relations"
    );
    Ok(cfg)
}

fn write_pairs(src: &RelationSource, rows: impl Iterator<Item = (i64, i64)>) -> Result<()> {
    let mut out = WriterBuilder::new()
        .delimiter(src.delimiter)
        .from_path(&src.path)?;
    if src.has_headers {
        out.write_record([src.left_column.as_str(), src.right_column.as_str()])?;
    }
    for (left, right) in rows {
        out.write_record([left.to_string(), right.to_string()])?;
    }
    out.flush()?;
    Ok(())
}

fn find_column(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            TasteError::InvalidArgument(format!(
                "{}: column '{}' not found",
                path.display(),
                name
            ))
        })
}

fn parse_cell(
    record: &StringRecord,
    idx: usize,
    name: &str,
    path: &Path,
    row: u64,
) -> Result<i64> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TasteError::InvalidRow {
            path: path.to_path_buf(),
            row,
            message: format!("missing value for column '{name}'"),
        })?;
    raw.parse::<i64>().map_err(|_| TasteError::InvalidRow {
        path: path.to_path_buf(),
        row,
        message: format!("column '{name}' value '{raw}' is not an integer"),
    })
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
