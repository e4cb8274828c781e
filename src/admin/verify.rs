use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::info;

use crate::model::{Preference, Relations};
use crate::types::{ArtistId, PersonId};

const MAX_FINDINGS: usize = 32;

/// Indicates the severity level of a verification finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifySeverity {
    /// Informational note; the pipeline handles it silently.
    Info,
    /// Unusual input the pipeline tolerates but that likely hides a data problem.
    Warning,
    /// Input the pipeline cannot produce anything useful from.
    Error,
}

/// Represents a single issue discovered during verification.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyFinding {
    /// The severity level of this finding.
    pub severity: VerifySeverity,
    /// Human-readable description of the issue.
    pub message: String,
}

impl VerifyFinding {
    fn new(severity: VerifySeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Options for [`verify`].
#[derive(Clone, Debug)]
pub struct VerifyOptions {
    /// Maximum number of findings kept in the report. Counts stay exact.
    pub max_findings: usize,
    /// Treat warnings as failures.
    pub strict: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            max_findings: MAX_FINDINGS,
            strict: false,
        }
    }
}

/// Exact counts behind the findings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct VerifyCounts {
    /// `(person, artist)` pairs present in both `likes` and `dislikes`.
    pub conflicting_pairs: u64,
    /// Friendship rows naming the same person twice.
    pub self_friendships: u64,
    /// Repeated `likes` rows.
    pub duplicate_likes: u64,
    /// Repeated `dislikes` rows.
    pub duplicate_dislikes: u64,
    /// Repeated friendships, reciprocal rows included.
    pub duplicate_friendships: u64,
    /// Friendships where neither endpoint states any preference.
    pub silent_friendships: u64,
}

/// Complete report of a verification run.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyReport {
    /// False when an error was found, or a warning under strict mode.
    pub success: bool,
    /// Findings, capped at [`VerifyOptions::max_findings`].
    pub findings: Vec<VerifyFinding>,
    /// Findings dropped by the cap.
    pub truncated: u64,
    /// Exact counts.
    pub counts: VerifyCounts,
}

struct FindingSink {
    findings: Vec<VerifyFinding>,
    limit: usize,
    truncated: u64,
    worst: Option<VerifySeverity>,
}

impl FindingSink {
    fn push(&mut self, severity: VerifySeverity, message: impl Into<String>) {
        self.worst = Some(match self.worst {
            Some(VerifySeverity::Error) => VerifySeverity::Error,
            Some(VerifySeverity::Warning) if severity == VerifySeverity::Info => {
                VerifySeverity::Warning
            }
            _ => severity,
        });
        if self.findings.len() < self.limit {
            self.findings.push(VerifyFinding::new(severity, message));
        } else {
            self.truncated += 1;
        }
    }
}

/// Checks the input relations for conditions the pipeline tolerates but a
/// user likely wants to know about.
///
/// Nothing found here changes pipeline behaviour: conflicting opinions still
/// block propagation to their holder, self-friendships are dropped, and
/// duplicates collapse.
pub fn verify(relations: &Relations, opts: &VerifyOptions) -> VerifyReport {
    let mut sink = FindingSink {
        findings: Vec::new(),
        limit: opts.max_findings,
        truncated: 0,
        worst: None,
    };
    let mut counts = VerifyCounts::default();

    if relations.is_empty() {
        sink.push(VerifySeverity::Error, "all three relations are empty");
    } else {
        for (name, empty) in [
            ("likes", relations.likes.is_empty()),
            ("dislikes", relations.dislikes.is_empty()),
            ("friends", relations.friends.is_empty()),
        ] {
            if empty {
                sink.push(VerifySeverity::Warning, format!("relation '{name}' is empty"));
            }
        }
    }

    let likes = distinct_pairs(&relations.likes);
    let dislikes = distinct_pairs(&relations.dislikes);
    counts.duplicate_likes = (relations.likes.len() - likes.len()) as u64;
    counts.duplicate_dislikes = (relations.dislikes.len() - dislikes.len()) as u64;

    let mut conflicts: Vec<(PersonId, ArtistId)> =
        likes.intersection(&dislikes).copied().collect();
    conflicts.sort_unstable();
    counts.conflicting_pairs = conflicts.len() as u64;
    for (person, artist) in conflicts {
        sink.push(
            VerifySeverity::Warning,
            format!("person {person} both likes and dislikes artist {artist}"),
        );
    }

    let mut opinionated: FxHashSet<PersonId> = FxHashSet::default();
    opinionated.extend(likes.iter().map(|(p, _)| *p));
    opinionated.extend(dislikes.iter().map(|(p, _)| *p));

    let mut seen_friendships = FxHashSet::default();
    for row in &relations.friends {
        if row.is_self_loop() {
            counts.self_friendships += 1;
            sink.push(
                VerifySeverity::Warning,
                format!("person {} is listed as their own friend", row.a),
            );
            continue;
        }
        if !seen_friendships.insert(row.canonical()) {
            counts.duplicate_friendships += 1;
            continue;
        }
        if !opinionated.contains(&row.a) && !opinionated.contains(&row.b) {
            counts.silent_friendships += 1;
        }
    }

    for (what, n) in [
        ("likes", counts.duplicate_likes),
        ("dislikes", counts.duplicate_dislikes),
        ("friends", counts.duplicate_friendships),
    ] {
        if n > 0 {
            sink.push(
                VerifySeverity::Info,
                format!("{n} duplicate row(s) in '{what}' ignored"),
            );
        }
    }
    if counts.silent_friendships > 0 {
        sink.push(
            VerifySeverity::Info,
            format!(
                "{} friendship(s) connect persons without any stated preference",
                counts.silent_friendships
            ),
        );
    }

    let success = match sink.worst {
        Some(VerifySeverity::Error) => false,
        Some(VerifySeverity::Warning) => !opts.strict,
        _ => true,
    };
    info!(
        success,
        findings = sink.findings.len(),
        truncated = sink.truncated,
        conflicting_pairs = counts.conflicting_pairs,
        self_friendships = counts.self_friendships,
        "admin.verify.completed"
    );

    VerifyReport {
        success,
        findings: sink.findings,
        truncated: sink.truncated,
        counts,
    }
}

fn distinct_pairs(rows: &[Preference]) -> FxHashSet<(PersonId, ArtistId)> {
    rows.iter().map(|r| (r.person, r.artist)).collect()
}
