use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Card label to comparison symbol table. Immutable once the run starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMap {
    symbols: HashMap<String, char>,
}

impl CodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, symbol: char) -> Option<char> {
        self.symbols.insert(label.into(), symbol)
    }

    pub fn symbol(&self, label: &str) -> Option<char> {
        self.symbols.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.symbols.contains_key(label)
    }

    /// Every symbol a translated submission can contain.
    pub fn alphabet(&self) -> HashSet<char> {
        self.symbols.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, char)> for CodeMap {
    fn from_iter<I: IntoIterator<Item = (L, char)>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(|(label, symbol)| (label.into(), symbol)).collect(),
        }
    }
}

/// One input row as read from the source, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based position in the input.
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// The trailing field, which names the participant.
    pub fn identifier(&self) -> Option<&str> {
        self.fields.last().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub line: usize,
    pub identifier: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub identifier: String,
    pub raw_score: i64,
    /// Edit distance over submission length, rounded to two decimals.
    pub fraction_incorrect: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSubmission {
    pub line: usize,
    pub identifier: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedReport {
    pub max_score: i64,
    pub results: Vec<ScoredResult>,
    pub skipped: Vec<SkippedSubmission>,
}

/// Counters for one batch run, logged once the report is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub records_read: usize,
    pub duplicates_dropped: usize,
    pub excluded_dropped: usize,
    pub skipped: usize,
    pub scored: usize,
}

#[derive(Debug, Clone)]
pub struct ScoringOutcome {
    pub report: RankedReport,
    pub summary: BatchSummary,
}

/// What to do with a record that cannot be scored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Abort,
    Skip,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(format!("unknown error policy '{}', expected abort or skip", other)),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Abort => write!(f, "abort"),
            ErrorPolicy::Skip => write!(f, "skip"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeScores {
    /// Report the computed value, even below zero.
    #[default]
    Keep,
    /// Raise negative raw scores to zero.
    Clamp,
}

impl fmt::Display for NegativeScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegativeScores::Keep => write!(f, "keep"),
            NegativeScores::Clamp => write!(f, "clamp"),
        }
    }
}

/// Everything the scoring core needs, parsed and validated once at startup.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    pub code_map: CodeMap,
    pub reference_answer: String,
    pub points_per_correct: i64,
    pub points_per_incorrect: i64,
    pub excluded_identifiers: HashSet<String>,
    pub negative_scores: NegativeScores,
    pub on_unknown_label: ErrorPolicy,
    pub on_empty_submission: ErrorPolicy,
    pub on_malformed_record: ErrorPolicy,
    pub ignore_blank_labels: bool,
}

impl ScoringPolicy {
    /// Policy with 4 points per correct card, 1 point off per incorrect card,
    /// no exclusions, and every error aborting the batch.
    pub fn new(code_map: CodeMap, reference_answer: impl Into<String>) -> Self {
        Self {
            code_map,
            reference_answer: reference_answer.into(),
            points_per_correct: 4,
            points_per_incorrect: 1,
            excluded_identifiers: HashSet::new(),
            negative_scores: NegativeScores::default(),
            on_unknown_label: ErrorPolicy::default(),
            on_empty_submission: ErrorPolicy::default(),
            on_malformed_record: ErrorPolicy::default(),
            ignore_blank_labels: false,
        }
    }

    /// Score of a submission that matches the reference answer exactly.
    pub fn max_score(&self) -> i64 {
        self.reference_answer.chars().count() as i64 * self.points_per_correct
    }
}
