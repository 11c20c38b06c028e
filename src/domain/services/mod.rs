pub mod dedup;
pub mod distance;
pub mod ranking;
pub mod scoring;
pub mod translator;

pub use dedup::{DedupOutcome, SubmissionDeduplicator};
pub use distance::distance;
pub use ranking::RankingAggregator;
pub use scoring::{Score, ScoreCalculator};
pub use translator::LabelTranslator;

use crate::domain::model::Submission;
use crate::utils::error::ScorerError;

/// Why a single submission could not be scored. Carries no record context;
/// see [`SubmissionFault::into_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionFault {
    UnknownLabel(String),
    Empty,
}

impl SubmissionFault {
    pub fn into_error(self, submission: &Submission) -> ScorerError {
        match self {
            SubmissionFault::UnknownLabel(label) => ScorerError::UnknownLabel {
                identifier: submission.identifier.clone(),
                line: submission.line,
                label,
            },
            SubmissionFault::Empty => ScorerError::EmptySubmission {
                identifier: submission.identifier.clone(),
                line: submission.line,
            },
        }
    }
}
