use super::{distance, LabelTranslator, ScoreCalculator, SubmissionFault};
use crate::domain::model::{
    ErrorPolicy, RankedReport, ScoredResult, ScoringPolicy, SkippedSubmission, Submission,
};
use crate::utils::error::Result;

/// Scores each submission against the reference answer and orders the results.
pub struct RankingAggregator<'a> {
    translator: LabelTranslator<'a>,
    calculator: ScoreCalculator,
    reference_answer: &'a str,
    max_score: i64,
    on_unknown_label: ErrorPolicy,
    on_empty_submission: ErrorPolicy,
}

impl<'a> RankingAggregator<'a> {
    pub fn from_policy(policy: &'a ScoringPolicy) -> Self {
        Self {
            translator: LabelTranslator::new(&policy.code_map),
            calculator: ScoreCalculator::from_policy(policy),
            reference_answer: &policy.reference_answer,
            max_score: policy.max_score(),
            on_unknown_label: policy.on_unknown_label,
            on_empty_submission: policy.on_empty_submission,
        }
    }

    pub fn score_submission(&self, submission: &Submission) -> std::result::Result<ScoredResult, SubmissionFault> {
        let symbols = self.translator.translate(&submission.labels)?;
        let edit_distance = distance(&symbols, self.reference_answer);
        let score = self.calculator.score(submission.labels.len(), edit_distance)?;

        tracing::debug!(
            "Scored '{}': '{}' vs '{}', distance {}, raw score {}",
            submission.identifier,
            symbols,
            self.reference_answer,
            edit_distance,
            score.raw_score
        );

        Ok(ScoredResult {
            identifier: submission.identifier.clone(),
            raw_score: score.raw_score,
            fraction_incorrect: score.fraction_incorrect,
        })
    }

    /// Results come back highest raw score first. Equal scores keep the order
    /// the submissions were given in.
    pub fn aggregate(&self, submissions: Vec<Submission>) -> Result<RankedReport> {
        let mut results = Vec::with_capacity(submissions.len());
        let mut skipped = Vec::new();

        for submission in &submissions {
            match self.score_submission(submission) {
                Ok(result) => results.push(result),
                Err(fault) => {
                    let policy = match fault {
                        SubmissionFault::UnknownLabel(_) => self.on_unknown_label,
                        SubmissionFault::Empty => self.on_empty_submission,
                    };
                    let error = fault.into_error(submission);
                    match policy {
                        ErrorPolicy::Abort => return Err(error),
                        ErrorPolicy::Skip => {
                            tracing::warn!("Skipping submission: {}", error);
                            skipped.push(SkippedSubmission {
                                line: submission.line,
                                identifier: Some(submission.identifier.clone()),
                                reason: error.to_string(),
                            });
                        }
                    }
                }
            }
        }

        // sort_by is stable
        results.sort_by(|a, b| b.raw_score.cmp(&a.raw_score));

        Ok(RankedReport {
            max_score: self.max_score,
            results,
            skipped,
        })
    }
}
