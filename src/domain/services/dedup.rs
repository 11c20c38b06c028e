use crate::domain::model::{ErrorPolicy, RawRecord, ScoringPolicy, SkippedSubmission, Submission};
use crate::utils::error::{Result, ScorerError};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupOutcome {
    pub submissions: Vec<Submission>,
    pub skipped: Vec<SkippedSubmission>,
    pub duplicates: usize,
    pub excluded: usize,
}

/// Keeps the first record seen for each participant and drops excluded ones.
pub struct SubmissionDeduplicator<'a> {
    excluded: &'a HashSet<String>,
    on_malformed: ErrorPolicy,
    ignore_blank_labels: bool,
}

impl<'a> SubmissionDeduplicator<'a> {
    pub fn new(excluded: &'a HashSet<String>) -> Self {
        Self {
            excluded,
            on_malformed: ErrorPolicy::Abort,
            ignore_blank_labels: false,
        }
    }

    pub fn from_policy(policy: &'a ScoringPolicy) -> Self {
        Self {
            excluded: &policy.excluded_identifiers,
            on_malformed: policy.on_malformed_record,
            ignore_blank_labels: policy.ignore_blank_labels,
        }
    }

    pub fn filter(&self, records: Vec<RawRecord>) -> Result<DedupOutcome> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut outcome = DedupOutcome::default();

        for record in records {
            // Malformed rows neither count as excluded nor claim an identifier.
            if record.fields.len() < 2 {
                let identifier = record.identifier().map(String::from);
                self.reject(&record, identifier, &mut outcome)?;
                continue;
            }
            let Some(identifier) = record.identifier() else {
                continue;
            };

            if self.excluded.contains(identifier) {
                tracing::debug!("Dropping excluded identifier '{}' (line {})", identifier, record.line);
                outcome.excluded += 1;
                continue;
            }

            if !seen.insert(identifier.to_string()) {
                tracing::debug!(
                    "Dropping repeat submission from '{}' (line {})",
                    identifier,
                    record.line
                );
                outcome.duplicates += 1;
                continue;
            }

            outcome.submissions.push(self.into_submission(record));
        }

        Ok(outcome)
    }

    fn reject(
        &self,
        record: &RawRecord,
        identifier: Option<String>,
        outcome: &mut DedupOutcome,
    ) -> Result<()> {
        let error = ScorerError::MalformedRecord {
            line: record.line,
            field_count: record.fields.len(),
        };

        match self.on_malformed {
            ErrorPolicy::Abort => Err(error),
            ErrorPolicy::Skip => {
                tracing::warn!("Skipping record: {}", error);
                outcome.skipped.push(SkippedSubmission {
                    line: record.line,
                    identifier,
                    reason: error.to_string(),
                });
                Ok(())
            }
        }
    }

    fn into_submission(&self, mut record: RawRecord) -> Submission {
        let identifier = record.fields.pop().unwrap_or_default();
        let mut labels = record.fields;
        if self.ignore_blank_labels {
            labels.retain(|label| !label.trim().is_empty());
        }

        Submission {
            line: record.line,
            identifier,
            labels,
        }
    }
}
