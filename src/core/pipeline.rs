use crate::core::report;
use crate::domain::model::{BatchSummary, RawRecord, ScoringOutcome};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::domain::services::{RankingAggregator, SubmissionDeduplicator};
use crate::utils::error::Result;
use csv::{ReaderBuilder, Trim};

/// Reads submissions from a CSV file, scores them, and writes the ranked report.
pub struct ScoringPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ScoringPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    fn parse_records(&self, data: &[u8]) -> Result<Vec<RawRecord>> {
        let trim = if self.config.trim_whitespace() {
            Trim::All
        } else {
            Trim::None
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(trim)
            .from_reader(data);

        // The reader's own line counter skips blank lines, so count newlines
        // up to each record's byte offset instead.
        let mut records = Vec::new();
        let (mut line, mut scanned) = (1, 0);
        for row in reader.records() {
            let row = row?;
            if let Some(position) = row.position() {
                let offset = (position.byte() as usize).min(data.len());
                line += data[scanned..offset].iter().filter(|&&b| b == b'\n').count();
                scanned = offset;
            }
            records.push(RawRecord::new(line, row.iter().map(String::from).collect()));
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ScoringPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        let data = self.storage.read_file(self.config.input_path()).await?;
        let records = self.parse_records(&data)?;
        tracing::debug!("Parsed {} records from {}", records.len(), self.config.input_path());
        Ok(records)
    }

    async fn transform(&self, records: Vec<RawRecord>) -> Result<ScoringOutcome> {
        let policy = self.config.policy();
        let records_read = records.len();

        let deduped = SubmissionDeduplicator::from_policy(policy).filter(records)?;
        let mut report = RankingAggregator::from_policy(policy).aggregate(deduped.submissions)?;

        report.skipped.extend(deduped.skipped);
        report.skipped.sort_by_key(|entry| entry.line);

        let summary = BatchSummary {
            records_read,
            duplicates_dropped: deduped.duplicates,
            excluded_dropped: deduped.excluded,
            skipped: report.skipped.len(),
            scored: report.results.len(),
        };

        Ok(ScoringOutcome { report, summary })
    }

    async fn load(&self, outcome: ScoringOutcome) -> Result<String> {
        let output_path = self.config.output_path();
        let data = report::render(
            &outcome.report,
            self.config.output_format(),
            self.config.include_header(),
        )?;
        let skipped = match self.config.skipped_path() {
            Some(path) => Some((path, report::render_skipped(&outcome.report.skipped)?)),
            None => None,
        };

        // The main report goes last so a failed run never leaves one behind.
        if let Some((skipped_path, skipped)) = skipped {
            self.storage.write_file(skipped_path, &skipped).await?;
            tracing::debug!(
                "Wrote {} skipped submissions to {}",
                outcome.report.skipped.len(),
                skipped_path
            );
        }
        self.storage.write_file(output_path, &data).await?;

        Ok(output_path.to_string())
    }
}
