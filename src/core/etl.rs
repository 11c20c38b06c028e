use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct BatchEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> BatchEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs one batch end to end. Nothing is written unless every step before
    /// `load` succeeded.
    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting scoring run");

        let records = self.pipeline.extract().await?;
        tracing::info!("Read {} records", records.len());

        let outcome = self.pipeline.transform(records).await?;
        let summary = outcome.summary;
        tracing::info!(
            "Scored {} submissions ({} duplicates dropped, {} excluded, {} skipped)",
            summary.scored,
            summary.duplicates_dropped,
            summary.excluded_dropped,
            summary.skipped
        );
        if let Some(top) = outcome.report.results.first() {
            tracing::info!(
                "Top score: {} / {} ({})",
                top.raw_score,
                outcome.report.max_score,
                top.identifier
            );
        }

        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!("Report written to {} in {:?}", output_path, started.elapsed());

        Ok(output_path)
    }
}
