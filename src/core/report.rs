use crate::domain::model::{RankedReport, SkippedSubmission};
use crate::domain::ports::OutputFormat;
use crate::utils::error::{Result, ScorerError};

pub fn render(report: &RankedReport, format: OutputFormat, include_header: bool) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => render_csv(report, include_header),
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(report)?),
    }
}

/// One `identifier,raw_score,fraction_incorrect` row per result, in report order.
pub fn render_csv(report: &RankedReport, include_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if include_header {
        writer.write_record(["identifier", "raw_score", "fraction_incorrect"])?;
    }

    for result in &report.results {
        writer.write_record([
            result.identifier.as_str(),
            result.raw_score.to_string().as_str(),
            format_fraction(result.fraction_incorrect).as_str(),
        ])?;
    }

    finish(writer)
}

pub fn render_skipped(skipped: &[SkippedSubmission]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for entry in skipped {
        writer.write_record([
            entry.line.to_string().as_str(),
            entry.identifier.as_deref().unwrap_or(""),
            entry.reason.as_str(),
        ])?;
    }

    finish(writer)
}

/// Always keeps a decimal point: `0.0`, `0.4`, `0.33`.
fn format_fraction(value: f64) -> String {
    format!("{:?}", value)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| ScorerError::IoError(e.into_error()))
}
