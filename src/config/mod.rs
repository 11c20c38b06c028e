pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{ErrorPolicy, NegativeScores};
#[cfg(feature = "cli")]
use crate::domain::ports::OutputFormat;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "card-sort-scorer")]
#[command(about = "Scores card-ordering submissions against the correct order and ranks participants")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Submissions CSV (overrides input.path)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Report destination (overrides output.path)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Report format: csv or json
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Write skipped submissions to this CSV file
    #[arg(long)]
    pub skipped_output: Option<String>,

    /// abort or skip
    #[arg(long)]
    pub on_unknown_label: Option<ErrorPolicy>,

    /// abort or skip
    #[arg(long)]
    pub on_empty_submission: Option<ErrorPolicy>,

    /// abort or skip
    #[arg(long)]
    pub on_malformed_record: Option<ErrorPolicy>,

    /// Report negative raw scores as zero
    #[arg(long)]
    pub clamp_negative: bool,

    /// Validate the input against the configuration without writing a report
    #[arg(long)]
    pub dry_run: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Command line values win over the configuration file.
    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(skipped) = &self.skipped_output {
            config.output.skipped_path = Some(skipped.clone());
        }
        if let Some(policy) = self.on_unknown_label {
            config.error_handling.on_unknown_label = policy;
        }
        if let Some(policy) = self.on_empty_submission {
            config.error_handling.on_empty_submission = policy;
        }
        if let Some(policy) = self.on_malformed_record {
            config.error_handling.on_malformed_record = policy;
        }
        if self.clamp_negative {
            config.scoring.negative_scores = NegativeScores::Clamp;
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = CliConfig::parse_from([
            "card-sort-scorer",
            "--input",
            "week3.csv",
            "--format",
            "json",
            "--on-unknown-label",
            "skip",
            "--clamp-negative",
        ]);
        let mut config = TomlConfig::default();

        cli.apply_overrides(&mut config);

        assert_eq!(config.input.path, "week3.csv");
        assert_eq!(config.output.path, "scores.csv");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.error_handling.on_unknown_label, ErrorPolicy::Skip);
        assert_eq!(config.error_handling.on_malformed_record, ErrorPolicy::Abort);
        assert_eq!(config.scoring.negative_scores, NegativeScores::Clamp);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let parsed = CliConfig::try_parse_from(["card-sort-scorer", "--on-empty-submission", "ignore"]);
        assert!(parsed.is_err());
    }
}
