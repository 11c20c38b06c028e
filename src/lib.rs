pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::cli::LocalStorage;
pub use config::toml_config::{ResolvedConfig, TomlConfig};
pub use core::{etl::BatchEngine, pipeline::ScoringPipeline};
pub use domain::model::{
    CodeMap, ErrorPolicy, NegativeScores, RankedReport, ScoredResult, ScoringPolicy, Submission,
};
pub use utils::error::{Result, ScorerError};
