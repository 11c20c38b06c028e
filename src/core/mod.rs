pub mod etl;
pub mod pipeline;
pub mod report;

pub use crate::domain::model::{RawRecord, ScoringOutcome};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
