use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScorerError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Unknown card label '{label}' in submission from '{identifier}' (line {line})")]
    UnknownLabel {
        identifier: String,
        line: usize,
        label: String,
    },

    #[error("Submission from '{identifier}' (line {line}) contains no card labels")]
    EmptySubmission { identifier: String, line: usize },

    #[error("Malformed record at line {line}: expected card labels and an identifier, found {field_count} field(s)")]
    MalformedRecord { line: usize, field_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Configuration,
    Input,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScorerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScorerError::CsvError(_) | ScorerError::IoError(_) => ErrorCategory::Io,
            ScorerError::ConfigError { .. }
            | ScorerError::ConfigValidationError { .. }
            | ScorerError::InvalidConfigValueError { .. }
            | ScorerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ScorerError::UnknownLabel { .. }
            | ScorerError::EmptySubmission { .. }
            | ScorerError::MalformedRecord { .. } => ErrorCategory::Input,
            ScorerError::SerializationError(_) => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScorerError::CsvError(_) => "Check that the input file is valid comma-separated text",
            ScorerError::IoError(_) => "Check that the input file exists and the output directory is writable",
            ScorerError::SerializationError(_) => "Try the csv output format instead",
            ScorerError::ConfigError { .. }
            | ScorerError::ConfigValidationError { .. }
            | ScorerError::InvalidConfigValueError { .. }
            | ScorerError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
            ScorerError::UnknownLabel { .. } => {
                "Add the label to [scoring.code_map] or rerun with --on-unknown-label skip"
            }
            ScorerError::EmptySubmission { .. } => {
                "Fix the record or rerun with --on-empty-submission skip"
            }
            ScorerError::MalformedRecord { .. } => {
                "Each row needs at least one card label followed by the participant identifier; rerun with --on-malformed-record skip to ignore it"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Io => format!("Could not read or write a file: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Bad submission data: {}", self),
            ErrorCategory::Processing => format!("Scoring failed: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScorerError>;
