use crate::domain::model::{CodeMap, ErrorPolicy, NegativeScores, ScoringPolicy};
use crate::domain::ports::{ConfigProvider, OutputFormat};
use crate::utils::error::{Result, ScorerError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_single_symbol,
    validate_symbols_known, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

const MAX_POINTS: i64 = 1_000_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    pub exercise: Option<ExerciseConfig>,
    pub input: InputConfig,
    pub scoring: ScoringConfig,
    pub error_handling: ErrorHandlingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub path: String,
    pub trim_whitespace: bool,
    pub ignore_blank_labels: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "student_responses.csv".to_string(),
            trim_whitespace: false,
            ignore_blank_labels: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Card label to single-character symbol.
    pub code_map: BTreeMap<String, String>,
    /// Correct card order, written in code map symbols.
    pub reference_answer: String,
    pub points_per_correct: i64,
    pub points_per_incorrect: i64,
    pub excluded_identifiers: Vec<String>,
    pub negative_scores: NegativeScores,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let code_map = ["A1", "A2", "A3", "A4", "A5", "A6", "A7"]
            .into_iter()
            .zip('a'..='g')
            .map(|(label, symbol)| (label.to_string(), symbol.to_string()))
            .collect();

        Self {
            code_map,
            reference_answer: "abcde".to_string(),
            points_per_correct: 4,
            points_per_incorrect: 1,
            excluded_identifiers: vec!["test@test.com".to_string()],
            negative_scores: NegativeScores::Keep,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorHandlingConfig {
    pub on_unknown_label: ErrorPolicy,
    pub on_empty_submission: ErrorPolicy,
    pub on_malformed_record: ErrorPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: String,
    pub format: OutputFormat,
    pub include_header: bool,
    /// Where to list submissions dropped under a `skip` policy.
    pub skipped_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "scores.csv".to_string(),
            format: OutputFormat::Csv,
            include_header: false,
            skipped_path: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScorerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScorerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${RESPONSES_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScorerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("input.path", &self.input.path)?;
        validate_path("output.path", &self.output.path)?;
        if let Some(skipped) = &self.output.skipped_path {
            validate_path("output.skipped_path", skipped)?;
        }

        let code_map = self.code_map()?;
        if code_map.is_empty() {
            return Err(ScorerError::MissingConfigError {
                field: "scoring.code_map".to_string(),
            });
        }

        validate_non_empty_string("scoring.reference_answer", &self.scoring.reference_answer)?;
        validate_symbols_known(
            "scoring.reference_answer",
            &self.scoring.reference_answer,
            &code_map.alphabet(),
        )?;

        validate_range("scoring.points_per_correct", self.scoring.points_per_correct, 0, MAX_POINTS)?;
        validate_range(
            "scoring.points_per_incorrect",
            self.scoring.points_per_incorrect,
            0,
            MAX_POINTS,
        )?;

        Ok(())
    }

    fn code_map(&self) -> Result<CodeMap> {
        let mut code_map = CodeMap::new();
        for (label, symbol) in &self.scoring.code_map {
            validate_non_empty_string("scoring.code_map", label)?;
            let field = format!("scoring.code_map.{}", label);
            code_map.insert(label.as_str(), validate_single_symbol(&field, symbol)?);
        }
        Ok(code_map)
    }

    /// Validates the configuration and compiles it into the typed form the
    /// pipeline runs on.
    pub fn resolve(self) -> Result<ResolvedConfig> {
        self.validate_config()?;

        let mut policy = ScoringPolicy::new(self.code_map()?, self.scoring.reference_answer);
        policy.points_per_correct = self.scoring.points_per_correct;
        policy.points_per_incorrect = self.scoring.points_per_incorrect;
        policy.excluded_identifiers = self.scoring.excluded_identifiers.into_iter().collect::<HashSet<_>>();
        policy.negative_scores = self.scoring.negative_scores;
        policy.on_unknown_label = self.error_handling.on_unknown_label;
        policy.on_empty_submission = self.error_handling.on_empty_submission;
        policy.on_malformed_record = self.error_handling.on_malformed_record;
        policy.ignore_blank_labels = self.input.ignore_blank_labels;

        Ok(ResolvedConfig {
            name: self.exercise.map(|e| e.name),
            input_path: self.input.path,
            trim_whitespace: self.input.trim_whitespace,
            output_path: self.output.path,
            output_format: self.output.format,
            include_header: self.output.include_header,
            skipped_path: self.output.skipped_path,
            policy,
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub name: Option<String>,
    pub input_path: String,
    pub trim_whitespace: bool,
    pub output_path: String,
    pub output_format: OutputFormat,
    pub include_header: bool,
    pub skipped_path: Option<String>,
    pub policy: ScoringPolicy,
}

impl ConfigProvider for ResolvedConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn trim_whitespace(&self) -> bool {
        self.trim_whitespace
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    fn include_header(&self) -> bool {
        self.include_header
    }

    fn skipped_path(&self) -> Option<&str> {
        self.skipped_path.as_deref()
    }

    fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_classroom_exercise() {
        let resolved = TomlConfig::default().resolve().unwrap();
        let policy = resolved.policy;

        assert_eq!(resolved.input_path, "student_responses.csv");
        assert_eq!(resolved.output_format, OutputFormat::Csv);
        assert_eq!(policy.code_map.len(), 7);
        assert_eq!(policy.code_map.symbol("A7"), Some('g'));
        assert_eq!(policy.reference_answer, "abcde");
        assert_eq!(policy.points_per_correct, 4);
        assert_eq!(policy.points_per_incorrect, 1);
        assert!(policy.excluded_identifiers.contains("test@test.com"));
        assert_eq!(policy.max_score(), 20);
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[exercise]
name = "planets"

[input]
path = "responses/planets.csv"
trim_whitespace = true

[scoring]
reference_answer = "xyz"
points_per_correct = 10
points_per_incorrect = 2
excluded_identifiers = ["teacher@school.edu"]
negative_scores = "clamp"

[scoring.code_map]
Mercury = "x"
Venus = "y"
Earth = "z"

[error_handling]
on_unknown_label = "skip"

[output]
path = "out/planets.json"
format = "json"
skipped_path = "out/skipped.csv"
"#;

        let resolved = TomlConfig::from_toml_str(toml_content).unwrap().resolve().unwrap();

        assert_eq!(resolved.name.as_deref(), Some("planets"));
        assert!(resolved.trim_whitespace);
        assert_eq!(resolved.output_format, OutputFormat::Json);
        assert_eq!(resolved.skipped_path(), Some("out/skipped.csv"));
        assert_eq!(resolved.policy.code_map.symbol("Venus"), Some('y'));
        assert_eq!(resolved.policy.max_score(), 30);
        assert_eq!(resolved.policy.negative_scores, NegativeScores::Clamp);
        assert_eq!(resolved.policy.on_unknown_label, ErrorPolicy::Skip);
        assert_eq!(resolved.policy.on_empty_submission, ErrorPolicy::Abort);
        assert!(!resolved.policy.excluded_identifiers.contains("test@test.com"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CARD_SORT_TEST_RESPONSES", "/data/responses.csv");

        let toml_content = r#"
[input]
path = "${CARD_SORT_TEST_RESPONSES}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.path, "/data/responses.csv");

        std::env::remove_var("CARD_SORT_TEST_RESPONSES");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml_content = r#"
[scoring]
points_per_corect = 5
"#;
        assert!(matches!(
            TomlConfig::from_toml_str(toml_content),
            Err(ScorerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_empty_code_map_reported_missing() {
        let toml_content = r#"
[scoring.code_map]
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        match config.validate().unwrap_err() {
            ScorerError::MissingConfigError { field } => assert_eq!(field, "scoring.code_map"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_multi_character_symbol_rejected() {
        let toml_content = r#"
[scoring.code_map]
A1 = "ab"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reference_answer_outside_alphabet_rejected() {
        let toml_content = r#"
[scoring]
reference_answer = "abcz"
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'z'"));
    }

    #[test]
    fn test_negative_weights_rejected() {
        let toml_content = r#"
[scoring]
points_per_incorrect = -1
"#;
        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\npath = \"ranked.csv\"\ninclude_header = true\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output.path, "ranked.csv");
        assert!(config.output.include_header);
        assert_eq!(config.scoring.reference_answer, "abcde");
    }
}
