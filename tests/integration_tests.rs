use anyhow::Result;
use card_sort_scorer::{BatchEngine, LocalStorage, ScorerError, ScoringPipeline, TomlConfig};
use tempfile::TempDir;

const RESPONSES: &str = "\
A1,A2,A3,A4,A5,ada@example.com
A2,A1,A3,A4,A5,grace@example.com
A1,A2,A3,A4,A5,test@test.com
A5,A4,A3,A2,A1,alan@example.com
A1,A2,A3,A5,A4,grace@example.com
A1,A3,A2,A4,A5,edsger@example.com
";

fn write_config(dir: &TempDir, extra: &str) -> Result<TomlConfig> {
    let root = dir.path().to_str().unwrap().replace('\\', "/");
    let content = format!(
        r#"
[input]
path = "{root}/responses.csv"

[output]
path = "{root}/out/scores.csv"
{extra}
"#
    );
    let config_path = dir.path().join("scorer.toml");
    std::fs::write(&config_path, content)?;
    Ok(TomlConfig::from_file(&config_path)?)
}

#[tokio::test]
async fn test_end_to_end_default_exercise() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("responses.csv"), RESPONSES)?;

    let config = write_config(&temp_dir, "")?.resolve()?;
    let pipeline = ScoringPipeline::new(LocalStorage::new("."), config);
    let output_path = BatchEngine::new(pipeline).run().await?;

    assert!(output_path.ends_with("out/scores.csv"));
    let report = std::fs::read_to_string(temp_dir.path().join("out/scores.csv"))?;
    assert_eq!(
        report,
        "ada@example.com,20,0.0\n\
         grace@example.com,10,0.4\n\
         edsger@example.com,10,0.4\n\
         alan@example.com,0,0.8\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_label_aborts_without_writing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("responses.csv"),
        "A1,A2,A3,A4,A5,ada@example.com\nA1,B2,A3,A4,A5,grace@example.com\n",
    )?;

    let config = write_config(&temp_dir, "")?.resolve()?;
    let pipeline = ScoringPipeline::new(LocalStorage::new("."), config);
    let err = BatchEngine::new(pipeline).run().await.unwrap_err();

    match err {
        ScorerError::UnknownLabel { identifier, line, label } => {
            assert_eq!(identifier, "grace@example.com");
            assert_eq!(line, 2);
            assert_eq!(label, "B2");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!temp_dir.path().join("out/scores.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_skip_policy_writes_skipped_report() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("responses.csv"),
        "A1,B2,A3,A4,A5,grace@example.com\nalone@example.com\nA1,A2,A3,A4,A5,ada@example.com\n",
    )?;
    let root = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let mut config = write_config(
        &temp_dir,
        &format!("skipped_path = \"{root}/out/skipped.csv\"\n\n[error_handling]\non_unknown_label = \"skip\"\non_malformed_record = \"skip\"\n"),
    )?;
    config.output.include_header = true;

    let pipeline = ScoringPipeline::new(LocalStorage::new("."), config.resolve()?);
    BatchEngine::new(pipeline).run().await?;

    let report = std::fs::read_to_string(temp_dir.path().join("out/scores.csv"))?;
    assert_eq!(report, "identifier,raw_score,fraction_incorrect\nada@example.com,20,0.0\n");

    let skipped = std::fs::read_to_string(temp_dir.path().join("out/skipped.csv"))?;
    let lines: Vec<&str> = skipped.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("1,grace@example.com,"));
    assert!(lines[1].starts_with("2,alone@example.com,"));
    Ok(())
}

#[tokio::test]
async fn test_custom_exercise_with_json_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("responses.csv"),
        "Earth,Venus,Mercury,sam@example.com\nMercury,Venus,Earth,kim@example.com\n",
    )?;
    let root = temp_dir.path().to_str().unwrap().replace('\\', "/");
    let content = format!(
        r#"
[exercise]
name = "planets by distance"

[input]
path = "{root}/responses.csv"

[scoring]
reference_answer = "mve"
points_per_correct = 2
points_per_incorrect = 3
negative_scores = "clamp"

[scoring.code_map]
Mercury = "m"
Venus = "v"
Earth = "e"

[output]
path = "{root}/planets.json"
format = "json"
"#
    );
    let config = TomlConfig::from_toml_str(&content)?.resolve()?;

    let pipeline = ScoringPipeline::new(LocalStorage::new("."), config);
    BatchEngine::new(pipeline).run().await?;

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(temp_dir.path().join("planets.json"))?)?;
    assert_eq!(json["max_score"], 6);
    assert_eq!(json["results"][0]["identifier"], "kim@example.com");
    assert_eq!(json["results"][0]["raw_score"], 6);
    // "evm" vs "mve": distance 2, (3 - 2) * 2 - 2 * 3 = -4, clamped
    assert_eq!(json["results"][1]["identifier"], "sam@example.com");
    assert_eq!(json["results"][1]["raw_score"], 0);
    assert_eq!(json["results"][1]["fraction_incorrect"], 0.67);
    Ok(())
}
