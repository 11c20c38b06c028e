use card_sort_scorer::domain::ports::{ConfigProvider, Pipeline};
use card_sort_scorer::domain::services::{LabelTranslator, SubmissionDeduplicator};
use card_sort_scorer::utils::error::ErrorSeverity;
use card_sort_scorer::utils::{logger, validation::Validate};
use card_sort_scorer::{BatchEngine, CliConfig, LocalStorage, ResolvedConfig, ScoringPipeline, TomlConfig};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => TomlConfig::default(),
    };
    args.apply_overrides(&mut config);

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let resolved = config.resolve()?;
    display_config_summary(&resolved, &args);

    let storage = LocalStorage::new(".");
    let pipeline = ScoringPipeline::new(storage, resolved);

    if args.dry_run {
        return match perform_dry_run(&pipeline).await {
            Ok(()) => Ok(()),
            Err(e) => {
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        };
    }

    let engine = BatchEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Scores saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "Scoring run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &ResolvedConfig, args: &CliConfig) {
    let policy = config.policy();

    println!("📋 Configuration Summary:");
    if let Some(name) = &config.name {
        println!("  Exercise: {}", name);
    }
    println!("  Input: {}", config.input_path());
    println!("  Output: {} ({})", config.output_path(), config.output_format());
    println!(
        "  Reference answer: {} ({} cards, max score {})",
        policy.reference_answer,
        policy.reference_answer.chars().count(),
        policy.max_score()
    );
    println!(
        "  Points: +{} per correct, -{} per incorrect, negative scores: {}",
        policy.points_per_correct, policy.points_per_incorrect, policy.negative_scores
    );
    println!(
        "  On error: unknown label={}, empty submission={}, malformed record={}",
        policy.on_unknown_label, policy.on_empty_submission, policy.on_malformed_record
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

/// Reads and deduplicates the input, then reports every label the code map
/// cannot translate, without scoring or writing anything.
async fn perform_dry_run(
    pipeline: &ScoringPipeline<LocalStorage, ResolvedConfig>,
) -> anyhow::Result<()> {
    let policy = pipeline.config().policy();
    let records = pipeline.extract().await?;
    let record_count = records.len();

    let mut dry_policy = policy.clone();
    dry_policy.on_malformed_record = card_sort_scorer::ErrorPolicy::Skip;
    let deduped = SubmissionDeduplicator::from_policy(&dry_policy).filter(records)?;

    println!("🔍 Dry Run Analysis:");
    println!("  Records read: {}", record_count);
    println!("  Participants: {}", deduped.submissions.len());
    println!("  Duplicates dropped: {}", deduped.duplicates);
    println!("  Excluded dropped: {}", deduped.excluded);
    println!("  Malformed records: {}", deduped.skipped.len());

    let empty = deduped
        .submissions
        .iter()
        .filter(|s| s.labels.is_empty())
        .count();
    if empty > 0 {
        println!("  Empty submissions: {}", empty);
    }

    let unknown = LabelTranslator::new(&policy.code_map).unknown_labels(&deduped.submissions);
    if unknown.is_empty() {
        println!("  ✅ Every submitted label is in the code map");
    } else {
        let labels: Vec<String> = unknown.into_iter().collect();
        println!("  ❌ Labels missing from the code map: {}", labels.join(", "));
    }

    println!();
    println!("✅ Dry run complete. Rerun without --dry-run to write the report.");

    Ok(())
}
