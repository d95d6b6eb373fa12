use clap::Parser;
use fraud_scorer::config::toml_config::{BatchConfig, DEFAULT_CONFIG_FILE};
use fraud_scorer::core::ConfigProvider;
use fraud_scorer::presentation::render_rule_table;
use fraud_scorer::utils::error::ErrorSeverity;
use fraud_scorer::utils::{logger, validation::Validate};
use fraud_scorer::{BatchPipeline, LocalStorage, RiskScorer, ScoringEngine, TomlConfig};

#[derive(Parser)]
#[command(name = "batch-score")]
#[command(about = "Score a CSV file of card transactions")]
struct Args {
    /// Path to TOML configuration file [default: fraud-scorer.toml, if present]
    #[arg(short, long)]
    config: Option<String>,

    /// Override batch.input_path
    #[arg(short, long)]
    input: Option<String>,

    /// Override batch.output_path
    #[arg(short, long)]
    output: Option<String>,

    /// Stop at the first invalid row instead of rejecting it
    #[arg(long)]
    fail_fast: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dry run - show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 沒指定 --config 且預設檔不存在時，只要命令列有給 input/output 仍可執行
    let mut config = match TomlConfig::load_or_default(args.config.as_deref(), DEFAULT_CONFIG_FILE) {
        Ok(config) => config,
        Err(e) => {
            let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE);
            eprintln!("❌ Failed to load config file '{}': {}", path, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    logger::init_batch_logger(config.log_level(), config.json_logs(), args.verbose);
    tracing::info!("🚀 Starting batch fraud scoring");

    // 套用命令列覆蓋設定
    if args.input.is_some() || args.output.is_some() || args.fail_fast {
        let mut batch: BatchConfig = config.batch.clone().unwrap_or_default();
        if let Some(input) = &args.input {
            batch.input_path = input.clone();
        }
        if let Some(output) = &args.output {
            batch.output_path = output.clone();
        }
        if args.fail_fast {
            batch.fail_fast = Some(true);
        }
        config.batch = Some(batch);
    }

    let validated = config
        .validate()
        .and_then(|_| config.batch_config().cloned());
    let batch = match validated {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &batch, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        println!("Rules:");
        print!("{}", render_rule_table(&config.policy()));
        return Ok(());
    }

    let scorer = RiskScorer::new(config.policy());
    let pipeline = BatchPipeline::new(LocalStorage::default(), batch, scorer);
    let engine = ScoringEngine::new(pipeline);

    match engine.run() {
        Ok(output_path) => {
            tracing::info!("✅ Batch scoring completed successfully!");
            println!("✅ Batch scoring completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Batch scoring failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
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

fn display_config_summary(config: &TomlConfig, batch: &BatchConfig, args: &Args) {
    let policy = config.policy();

    println!("📋 Configuration Summary:");
    println!("  Input: {}", batch.input_path());
    println!("  Output: {}", batch.output_path());
    println!("  Fail fast: {}", batch.fail_fast());
    println!(
        "  Policy: {} (block at >= {}%)",
        if config.policy.is_some() { "custom" } else { "fixed rules" },
        policy.block_threshold
    );

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
