use clap::Parser;
use fraud_scorer::presentation::{render_json, render_rule_table, render_text};
use fraud_scorer::utils::error::{ErrorSeverity, ScoreError};
use fraud_scorer::utils::{logger, validation::Validate};
use fraud_scorer::{CliConfig, OutputFormat, RiskScorer, ScoringPolicy, TomlConfig};

fn load_policy(config: &CliConfig) -> Result<ScoringPolicy, ScoreError> {
    match &config.policy {
        Some(path) => {
            tracing::info!("📁 Loading policy from: {}", path);
            let file = TomlConfig::from_file(path)?;
            file.validate()?;
            Ok(file.policy())
        }
        None => Ok(ScoringPolicy::default()),
    }
}

fn run(config: &CliConfig) -> Result<String, ScoreError> {
    config.validate()?;

    let policy = load_policy(config)?;
    if config.explain {
        return Ok(render_rule_table(&policy));
    }

    let transaction = config.transaction()?;
    let scorer = RiskScorer::new(policy);
    let assessment = scorer.score(&transaction);

    match config.format {
        OutputFormat::Text => Ok(render_text(scorer.policy(), &transaction, &assessment)),
        OutputFormat::Json => render_json(scorer.policy(), &transaction, &assessment),
    }
}

fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::debug!("CLI config: {:?}", config);

    match run(&config) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            tracing::error!(
                "❌ Scoring failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 無效輸入 → 2，其餘設定/系統錯誤 → 1
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::Medium => 2,
                ErrorSeverity::High | ErrorSeverity::Critical => 1,
            };
            std::process::exit(exit_code);
        }
    }
}
