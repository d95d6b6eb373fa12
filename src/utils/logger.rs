use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fraud_scorer=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fraud_scorer=warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Default filter for `batch-score`: the configured level covers both the
/// library and the binary's own target.
pub fn batch_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level };
    format!("fraud_scorer={0},batch_score={0},warn", level)
}

/// 批次作業用：依 `[logging]` 設定選擇 level 與格式，輸出到 stderr
pub fn init_batch_logger(level: &str, json: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(batch_directive(level, verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_directive_applies_level_to_binary_target() {
        assert_eq!(
            batch_directive("error", false),
            "fraud_scorer=error,batch_score=error,warn"
        );
        assert!(EnvFilter::try_new(batch_directive("error", false)).is_ok());
    }

    #[test]
    fn test_batch_directive_verbose_overrides_level() {
        let directive = batch_directive("warn", true);
        assert!(directive.contains("fraud_scorer=debug"));
        assert!(directive.contains("batch_score=debug"));
    }
}
