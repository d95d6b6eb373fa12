use crate::core::scorer::ScoringPolicy;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, ScoreError};
use crate::utils::validation::{
    validate_file_extension, validate_one_of, validate_path, validate_required_field, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "fraud-scorer.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub batch: Option<BatchConfig>,
    pub policy: Option<ScoringPolicy>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub input_path: String,
    pub output_path: String,
    pub fail_fast: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScoreError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// An explicitly given path must load; without one, `fallback` is used
    /// when it exists and the built-in defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(explicit: Option<&str>, fallback: P) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if fallback.as_ref().exists() => Self::from_file(fallback),
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ScoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${INPUT_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ScoreError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn batch_config(&self) -> Result<&BatchConfig> {
        validate_required_field("batch", &self.batch)
    }

    /// 未設定 `[policy]` 時使用固定規則表
    pub fn policy(&self) -> ScoringPolicy {
        self.policy.clone().unwrap_or_default()
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.format.as_deref())
            .map(|f| f == "json")
            .unwrap_or(false)
    }
}

impl Validate for BatchConfig {
    fn validate(&self) -> Result<()> {
        validate_path("batch.input_path", &self.input_path)?;
        validate_file_extension("batch.input_path", &self.input_path, &["csv"])?;
        validate_path("batch.output_path", &self.output_path)?;
        Ok(())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(batch) = &self.batch {
            batch.validate()?;
        }

        if let Some(policy) = &self.policy {
            policy.validate()?;
        }

        if let Some(logging) = &self.logging {
            if let Some(level) = &logging.level {
                validate_one_of("logging.level", level, &LOG_LEVELS)?;
            }
            if let Some(format) = &logging.format {
                validate_one_of("logging.format", format, &LOG_FORMATS)?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for BatchConfig {
    fn input_path(&self) -> &str {
        &self.input_path
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn fail_fast(&self) -> bool {
        self.fail_fast.unwrap_or(false)
    }
}
