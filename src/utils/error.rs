use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Invalid location risk: '{value}' (expected Same City, Different City or Different Country)")]
    InvalidLocationRisk { value: String },

    #[error("Invalid transaction at line {line}: {message}")]
    InvalidTransaction { line: u64, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Config,
    Io,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoreError::InvalidLocationRisk { .. } | ScoreError::InvalidTransaction { .. } => {
                ErrorCategory::Input
            }
            ScoreError::ConfigValidationError { .. }
            | ScoreError::InvalidConfigValueError { .. }
            | ScoreError::MissingConfigError { .. } => ErrorCategory::Config,
            ScoreError::IoError(_) | ScoreError::CsvError(_) => ErrorCategory::Io,
            ScoreError::SerializationError(_) | ScoreError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ScoreError::InvalidLocationRisk { .. } => {
                "Use one of: \"Same City\", \"Different City\", \"Different Country\"".to_string()
            }
            ScoreError::InvalidTransaction { line, .. } => {
                format!("Fix the row at line {} (amount and frequency must be integers)", line)
            }
            ScoreError::IoError(_) => "Check that the file exists and is readable/writable".to_string(),
            ScoreError::CsvError(_) => {
                "Make sure the input has the header: id,amount,location,frequency".to_string()
            }
            ScoreError::SerializationError(_) => "Report this as a bug".to_string(),
            ScoreError::ConfigValidationError { field, .. }
            | ScoreError::InvalidConfigValueError { field, .. } => {
                format!("Review the '{}' setting in the configuration file", field)
            }
            ScoreError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration file or pass it on the command line", field)
            }
            ScoreError::ProcessingError { .. } => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoreError::InvalidLocationRisk { value } => {
                format!("Unknown transaction location '{}'", value)
            }
            ScoreError::InvalidTransaction { line, message } => {
                format!("Transaction on line {} could not be read: {}", line, message)
            }
            ScoreError::IoError(e) => format!("File access failed: {}", e),
            ScoreError::CsvError(e) => format!("Could not read the transactions file: {}", e),
            ScoreError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
