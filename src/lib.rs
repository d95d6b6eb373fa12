pub mod config;
pub mod core;
pub mod domain;
pub mod presentation;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, OutputFormat};

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    batch::BatchPipeline,
    engine::ScoringEngine,
    scorer::{RiskScorer, ScoringPolicy},
};
pub use domain::model::{Decision, FraudAssessment, LocationRisk, Transaction};
pub use utils::error::{Result, ScoreError};
