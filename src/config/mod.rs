pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{
    LocationRisk, Transaction, AMOUNT_SLIDER_DEFAULT, AMOUNT_SLIDER_MAX, AMOUNT_SLIDER_MIN,
    FREQUENCY_SLIDER_DEFAULT, FREQUENCY_SLIDER_MAX, FREQUENCY_SLIDER_MIN,
};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "fraud-scorer")]
#[command(about = "Score a card transaction with the rule-based fraud model")]
pub struct CliConfig {
    /// Transaction amount (₹)
    #[arg(
        long,
        default_value_t = AMOUNT_SLIDER_DEFAULT,
        value_parser = clap::value_parser!(i64).range(AMOUNT_SLIDER_MIN..=AMOUNT_SLIDER_MAX)
    )]
    pub amount: i64,

    /// Transaction location: "Same City", "Different City" or "Different Country"
    #[arg(long, default_value = "Same City")]
    pub location: String,

    /// Transactions in the last hour
    #[arg(
        long,
        default_value_t = FREQUENCY_SLIDER_DEFAULT,
        value_parser = clap::value_parser!(i64).range(FREQUENCY_SLIDER_MIN..=FREQUENCY_SLIDER_MAX)
    )]
    pub frequency: i64,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the rule table instead of scoring
    #[arg(long)]
    pub explain: bool,

    /// TOML file with a [policy] section overriding the fixed rules
    #[arg(long)]
    pub policy: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn transaction(&self) -> Result<Transaction> {
        let location: LocationRisk = self.location.parse()?;
        Ok(Transaction::new(self.amount, location, self.frequency))
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(policy) = &self.policy {
            validate_path("policy", policy)?;
        }
        Ok(())
    }
}
