use crate::utils::error::ScoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 交易金額 (₹)
pub type Amount = i64;

/// 最近一小時內的交易次數
pub type Frequency = i64;

/// 儀表板滑桿範圍；評分函數本身接受任何整數
pub const AMOUNT_SLIDER_MIN: Amount = 100;
pub const AMOUNT_SLIDER_MAX: Amount = 200_000;
pub const AMOUNT_SLIDER_DEFAULT: Amount = 5_000;
pub const FREQUENCY_SLIDER_MIN: Frequency = 1;
pub const FREQUENCY_SLIDER_MAX: Frequency = 20;
pub const FREQUENCY_SLIDER_DEFAULT: Frequency = 3;

/// Where the transaction happened relative to the cardholder's usual location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LocationRisk {
    #[default]
    SameCity,
    DifferentCity,
    DifferentCountry,
}

impl LocationRisk {
    pub const ALL: [LocationRisk; 3] = [
        LocationRisk::SameCity,
        LocationRisk::DifferentCity,
        LocationRisk::DifferentCountry,
    ];

    /// Label shown in the selector.
    pub fn label(&self) -> &'static str {
        match self {
            LocationRisk::SameCity => "Same City",
            LocationRisk::DifferentCity => "Different City",
            LocationRisk::DifferentCountry => "Different Country",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            LocationRisk::SameCity => "same_city",
            LocationRisk::DifferentCity => "different_city",
            LocationRisk::DifferentCountry => "different_country",
        }
    }
}

impl fmt::Display for LocationRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LocationRisk {
    type Err = ScoreError;

    /// 接受顯示標籤或 snake/kebab 形式，大小寫不拘；其他一律拒絕，不預設為零風險
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");

        match normalized.as_str() {
            "same_city" => Ok(LocationRisk::SameCity),
            "different_city" => Ok(LocationRisk::DifferentCity),
            "different_country" => Ok(LocationRisk::DifferentCountry),
            _ => Err(ScoreError::InvalidLocationRisk {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for LocationRisk {
    type Error = ScoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocationRisk> for String {
    fn from(value: LocationRisk) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Blocked,
}

impl Decision {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Decision::Blocked)
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            Decision::Approved => "✅ Transaction Approved (Legitimate)",
            Decision::Blocked => "🚫 Transaction Blocked (Fraud Detected)",
        }
    }

    pub fn advisory(&self) -> Option<&'static str> {
        match self {
            Decision::Approved => None,
            Decision::Blocked => Some("Potential Financial Loss Prevented"),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approved => f.write_str("approved"),
            Decision::Blocked => f.write_str("blocked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub amount: Amount,
    pub location: LocationRisk,
    pub frequency: Frequency,
}

impl Transaction {
    pub fn new(amount: Amount, location: LocationRisk, frequency: Frequency) -> Self {
        Self {
            id: None,
            amount,
            location,
            frequency,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 是否落在儀表板滑桿可選的範圍內
    pub fn is_within_slider_range(&self) -> bool {
        (AMOUNT_SLIDER_MIN..=AMOUNT_SLIDER_MAX).contains(&self.amount)
            && (FREQUENCY_SLIDER_MIN..=FREQUENCY_SLIDER_MAX).contains(&self.frequency)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new(
            AMOUNT_SLIDER_DEFAULT,
            LocationRisk::default(),
            FREQUENCY_SLIDER_DEFAULT,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RiskComponents {
    pub amount: u32,
    pub location: u32,
    pub frequency: u32,
}

impl RiskComponents {
    pub fn sum(&self) -> u32 {
        self.amount
            .saturating_add(self.location)
            .saturating_add(self.frequency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudAssessment {
    /// Fraud probability as an integer percentage.
    pub probability: u32,
    pub decision: Decision,
    pub components: RiskComponents,
}

/// 批次輸入的一列原始資料（尚未解析）
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawRecord {
    #[serde(skip)]
    pub line: u64,
    #[serde(default)]
    pub id: Option<String>,
    pub amount: String,
    pub location: String,
    pub frequency: String,
    /// Set when the CSV reader could not decode the row at all.
    #[serde(skip)]
    pub malformed: Option<String>,
}

impl RawRecord {
    pub fn malformed(line: u64, reason: impl Into<String>) -> Self {
        Self {
            line,
            malformed: Some(reason.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecord {
    pub id: String,
    pub amount: Amount,
    pub location: LocationRisk,
    pub frequency: Frequency,
    pub amount_score: u32,
    pub location_score: u32,
    pub frequency_score: u32,
    pub fraud_probability: u32,
    pub decision: Decision,
}

impl ScoredRecord {
    pub fn new(id: String, transaction: &Transaction, assessment: &FraudAssessment) -> Self {
        Self {
            id,
            amount: transaction.amount,
            location: transaction.location,
            frequency: transaction.frequency,
            amount_score: assessment.components.amount,
            location_score: assessment.components.location,
            frequency_score: assessment.components.frequency,
            fraud_probability: assessment.probability,
            decision: assessment.decision,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub scored: Vec<ScoredRecord>,
    pub rejected: Vec<RejectedRow>,
    pub out_of_range: usize,
}
