//! Ordered threshold tables for the numeric risk rules.
//!
//! A table is a floor score plus a list of `(lower_bound_exclusive, score)`
//! bands with strictly increasing bounds. Lookup returns the score of the
//! highest band whose bound the value strictly exceeds, or the floor.

use crate::utils::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub above: i64,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdTableDef", into = "ThresholdTableDef")]
pub struct ThresholdTable {
    floor: u32,
    bands: Vec<Band>,
}

/// TOML 形式：`{ floor = 10, bands = [[20000, 25], [50000, 40]] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ThresholdTableDef {
    floor: u32,
    #[serde(default)]
    bands: Vec<(i64, u32)>,
}

impl ThresholdTable {
    pub fn new(floor: u32, bands: Vec<Band>) -> Result<Self> {
        if let Some(pair) = bands.windows(2).find(|w| w[0].above >= w[1].above) {
            return Err(ScoreError::ConfigValidationError {
                field: "bands".to_string(),
                message: format!(
                    "band bounds must be strictly increasing ({} is followed by {})",
                    pair[0].above, pair[1].above
                ),
            });
        }

        Ok(Self { floor, bands })
    }

    /// 金額規則：> 50000 → 40，> 20000 → 25，其餘 10
    pub fn amount_default() -> Self {
        Self {
            floor: 10,
            bands: vec![
                Band { above: 20_000, score: 25 },
                Band { above: 50_000, score: 40 },
            ],
        }
    }

    /// 頻率規則：> 10 → 30，> 5 → 15，其餘 0
    pub fn frequency_default() -> Self {
        Self {
            floor: 0,
            bands: vec![
                Band { above: 5, score: 15 },
                Band { above: 10, score: 30 },
            ],
        }
    }

    pub fn lookup(&self, value: i64) -> u32 {
        self.matching_band(value)
            .map(|band| band.score)
            .unwrap_or(self.floor)
    }

    /// The band that fires for `value`, `None` when the floor applies.
    pub fn matching_band(&self, value: i64) -> Option<&Band> {
        self.bands.iter().rev().find(|band| value > band.above)
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn max_score(&self) -> u32 {
        self.bands
            .iter()
            .map(|band| band.score)
            .fold(self.floor, u32::max)
    }
}

impl TryFrom<ThresholdTableDef> for ThresholdTable {
    type Error = ScoreError;

    fn try_from(def: ThresholdTableDef) -> Result<Self> {
        let bands = def
            .bands
            .into_iter()
            .map(|(above, score)| Band { above, score })
            .collect();
        ThresholdTable::new(def.floor, bands)
    }
}

impl From<ThresholdTable> for ThresholdTableDef {
    fn from(table: ThresholdTable) -> Self {
        Self {
            floor: table.floor,
            bands: table
                .bands
                .into_iter()
                .map(|band| (band.above, band.score))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_table_boundaries() {
        let table = ThresholdTable::amount_default();
        assert_eq!(table.lookup(i64::MIN), 10);
        assert_eq!(table.lookup(100), 10);
        assert_eq!(table.lookup(20_000), 10);
        assert_eq!(table.lookup(20_001), 25);
        assert_eq!(table.lookup(50_000), 25);
        assert_eq!(table.lookup(50_001), 40);
        assert_eq!(table.lookup(i64::MAX), 40);
    }

    #[test]
    fn test_frequency_table_boundaries() {
        let table = ThresholdTable::frequency_default();
        assert_eq!(table.lookup(-3), 0);
        assert_eq!(table.lookup(5), 0);
        assert_eq!(table.lookup(6), 15);
        assert_eq!(table.lookup(10), 15);
        assert_eq!(table.lookup(11), 30);
    }

    #[test]
    fn test_matching_band() {
        let table = ThresholdTable::amount_default();
        assert!(table.matching_band(1_000).is_none());
        assert_eq!(table.matching_band(30_000).map(|b| b.above), Some(20_000));
        assert_eq!(table.max_score(), 40);
    }

    #[test]
    fn test_unordered_bands_are_rejected() {
        let result = ThresholdTable::new(
            0,
            vec![Band { above: 10, score: 30 }, Band { above: 5, score: 15 }],
        );
        assert!(matches!(result, Err(ScoreError::ConfigValidationError { .. })));

        let duplicate = ThresholdTable::new(
            0,
            vec![Band { above: 5, score: 15 }, Band { above: 5, score: 30 }],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            amount: ThresholdTable,
        }

        let parsed: Wrapper =
            toml::from_str("amount = { floor = 10, bands = [[20000, 25], [50000, 40]] }").unwrap();
        assert_eq!(parsed.amount, ThresholdTable::amount_default());

        let bad = toml::from_str::<Wrapper>("amount = { floor = 0, bands = [[9, 1], [3, 2]] }");
        assert!(bad.is_err());
    }
}
