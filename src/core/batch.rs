use crate::core::scorer::RiskScorer;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    Amount, BatchResult, Frequency, LocationRisk, RawRecord, RejectedRow, ScoredRecord,
    Transaction,
};
use crate::utils::error::{Result, ScoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

pub const SCORED_FILE: &str = "scored.csv";
pub const SUMMARY_FILE: &str = "summary.json";

const SCORED_HEADERS: [&str; 9] = [
    "id",
    "amount",
    "location",
    "frequency",
    "amount_score",
    "location_score",
    "frequency_score",
    "fraud_probability",
    "decision",
];

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub generated_at: DateTime<Utc>,
    pub input_path: String,
    pub total_rows: usize,
    pub scored: usize,
    pub approved: usize,
    pub blocked: usize,
    pub rejected: usize,
    pub out_of_range: usize,
    /// Percentage of scored rows that were blocked.
    pub block_rate: f64,
    pub mean_probability: f64,
    pub block_threshold: u32,
    pub rejected_rows: Vec<RejectedRow>,
}

impl BatchSummary {
    pub fn from_result(result: &BatchResult, input_path: &str, block_threshold: u32) -> Self {
        let scored = result.scored.len();
        let blocked = result
            .scored
            .iter()
            .filter(|record| record.decision.is_blocked())
            .count();
        let (block_rate, mean_probability) = if scored > 0 {
            let total: u64 = result
                .scored
                .iter()
                .map(|record| u64::from(record.fraud_probability))
                .sum();
            (
                blocked as f64 / scored as f64 * 100.0,
                total as f64 / scored as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            generated_at: Utc::now(),
            input_path: input_path.to_string(),
            total_rows: scored + result.rejected.len(),
            scored,
            approved: scored - blocked,
            blocked,
            rejected: result.rejected.len(),
            out_of_range: result.out_of_range,
            block_rate,
            mean_probability,
            block_threshold,
            rejected_rows: result.rejected.clone(),
        }
    }
}

pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    scorer: RiskScorer,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(storage: S, config: C, scorer: RiskScorer) -> Self {
        Self {
            storage,
            config,
            scorer,
        }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn parse_record(raw: &RawRecord) -> Result<Transaction> {
        if let Some(reason) = &raw.malformed {
            return Err(ScoreError::InvalidTransaction {
                line: raw.line,
                message: reason.clone(),
            });
        }

        let amount = raw
            .amount
            .trim()
            .parse::<Amount>()
            .map_err(|e| ScoreError::InvalidTransaction {
                line: raw.line,
                message: format!("amount '{}': {}", raw.amount, e),
            })?;
        let frequency = raw
            .frequency
            .trim()
            .parse::<Frequency>()
            .map_err(|e| ScoreError::InvalidTransaction {
                line: raw.line,
                message: format!("frequency '{}': {}", raw.frequency, e),
            })?;
        let location: LocationRisk = raw.location.parse()?;

        let mut transaction = Transaction::new(amount, location, frequency);
        transaction.id = raw.id.clone().filter(|id| !id.trim().is_empty());
        Ok(transaction)
    }

    fn write_scored_csv(&self, records: &[ScoredRecord]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        if records.is_empty() {
            writer.write_record(SCORED_HEADERS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }

        writer
            .into_inner()
            .map_err(|e| ScoreError::ProcessingError {
                message: format!("Failed to flush CSV output: {}", e),
            })
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::debug!("Reading transactions from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path())?;

        // flexible: 欄位數不對的列交給 transform 判斷，不讓整批中斷
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(data.as_slice());
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = match row {
                Ok(row) => row,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or_default();
                    records.push(RawRecord::malformed(line, e.to_string()));
                    continue;
                }
            };
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            if row.len() != headers.len() {
                records.push(RawRecord::malformed(
                    line,
                    format!("expected {} fields, found {}", headers.len(), row.len()),
                ));
                continue;
            }

            match row.deserialize::<RawRecord>(Some(&headers)) {
                Ok(mut raw) => {
                    raw.line = line;
                    records.push(raw);
                }
                Err(e) => records.push(RawRecord::malformed(line, e.to_string())),
            }
        }

        Ok(records)
    }

    fn transform(&self, records: Vec<RawRecord>) -> Result<BatchResult> {
        let mut result = BatchResult::default();

        for raw in records {
            let transaction = match Self::parse_record(&raw) {
                Ok(transaction) => transaction,
                Err(e) if self.config.fail_fast() => return Err(e),
                Err(e) => {
                    tracing::warn!("⚠️ Rejected row at line {}: {}", raw.line, e);
                    result.rejected.push(RejectedRow {
                        line: raw.line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if !transaction.is_within_slider_range() {
                tracing::warn!(
                    "⚠️ Line {} is outside the dashboard range (amount={}, frequency={}); scoring anyway",
                    raw.line,
                    transaction.amount,
                    transaction.frequency
                );
                result.out_of_range += 1;
            }

            let assessment = self.scorer.score(&transaction);
            let id = transaction
                .id
                .clone()
                .unwrap_or_else(|| format!("row-{}", raw.line));
            result
                .scored
                .push(ScoredRecord::new(id, &transaction, &assessment));
        }

        Ok(result)
    }

    fn load(&self, result: BatchResult) -> Result<String> {
        let csv_data = self.write_scored_csv(&result.scored)?;
        tracing::debug!("Writing {} ({} bytes)", SCORED_FILE, csv_data.len());
        self.storage
            .write_file(&self.output_file(SCORED_FILE), &csv_data)?;

        let summary = BatchSummary::from_result(
            &result,
            self.config.input_path(),
            self.scorer.policy().block_threshold,
        );
        let json_data = serde_json::to_vec_pretty(&summary)?;
        self.storage
            .write_file(&self.output_file(SUMMARY_FILE), &json_data)?;

        tracing::info!(
            "📊 Scored {} rows: {} approved, {} blocked, {} rejected",
            summary.scored,
            summary.approved,
            summary.blocked,
            summary.rejected
        );

        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Decision;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockStorage {
        files: RefCell<HashMap<String, Vec<u8>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, content: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .borrow_mut()
                .insert(path.to_string(), content.as_bytes().to_vec());
            storage
        }

        fn get_file(&self, path: &str) -> Option<String> {
            self.files
                .borrow()
                .get(path)
                .map(|data| String::from_utf8_lossy(data).into_owned())
        }
    }

    impl Storage for MockStorage {
        fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files.borrow().get(path).cloned().ok_or_else(|| {
                ScoreError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.to_string(),
                ))
            })
        }

        fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .borrow_mut()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct TestConfig {
        fail_fast: bool,
    }

    impl ConfigProvider for TestConfig {
        fn input_path(&self) -> &str {
            "in.csv"
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn fail_fast(&self) -> bool {
            self.fail_fast
        }
    }

    const INPUT: &str = "\
id,amount,location,frequency
tx-1,5000,Same City,3
tx-2,60000,Different Country,12
tx-3,25000,different_city,6
,15000,Different City,4
tx-5,1000,Mars,1
tx-6,abc,Same City,1
";

    fn pipeline(fail_fast: bool) -> BatchPipeline<MockStorage, TestConfig> {
        BatchPipeline::new(
            MockStorage::with_file("in.csv", INPUT),
            TestConfig { fail_fast },
            RiskScorer::default(),
        )
    }

    #[test]
    fn test_extract_reads_rows_with_line_numbers() {
        let records = pipeline(false).extract().unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].id.as_deref(), Some("tx-1"));
        assert_eq!(records[3].id, None);
        assert_eq!(records[4].location, "Mars");
    }

    #[test]
    fn test_transform_scores_and_rejects() {
        let p = pipeline(false);
        let result = p.transform(p.extract().unwrap()).unwrap();

        assert_eq!(result.scored.len(), 4);
        assert_eq!(result.rejected.len(), 2);
        assert_eq!(result.rejected[0].line, 6);
        assert!(result.rejected[0].reason.contains("Mars"));
        assert_eq!(result.rejected[1].line, 7);

        let probabilities: Vec<u32> = result.scored.iter().map(|r| r.fraud_probability).collect();
        assert_eq!(probabilities, vec![10, 100, 60, 30]);
        assert_eq!(result.scored[2].decision, Decision::Blocked);
        assert_eq!(result.scored[3].id, "row-5");
    }

    const SHORT_ROW_INPUT: &str = "\
id,amount,location,frequency
a,5000,Same City,3
b,6000,Same City
c,7000,Different City,2
";

    fn short_row_pipeline(fail_fast: bool) -> BatchPipeline<MockStorage, TestConfig> {
        BatchPipeline::new(
            MockStorage::with_file("in.csv", SHORT_ROW_INPUT),
            TestConfig { fail_fast },
            RiskScorer::default(),
        )
    }

    #[test]
    fn test_transform_rejects_row_with_missing_field() {
        let p = short_row_pipeline(false);
        let records = p.extract().unwrap();
        assert_eq!(records.len(), 3);

        let result = p.transform(records).unwrap();
        assert_eq!(result.scored.len(), 2);
        assert_eq!(result.scored[0].id, "a");
        assert_eq!(result.scored[1].id, "c");
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].line, 3);
        assert!(result.rejected[0].reason.contains("expected 4 fields, found 3"));
    }

    #[test]
    fn test_transform_fail_fast_stops_at_row_with_missing_field() {
        let p = short_row_pipeline(true);
        let err = p.transform(p.extract().unwrap()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidTransaction { line: 3, .. }));
    }

    #[test]
    fn test_transform_rejects_row_with_invalid_utf8() {
        let mut data = b"id,amount,location,frequency\na,5000,Same City,3\nb,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b",Same City,1\nc,7000,Different City,2\n");

        let storage = MockStorage::default();
        storage.write_file("in.csv", &data).unwrap();
        let p = BatchPipeline::new(storage, TestConfig { fail_fast: false }, RiskScorer::default());

        let result = p.transform(p.extract().unwrap()).unwrap();
        assert_eq!(result.scored.len(), 2);
        assert_eq!(result.rejected.len(), 1);
        assert_eq!(result.rejected[0].line, 3);
    }

    #[test]
    fn test_transform_fail_fast_surfaces_invalid_location() {
        let p = pipeline(true);
        let err = p.transform(p.extract().unwrap()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidLocationRisk { ref value } if value == "Mars"));
    }

    #[test]
    fn test_out_of_range_rows_are_scored() {
        let p = BatchPipeline::new(
            MockStorage::with_file("in.csv", "id,amount,location,frequency\na,999999,Same City,50\n"),
            TestConfig { fail_fast: true },
            RiskScorer::default(),
        );
        let result = p.transform(p.extract().unwrap()).unwrap();
        assert_eq!(result.out_of_range, 1);
        assert_eq!(result.scored[0].fraud_probability, 70);
    }

    #[test]
    fn test_load_writes_csv_and_summary() {
        let p = pipeline(false);
        let result = p.transform(p.extract().unwrap()).unwrap();
        let output = p.load(result).unwrap();
        assert_eq!(output, "out");

        let csv = p.storage.get_file("out/scored.csv").unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(SCORED_HEADERS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("tx-1,5000,Same City,3,10,0,0,10,approved")
        );
        assert!(csv.contains("tx-2,60000,Different Country,12,40,40,30,100,blocked"));

        let summary: serde_json::Value =
            serde_json::from_str(&p.storage.get_file("out/summary.json").unwrap()).unwrap();
        assert_eq!(summary["total_rows"], 6);
        assert_eq!(summary["scored"], 4);
        assert_eq!(summary["blocked"], 2);
        assert_eq!(summary["approved"], 2);
        assert_eq!(summary["rejected"], 2);
        assert_eq!(summary["block_rate"], 50.0);
        assert_eq!(summary["mean_probability"], 50.0);
    }

    #[test]
    fn test_load_empty_batch_still_writes_header() {
        let p = pipeline(false);
        p.load(BatchResult::default()).unwrap();
        let csv = p.storage.get_file("out/scored.csv").unwrap();
        assert_eq!(csv.trim_end(), SCORED_HEADERS.join(","));
    }
}
