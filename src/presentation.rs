//! Text and JSON rendering of an assessment, the way the dashboard shows it:
//! a probability metric, a status line and an explainable breakdown.

use crate::core::scorer::ScoringPolicy;
use crate::core::threshold::ThresholdTable;
use crate::domain::model::{Decision, FraudAssessment, LocationRisk, Transaction};
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt::Write;

/// One line of the breakdown: which rule fired and what it contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreFactor {
    pub name: &'static str,
    pub rule: String,
    pub score: u32,
}

#[derive(Debug, Serialize)]
struct AssessmentView<'a> {
    transaction: &'a Transaction,
    fraud_probability: u32,
    decision: Decision,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    advisory: Option<&'static str>,
    breakdown: Vec<ScoreFactor>,
}

pub fn metric_line(assessment: &FraudAssessment) -> String {
    format!("AI Fraud Probability: {}%", assessment.probability)
}

fn describe_band(label: &str, value: i64, table: &ThresholdTable) -> String {
    match table.matching_band(value) {
        Some(band) => format!("{} {} > {}", label, value, band.above),
        None => match table.bands().first() {
            Some(lowest) => format!("{} {} <= {}", label, value, lowest.above),
            None => format!("{} {}", label, value),
        },
    }
}

pub fn breakdown(
    policy: &ScoringPolicy,
    transaction: &Transaction,
    assessment: &FraudAssessment,
) -> Vec<ScoreFactor> {
    vec![
        ScoreFactor {
            name: "amount",
            rule: describe_band("amount", transaction.amount, &policy.amount),
            score: assessment.components.amount,
        },
        ScoreFactor {
            name: "location",
            rule: format!("location {}", transaction.location),
            score: assessment.components.location,
        },
        ScoreFactor {
            name: "frequency",
            rule: describe_band("frequency", transaction.frequency, &policy.frequency),
            score: assessment.components.frequency,
        },
    ]
}

pub fn render_text(
    policy: &ScoringPolicy,
    transaction: &Transaction,
    assessment: &FraudAssessment,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", metric_line(assessment));
    let _ = writeln!(out, "{}", assessment.decision.status_message());
    if let Some(advisory) = assessment.decision.advisory() {
        let _ = writeln!(out, "⚠️ {}", advisory);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Breakdown:");
    for factor in breakdown(policy, transaction, assessment) {
        let _ = writeln!(out, "  {:<28} +{}", factor.rule, factor.score);
    }

    let sum = assessment.components.sum();
    if sum > assessment.probability {
        let _ = writeln!(out, "  (sum {} capped at {})", sum, policy.ceiling);
    }
    let _ = writeln!(out, "  Block threshold: {}%", policy.block_threshold);

    out
}

pub fn render_json(
    policy: &ScoringPolicy,
    transaction: &Transaction,
    assessment: &FraudAssessment,
) -> Result<String> {
    let view = AssessmentView {
        transaction,
        fraud_probability: assessment.probability,
        decision: assessment.decision,
        status: assessment.decision.status_message(),
        advisory: assessment.decision.advisory(),
        breakdown: breakdown(policy, transaction, assessment),
    };

    Ok(serde_json::to_string_pretty(&view)?)
}

fn write_table(out: &mut String, title: &str, table: &ThresholdTable) {
    let _ = writeln!(out, "{}:", title);
    for band in table.bands().iter().rev() {
        let _ = writeln!(out, "  > {:<10} {:>4}", band.above, band.score);
    }
    let _ = writeln!(out, "  otherwise    {:>4}", table.floor());
}

pub fn render_rule_table(policy: &ScoringPolicy) -> String {
    let mut out = String::new();

    write_table(&mut out, "Amount (₹)", &policy.amount);
    let _ = writeln!(out, "Location:");
    for location in LocationRisk::ALL {
        let _ = writeln!(out, "  {:<18} {:>4}", location.label(), policy.location.score(location));
    }
    write_table(&mut out, "Transactions in last hour", &policy.frequency);
    let _ = writeln!(
        out,
        "Fraud probability = min(sum, {}); blocked when >= {}",
        policy.ceiling, policy.block_threshold
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scorer::RiskScorer;

    fn assess(tx: &Transaction) -> (ScoringPolicy, FraudAssessment) {
        let scorer = RiskScorer::default();
        (scorer.policy().clone(), scorer.score(tx))
    }

    #[test]
    fn test_blocked_text_has_advisory() {
        let tx = Transaction::new(25_000, LocationRisk::DifferentCity, 6);
        let (policy, assessment) = assess(&tx);
        let text = render_text(&policy, &tx, &assessment);

        assert!(text.starts_with("AI Fraud Probability: 60%\n"));
        assert!(text.contains("Transaction Blocked (Fraud Detected)"));
        assert!(text.contains("Potential Financial Loss Prevented"));
        assert!(text.contains("amount 25000 > 20000"));
        assert!(text.contains("frequency 6 > 5"));
    }

    #[test]
    fn test_approved_text_has_no_advisory() {
        let tx = Transaction::default();
        let (policy, assessment) = assess(&tx);
        let text = render_text(&policy, &tx, &assessment);

        assert!(text.contains("AI Fraud Probability: 10%"));
        assert!(text.contains("Transaction Approved (Legitimate)"));
        assert!(!text.contains("Potential Financial Loss Prevented"));
        assert!(text.contains("amount 5000 <= 20000"));
    }

    #[test]
    fn test_capped_sum_is_reported() {
        let tx = Transaction::new(60_000, LocationRisk::DifferentCountry, 12);
        let (policy, assessment) = assess(&tx);
        let text = render_text(&policy, &tx, &assessment);
        assert!(text.contains("(sum 110 capped at 100)"));
    }

    #[test]
    fn test_json_view() {
        let tx = Transaction::new(60_000, LocationRisk::DifferentCountry, 12).with_id("tx-9");
        let (policy, assessment) = assess(&tx);
        let json: serde_json::Value =
            serde_json::from_str(&render_json(&policy, &tx, &assessment).unwrap()).unwrap();

        assert_eq!(json["fraud_probability"], 100);
        assert_eq!(json["decision"], "blocked");
        assert_eq!(json["transaction"]["id"], "tx-9");
        assert_eq!(json["transaction"]["location"], "Different Country");
        assert_eq!(json["breakdown"].as_array().map(|b| b.len()), Some(3));
        assert_eq!(json["advisory"], "Potential Financial Loss Prevented");
    }

    #[test]
    fn test_rule_table_lists_every_rule() {
        let table = render_rule_table(&ScoringPolicy::default());
        assert!(table.contains("> 50000"));
        assert!(table.contains("Different Country"));
        assert!(table.contains("blocked when >= 60"));
    }
}
