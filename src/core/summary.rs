use crate::core::sorter::sort_controls;
use crate::domain::model::{ControlRecord, ControlReport};
use serde_json::Value;

pub const UNKNOWN_COMPANY: &str = "Unknown Company";

/// First org-group name in any record, else the first primary-entity name.
pub fn company_name(records: &[ControlRecord]) -> String {
    first_non_empty(records, "control.orgGroupName")
        .or_else(|| first_non_empty(records, "primaryEntity.name"))
        .unwrap_or_else(|| UNKNOWN_COMPANY.to_string())
}

fn first_non_empty(records: &[ControlRecord], path: &str) -> Option<String> {
    records
        .iter()
        .filter_map(|record| record.text(path))
        .find(|name| !name.trim().is_empty())
}

/// Numeric reading of an applicable score. Strings that are not numbers yield `None`.
pub fn parse_score(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|score| score.is_finite())
}

/// Mean of every applicable, parseable score; `None` when nothing qualifies.
pub fn average_score(records: &[ControlRecord]) -> Option<f64> {
    let scores: Vec<f64> = records
        .iter()
        .filter_map(ControlRecord::applicable_score)
        .filter_map(parse_score)
        .collect();

    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Sorts the records and derives the report's summary figures.
pub fn build_report(records: Vec<ControlRecord>) -> ControlReport {
    let controls = sort_controls(records);
    let company_name = company_name(&controls);
    let average_score = average_score(&controls);

    tracing::debug!(
        "Built report for {} with {} controls (average score: {:?})",
        company_name,
        controls.len(),
        average_score
    );

    ControlReport {
        controls,
        company_name,
        average_score,
    }
}
