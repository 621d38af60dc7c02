use crate::domain::model::ControlRecord;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid identifier segment: {0:?}")]
pub struct InvalidSegment(pub String);

/// Exact integer value of one identifier segment, whatever its digit count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentValue {
    negative: bool,
    /// ASCII digits without leading zeros; `"0"` for zero.
    magnitude: String,
}

impl SegmentValue {
    pub fn zero() -> Self {
        Self {
            negative: false,
            magnitude: "0".to_string(),
        }
    }
}

impl From<i64> for SegmentValue {
    fn from(value: i64) -> Self {
        Self {
            negative: value < 0,
            magnitude: value.unsigned_abs().to_string(),
        }
    }
}

fn compare_magnitude(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for SegmentValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => compare_magnitude(&self.magnitude, &other.magnitude),
            (true, true) => compare_magnitude(&other.magnitude, &self.magnitude),
        }
    }
}

impl PartialOrd for SegmentValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parses one identifier segment.
///
/// Surrounding whitespace, a leading sign and single underscores between
/// digits are accepted; there is no upper bound on the number of digits.
pub fn parse_segment(segment: &str) -> Result<SegmentValue, InvalidSegment> {
    let invalid = || InvalidSegment(segment.to_string());
    let trimmed = segment.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    if body.is_empty() || body.starts_with('_') || body.ends_with('_') || body.contains("__") {
        return Err(invalid());
    }
    if !body.chars().all(|c| c.is_ascii_digit() || c == '_') {
        return Err(invalid());
    }

    let digits: String = body.chars().filter(|c| *c != '_').collect();
    let magnitude = digits.trim_start_matches('0');
    if magnitude.is_empty() {
        return Ok(SegmentValue::zero());
    }
    Ok(SegmentValue {
        negative,
        magnitude: magnitude.to_string(),
    })
}

/// Integer interpretation of a dotted identifier. Non-numeric segments become `0`.
pub fn sort_key(identifier: &str) -> Vec<SegmentValue> {
    identifier
        .split('.')
        .map(|segment| parse_segment(segment).unwrap_or_else(|_| SegmentValue::zero()))
        .collect()
}

/// Sort key of a record; a record without an identifier sorts as `""`, i.e. `[0]`.
pub fn record_sort_key(record: &ControlRecord) -> Vec<SegmentValue> {
    sort_key(&record.identifier().unwrap_or_default())
}

/// Orders records ascending by identifier. Equal keys keep their arrival order.
pub fn sort_controls(records: Vec<ControlRecord>) -> Vec<ControlRecord> {
    let mut keyed: Vec<(Vec<SegmentValue>, ControlRecord)> = records
        .into_iter()
        .map(|record| (record_sort_key(&record), record))
        .collect();

    // `sort_by` is stable; the key is computed once per record above.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, record)| record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(identifier: &str, tag: &str) -> ControlRecord {
        ControlRecord::new(json!({"control": {"identifier": identifier}, "tag": tag}))
    }

    fn identifiers(records: &[ControlRecord]) -> Vec<String> {
        records
            .iter()
            .map(|r| r.identifier().unwrap_or_default())
            .collect()
    }

    fn key(values: &[i64]) -> Vec<SegmentValue> {
        values.iter().copied().map(SegmentValue::from).collect()
    }

    #[test]
    fn test_sort_key_substitutes_zero() {
        assert_eq!(sort_key("1.2.a"), key(&[1, 2, 0]));
        assert_eq!(sort_key("2.10"), key(&[2, 10]));
        assert_eq!(sort_key(""), key(&[0]));
        assert_eq!(sort_key("A.1"), key(&[0, 1]));
        assert_eq!(sort_key("3..4"), key(&[3, 0, 4]));
    }

    #[test]
    fn test_parse_segment_is_fallible() {
        assert_eq!(parse_segment(" 7 "), Ok(SegmentValue::from(7)));
        assert_eq!(parse_segment("-1"), Ok(SegmentValue::from(-1)));
        assert_eq!(parse_segment("+007"), Ok(SegmentValue::from(7)));
        assert_eq!(parse_segment("1_000"), Ok(SegmentValue::from(1000)));
        assert_eq!(parse_segment("-0"), Ok(SegmentValue::zero()));
        assert!(parse_segment("x").is_err());
        assert!(parse_segment("").is_err());
        assert!(parse_segment("-").is_err());
        assert!(parse_segment("1__0").is_err());
        assert!(parse_segment("_1").is_err());
    }

    #[test]
    fn test_segment_values_order_numerically() {
        let mut values: Vec<SegmentValue> = ["12", "-3", "0", "9", "-20", "100"]
            .iter()
            .map(|s| parse_segment(s).unwrap())
            .collect();
        values.sort();
        assert_eq!(values, key(&[-20, -3, 0, 9, 12, 100]));
    }

    #[test]
    fn test_oversized_segment_sorts_after_smaller_numbers() {
        let sorted = sort_controls(vec![
            record("99999999999999999999.1", "huge"),
            record("5.1", "small"),
            record("100000000000000000000000000000000000000000.1", "huger"),
            record("-99999999999999999999.1", "negative"),
        ]);
        let tags: Vec<_> = sorted
            .iter()
            .map(|r| r.text("tag").unwrap_or_default())
            .collect();
        assert_eq!(tags, vec!["negative", "small", "huge", "huger"]);
    }

    #[test]
    fn test_numeric_not_lexicographic_order() {
        let sorted = sort_controls(vec![
            record("10.1", "a"),
            record("2.1", "b"),
            record("2.10", "c"),
            record("2.2", "d"),
        ]);
        assert_eq!(identifiers(&sorted), vec!["2.1", "2.2", "2.10", "10.1"]);
    }

    #[test]
    fn test_shorter_prefix_sorts_first() {
        let sorted = sort_controls(vec![record("1.1", "a"), record("1", "b"), record("1.0", "c")]);
        assert_eq!(identifiers(&sorted), vec!["1", "1.0", "1.1"]);
    }

    #[test]
    fn test_equal_keys_keep_arrival_order() {
        let sorted = sort_controls(vec![
            record("2.x", "first"),
            record("1", "one"),
            record("2.0", "second"),
            record("2.y", "third"),
        ]);
        let tags: Vec<_> = sorted
            .iter()
            .map(|r| r.text("tag").unwrap_or_default())
            .collect();
        assert_eq!(tags, vec!["one", "first", "second", "third"]);
    }

    #[test]
    fn test_missing_identifier_sorts_as_zero() {
        let sorted = sort_controls(vec![
            record("1", "one"),
            ControlRecord::new(json!({"tag": "none"})),
        ]);
        assert_eq!(sorted[0].text("tag").as_deref(), Some("none"));
    }
}
