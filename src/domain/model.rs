use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Placeholder rendered for any field the upstream record does not carry.
pub const NOT_APPLICABLE: &str = "N/A";

/// Attribute key holding a control's scored value.
pub const SCORE_ATTRIBUTE: &str = "AttributeFormulaValue.value1_2";

/// One control-implementation entry as returned by the upstream API.
///
/// The payload is kept as opaque JSON; every field access goes through
/// [`ControlRecord::lookup`] so a missing or mistyped field degrades to
/// `None` instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlRecord {
    pub data: Value,
}

impl ControlRecord {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Follows a dotted path (`"control.identifier"`) through nested objects.
    /// `null` at the end of the path is treated as absent.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.data, |current, key| current.as_object()?.get(key))
            .filter(|value| !value.is_null())
    }

    /// Textual form of a scalar field, `None` when absent or not a scalar.
    pub fn text(&self, path: &str) -> Option<String> {
        self.lookup(path).and_then(scalar_text)
    }

    /// Like [`ControlRecord::text`] but falls back to `default`.
    pub fn text_or(&self, path: &str, default: &str) -> String {
        self.text(path).unwrap_or_else(|| default.to_string())
    }

    pub fn identifier(&self) -> Option<String> {
        self.text("control.identifier")
    }

    /// First entry's `value` under `attributes[key]`.
    ///
    /// Attribute keys contain dots, so they are looked up directly on the
    /// `attributes` object rather than through [`ControlRecord::lookup`].
    pub fn attribute_value(&self, key: &str) -> Option<&Value> {
        self.lookup("attributes")?
            .as_object()?
            .get(key)?
            .as_array()?
            .first()?
            .get("value")
            .filter(|value| !value.is_null())
    }

    /// The scored attribute value, or `None` when it is not applicable:
    /// absent, no entries, `null`, the string `"0"`, or numeric zero.
    pub fn applicable_score(&self) -> Option<&Value> {
        self.attribute_value(SCORE_ATTRIBUTE)
            .filter(|value| !is_zero_score(value))
    }
}

fn is_zero_score(value: &Value) -> bool {
    match value {
        Value::String(s) => s == "0",
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

/// Renders a JSON scalar the way it should appear in the report.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// One page of the upstream paginated response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPage {
    #[serde(default)]
    pub content: Option<Vec<ControlRecord>>,
    #[serde(default)]
    pub total_pages: Option<u64>,
}

impl ControlPage {
    /// Missing `totalPages` means the response is the only page.
    pub fn total_pages(&self) -> u64 {
        self.total_pages.unwrap_or(1)
    }

    pub fn into_records(self) -> Vec<ControlRecord> {
        self.content.unwrap_or_default()
    }
}

/// Sorted controls plus the figures derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlReport {
    pub controls: Vec<ControlRecord>,
    pub company_name: String,
    pub average_score: Option<f64>,
}

/// A finished document ready to be returned or stored.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub org_id: String,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub control_count: usize,
}
