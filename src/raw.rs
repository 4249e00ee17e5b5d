//! Raw metrics documents.
//!
//! Accepts the loosely-typed JSON produced by the backend. Field names vary
//! across schema versions (a twin-state summary says `averageStress`, a
//! report may say `stressLevel`), so nothing here is required.

use crate::error::{MindtwinError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Raw metrics document.
///
/// Example JSON:
/// ```json
/// {
///   "averageStress": 6.5,
///   "emotionalStability": 7.0,
///   "cognitiveLoadAvg": 4.2,
///   "energyTrend": [5.0, 4.5, 6.0],
///   "flagsFromReports": ["sleep"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawMetrics {
    fields: Map<String, Value>,
}

impl RawMetrics {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON string. The top level must be an object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Wrap an already-parsed JSON value. The value must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(MindtwinError::MalformedDocument(format!(
                "expected object, got {}",
                kind_of(&other)
            ))),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.fields)?)
    }

    /// Builder: set a numeric field. Non-finite values are stored as `null`.
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// Builder: set a numeric sequence field.
    pub fn with_sequence(mut self, key: &str, values: &[f64]) -> Self {
        let seq = values.iter().map(|v| number_or_null(*v)).collect();
        self.fields.insert(key.to_string(), Value::Array(seq));
        self
    }

    /// Builder: set an arbitrary JSON value.
    pub fn with_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Set a numeric field in place.
    pub fn set(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_string(), number_or_null(value));
    }

    /// Numeric value of `key`, or `None` when absent, null, non-numeric or NaN.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(as_number)
    }

    /// First element of the sequence `key`, if it exists and is numeric.
    pub fn first_of(&self, key: &str) -> Option<f64> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items.first().and_then(as_number),
            _ => None,
        }
    }

    /// Whether the document has any value (even null) under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge `other` into `self`; keys present in `other` win.
    pub fn overlay(&mut self, other: &RawMetrics) {
        for (k, v) in &other.fields {
            self.fields.insert(k.clone(), v.clone());
        }
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume into the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for RawMetrics {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| !v.is_nan())
}

fn number_or_null(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_metrics_empty() {
        let raw = RawMetrics::new();
        assert!(raw.is_empty());
        assert_eq!(raw.number("stressLevel"), None);
        assert_eq!(raw.first_of("energyTrend"), None);
    }

    #[test]
    fn test_builder() {
        let raw = RawMetrics::new()
            .with("stressLevel", 0.0)
            .with("averageStress", 8.0)
            .with_sequence("energyTrend", &[3.0, 4.0]);

        assert_eq!(raw.len(), 3);
        assert_eq!(raw.number("stressLevel"), Some(0.0));
        assert_eq!(raw.number("averageStress"), Some(8.0));
        assert_eq!(raw.first_of("energyTrend"), Some(3.0));
    }

    #[test]
    fn test_non_finite_stored_as_null() {
        let raw = RawMetrics::new().with("stressLevel", f64::NAN);
        assert!(raw.contains("stressLevel"));
        assert_eq!(raw.number("stressLevel"), None);
    }

    #[test]
    fn test_non_numeric_is_absent() {
        let raw = RawMetrics::new()
            .with_value("stressLevel", json!("high"))
            .with_value("energyLevel", Value::Null)
            .with_value("cognitiveLoad", json!(true));

        assert_eq!(raw.number("stressLevel"), None);
        assert_eq!(raw.number("energyLevel"), None);
        assert_eq!(raw.number("cognitiveLoad"), None);
    }

    #[test]
    fn test_first_of_edge_cases() {
        let raw = RawMetrics::new()
            .with_value("empty", json!([]))
            .with_value("strings", json!(["a", 1.0]))
            .with_value("scalar", json!(4.0));

        assert_eq!(raw.first_of("empty"), None);
        assert_eq!(raw.first_of("strings"), None);
        assert_eq!(raw.first_of("scalar"), None);
    }

    #[test]
    fn test_json_parsing() {
        let json = r#"{
            "patientId": "p-1",
            "averageStress": 6.5,
            "emotionalStability": 7,
            "energyTrend": [5.0, 4.5],
            "learningTrend": {"focus": "up"}
        }"#;

        let raw = RawMetrics::from_json(json).unwrap();
        assert_eq!(raw.number("averageStress"), Some(6.5));
        assert_eq!(raw.number("emotionalStability"), Some(7.0));
        assert_eq!(raw.first_of("energyTrend"), Some(5.0));
        assert_eq!(raw.number("patientId"), None);
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(
            RawMetrics::from_json("[1, 2]"),
            Err(MindtwinError::MalformedDocument(_))
        ));
        assert!(matches!(
            RawMetrics::from_json("not json"),
            Err(MindtwinError::Json(_))
        ));
    }

    #[test]
    fn test_overlay_prefers_other() {
        let mut base = RawMetrics::new().with("averageStress", 3.0).with("cognitiveLoadAvg", 2.0);
        let top = RawMetrics::new().with("averageStress", 9.0);
        base.overlay(&top);

        assert_eq!(base.number("averageStress"), Some(9.0));
        assert_eq!(base.number("cognitiveLoadAvg"), Some(2.0));
    }
}
