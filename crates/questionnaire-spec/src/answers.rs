use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single answer as bound to a form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Choices(Vec<String>),
}

impl AnswerValue {
    /// `true` for `""` and `[]`; numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::Number(_) => false,
            AnswerValue::Choices(items) => items.is_empty(),
        }
    }

    /// String form used by equality and substring comparisons.
    pub fn to_display(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Number(number) => format_number(*number),
            AnswerValue::Choices(items) => items.join(","),
        }
    }

    /// Numeric coercion; `NaN` when the value is not a number.
    pub fn to_number(&self) -> f64 {
        match self {
            AnswerValue::Text(text) => coerce_number(text),
            AnswerValue::Number(number) => *number,
            AnswerValue::Choices(items) => coerce_list(items),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Number(value as f64)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        AnswerValue::Choices(value)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(value: Vec<&str>) -> Self {
        AnswerValue::Choices(value.into_iter().map(str::to_string).collect())
    }
}

/// Live answer map keyed by field key. `null` entries are dropped on load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Option<AnswerValue>>",
    into = "BTreeMap<String, AnswerValue>"
)]
pub struct Answers(BTreeMap<String, AnswerValue>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AnswerValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<BTreeMap<String, Option<AnswerValue>>> for Answers {
    fn from(raw: BTreeMap<String, Option<AnswerValue>>) -> Self {
        Self(
            raw.into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
        )
    }
}

impl From<Answers> for BTreeMap<String, AnswerValue> {
    fn from(answers: Answers) -> Self {
        answers.0
    }
}

impl<K, V> FromIterator<(K, V)> for Answers
where
    K: Into<String>,
    V: Into<AnswerValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Validation failure reported for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub field_key: String,
    pub message: String,
}

/// Result returned from `validate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    /// Answer keys with no matching field. Reported, never blocking.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<String>,
}

impl ValidationResult {
    /// Errors keyed by field, the shape form hosts bind to inputs.
    pub fn error_map(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|error| (error.field_key.clone(), error.message.clone()))
            .collect()
    }

    pub fn error_for(&self, field_key: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field_key == field_key)
            .map(|error| error.message.as_str())
    }
}

/// Formats a number the way form inputs echo it back: `5`, `2.5`, `1e+21`.
///
/// Magnitudes from `1e-6` up to `1e21` print in plain decimal; everything
/// else uses exponent form with an explicit exponent sign.
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        // drops the sign of -0
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if (1e-6..1e21).contains(&value.abs()) {
        return value.to_string();
    }
    let exponent = format!("{:e}", value);
    match exponent.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exponent,
    }
}

/// Text to number: blank is `0`, anything unparsable is `NaN`.
///
/// Accepts decimal and exponent notation, unsigned `0x`/`0o`/`0b` literals
/// and the exact spellings `Infinity`/`-Infinity`. Decimal literals too large
/// for `f64` become infinite.
pub(crate) fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(value) = radix_literal(trimmed) {
        return value;
    }
    let lowered = trimmed.to_ascii_lowercase();
    if lowered.contains("inf") || lowered.contains("nan") {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn radix_literal(text: &str) -> Option<f64> {
    let radix = match text.get(..2)? {
        "0x" | "0X" => 16,
        "0o" | "0O" => 8,
        "0b" | "0B" => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let value = digits.chars().try_fold(0.0, |acc: f64, ch| {
        ch.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    });
    Some(value.unwrap_or(f64::NAN))
}

/// Lists coerce through their single element; `[]` is `0`.
pub(crate) fn coerce_list(items: &[String]) -> f64 {
    match items {
        [] => 0.0,
        [only] => coerce_number(only),
        _ => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_display_without_trailing_fraction() {
        assert_eq!(AnswerValue::Number(5.0).to_display(), "5");
        assert_eq!(AnswerValue::Number(2.5).to_display(), "2.5");
        assert_eq!(AnswerValue::Number(-0.0).to_display(), "0");
    }

    #[test]
    fn extreme_magnitudes_display_in_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e30), "-2.5e+30");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn coercion_follows_form_input_rules() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number(" 42 "), 42.0);
        assert!(coerce_number("abc").is_nan());
        assert!(coerce_number("inf").is_nan());
        assert!(coerce_number("-infinity").is_nan());
        assert!(coerce_number("NaN").is_nan());
        assert_eq!(coerce_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(coerce_list(&["7".to_string()]), 7.0);
        assert!(coerce_list(&["1".to_string(), "2".to_string()]).is_nan());
    }

    #[test]
    fn radix_literals_and_overflow_coerce() {
        assert_eq!(coerce_number("0x10"), 16.0);
        assert_eq!(coerce_number("0XfF"), 255.0);
        assert_eq!(coerce_number("0o17"), 15.0);
        assert_eq!(coerce_number("0b101"), 5.0);
        assert!(coerce_number("-0x10").is_nan());
        assert!(coerce_number("0x").is_nan());
        assert!(coerce_number("0x1g").is_nan());
        assert!(coerce_number("0x+1").is_nan());
        assert_eq!(coerce_number("1e400"), f64::INFINITY);
        assert_eq!(coerce_number("-1e400"), f64::NEG_INFINITY);
    }

    #[test]
    fn null_answers_are_dropped() {
        let answers: Answers =
            serde_json::from_str(r#"{"a": null, "b": "x", "c": 3, "d": ["p", "q"]}"#)
                .expect("deserialize");
        assert!(!answers.contains_key("a"));
        assert_eq!(answers.get("b"), Some(&AnswerValue::Text("x".into())));
        assert_eq!(answers.get("c"), Some(&AnswerValue::Number(3.0)));
        assert_eq!(answers.len(), 3);
    }
}
