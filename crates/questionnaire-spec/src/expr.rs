use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::answers::{AnswerValue, Answers, coerce_list, coerce_number, format_number};

/// Comparison applied between an answer and a condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    In,
    NotIn,
    /// Any operator this build does not know; never matches.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicAction {
    Show,
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogicOperator {
    And,
    Or,
}

/// Right-hand side of a condition.
///
/// Numbers and booleans in stored schemas deserialize to their string form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum ConditionValue {
    Single(String),
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl RawScalar {
    fn into_text(self) -> String {
        match self {
            RawScalar::Text(text) => text,
            RawScalar::Number(value) => format_number(value),
            RawScalar::Flag(flag) => flag.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConditionValue {
    Single(RawScalar),
    List(Vec<RawScalar>),
}

impl<'de> Deserialize<'de> for ConditionValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawConditionValue::deserialize(deserializer)? {
            RawConditionValue::Single(scalar) => ConditionValue::Single(scalar.into_text()),
            RawConditionValue::List(items) => {
                ConditionValue::List(items.into_iter().map(RawScalar::into_text).collect())
            }
        })
    }
}

impl ConditionValue {
    fn to_display(&self) -> String {
        match self {
            ConditionValue::Single(text) => text.clone(),
            ConditionValue::List(items) => items.join(","),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            ConditionValue::Single(text) => coerce_number(text),
            ConditionValue::List(items) => coerce_list(items),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Single(value.to_string())
    }
}

impl From<Vec<&str>> for ConditionValue {
    fn from(value: Vec<&str>) -> Self {
        ConditionValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Test of one other field's current answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field_key: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(
        field_key: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            field_key: field_key.into(),
            operator,
            value: value.into(),
        }
    }

    /// Evaluates the condition against the live answers.
    ///
    /// A missing answer compares as `""` for string operators and as `NaN`
    /// for numeric ones, so it never passes a numeric threshold.
    pub fn evaluate(&self, answers: &Answers) -> bool {
        let answer = answers.get(&self.field_key);
        let expected = &self.value;

        match self.operator {
            ConditionOperator::Equals => display(answer) == expected.to_display(),
            ConditionOperator::NotEquals => display(answer) != expected.to_display(),
            ConditionOperator::Contains => {
                let needle = expected.to_display();
                match answer {
                    Some(AnswerValue::Choices(items)) => items.iter().any(|item| *item == needle),
                    other => display(other).contains(&needle),
                }
            }
            ConditionOperator::GreaterThan => number(answer) > expected.to_number(),
            ConditionOperator::LessThan => number(answer) < expected.to_number(),
            ConditionOperator::In => match expected {
                ConditionValue::List(items) => items.contains(&display(answer)),
                ConditionValue::Single(_) => false,
            },
            ConditionOperator::NotIn => match expected {
                ConditionValue::List(items) => !items.contains(&display(answer)),
                ConditionValue::Single(_) => true,
            },
            ConditionOperator::Unknown => false,
        }
    }
}

/// Show/hide rule attached to a field.
///
/// Rules are single-level: conditions read other fields' raw answers, never
/// their visibility, so a hidden field's answer still drives its dependents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalLogic {
    pub action: LogicAction,
    pub logic_operator: LogicOperator,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ConditionalLogic {
    pub fn show(logic_operator: LogicOperator, conditions: Vec<Condition>) -> Self {
        Self {
            action: LogicAction::Show,
            logic_operator,
            conditions,
        }
    }

    pub fn hide(logic_operator: LogicOperator, conditions: Vec<Condition>) -> Self {
        Self {
            action: LogicAction::Hide,
            logic_operator,
            conditions,
        }
    }

    /// Returns `true` when the owning field should be visible.
    pub fn is_visible(&self, answers: &Answers) -> bool {
        if self.conditions.is_empty() {
            return true;
        }

        let met = match self.logic_operator {
            LogicOperator::And => self
                .conditions
                .iter()
                .all(|condition| condition.evaluate(answers)),
            LogicOperator::Or => self
                .conditions
                .iter()
                .any(|condition| condition.evaluate(answers)),
        };

        match self.action {
            LogicAction::Show => met,
            LogicAction::Hide => !met,
        }
    }
}

pub fn evaluate_condition(condition: &Condition, answers: &Answers) -> bool {
    condition.evaluate(answers)
}

/// Visibility of a field carrying `logic`; no logic means always visible.
pub fn evaluate_conditional_logic(logic: Option<&ConditionalLogic>, answers: &Answers) -> bool {
    logic.is_none_or(|logic| logic.is_visible(answers))
}

fn display(answer: Option<&AnswerValue>) -> String {
    answer.map(AnswerValue::to_display).unwrap_or_default()
}

fn number(answer: Option<&AnswerValue>) -> f64 {
    answer.map_or(f64::NAN, AnswerValue::to_number)
}
