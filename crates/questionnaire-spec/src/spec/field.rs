use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::expr::ConditionalLogic;

/// Supported field input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Number,
    SingleChoice,
    MultiChoice,
    Dropdown,
    Date,
}

impl FieldType {
    /// Wire label used by the designer.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Number => "NUMBER",
            FieldType::SingleChoice => "SINGLE_CHOICE",
            FieldType::MultiChoice => "MULTI_CHOICE",
            FieldType::Dropdown => "DROPDOWN",
            FieldType::Date => "DATE",
        }
    }

    /// Whether answers are picked from `options`.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldType::SingleChoice | FieldType::MultiChoice | FieldType::Dropdown
        )
    }
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

/// Type-dependent bounds applied to a field's answer.
///
/// Only the bounds matching the field type are consulted; `custom_message`
/// replaces every generated message, the required check included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// ISO `YYYY-MM-DD`, compared lexically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_select: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_select: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_message: Option<String>,
}

/// A single question of a questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub validation_rules: Option<ValidationRules>,
    #[serde(default)]
    pub conditional_logic: Option<ConditionalLogic>,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
}

impl Field {
    /// Creates a field the way the designer palette does: optional, no rules
    /// or logic, and two placeholder options for choice types.
    pub fn new(key: impl Into<String>, kind: FieldType, label: impl Into<String>) -> Self {
        let options = kind.is_choice().then(|| {
            (1..=2)
                .map(|index| FieldOption {
                    value: format!("option{index}"),
                    label: format!("Option {index}"),
                })
                .collect()
        });
        Self {
            key: key.into(),
            kind,
            label: label.into(),
            required: false,
            validation_rules: None,
            conditional_logic: None,
            options,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation_rules = Some(rules);
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    pub fn with_options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        self.options = Some(
            options
                .into_iter()
                .map(|(value, label)| FieldOption {
                    value: value.into(),
                    label: label.into(),
                })
                .collect(),
        );
        self
    }

    /// Options declared on the field, empty when none.
    pub fn options(&self) -> &[FieldOption] {
        self.options.as_deref().unwrap_or_default()
    }
}
