use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::Field;

/// Display group bundling fields under a heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldGroup {
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
    /// Keys of the fields shown in this group.
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Top-level questionnaire definition as stored by the designer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct QuestionnaireSchema {
    #[serde(default)]
    pub groups: Vec<FieldGroup>,
    pub fields: Vec<Field>,
}
