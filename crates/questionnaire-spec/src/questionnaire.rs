use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::expr::{ConditionOperator, ConditionValue, ConditionalLogic};
use crate::spec::field::{Field, ValidationRules};
use crate::spec::schema::{FieldGroup, QuestionnaireSchema};

/// Authoring defects that prevent a schema from loading.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse questionnaire schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("field #{index} has an empty key")]
    EmptyFieldKey { index: usize },
    #[error("field key '{0}' is used more than once")]
    DuplicateFieldKey(String),
    #[error("field '{field}' has an invalid pattern: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
    #[error("field '{field}' has {lower} greater than {upper}")]
    InvertedBounds {
        field: String,
        lower: &'static str,
        upper: &'static str,
    },
    #[error("group '{group}' references unknown field '{field}'")]
    UnknownGroupField { group: String, field: String },
}

/// A field whose pattern has been compiled once at load time.
#[derive(Debug, Clone)]
pub struct CompiledField {
    field: Field,
    pattern: Option<Regex>,
}

impl CompiledField {
    pub fn compile(field: Field) -> Result<Self, SchemaError> {
        let rules = field.validation_rules.as_ref();
        if let Some(rules) = rules {
            check_bounds(&field.key, rules)?;
        }
        let pattern = rules
            .and_then(|rules| rules.pattern.as_deref())
            .filter(|pattern| !pattern.is_empty())
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
                    field: field.key.clone(),
                    source,
                })
            })
            .transpose()?;
        Ok(Self { field, pattern })
    }

    pub fn spec(&self) -> &Field {
        &self.field
    }

    pub fn key(&self) -> &str {
        &self.field.key
    }

    pub fn label(&self) -> &str {
        &self.field.label
    }

    pub fn rules(&self) -> Option<&ValidationRules> {
        self.field.validation_rules.as_ref()
    }

    pub fn logic(&self) -> Option<&ConditionalLogic> {
        self.field.conditional_logic.as_ref()
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }
}

/// Loaded questionnaire, ready for visibility and validation passes.
#[derive(Debug, Clone)]
pub struct Questionnaire {
    fields: Vec<CompiledField>,
    index: BTreeMap<String, usize>,
    groups: Vec<FieldGroup>,
}

impl Questionnaire {
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let schema: QuestionnaireSchema = serde_json::from_str(json)?;
        Self::compile(schema)
    }

    pub fn compile(schema: QuestionnaireSchema) -> Result<Self, SchemaError> {
        let QuestionnaireSchema { mut groups, fields } = schema;

        let mut index = BTreeMap::new();
        let mut compiled = Vec::with_capacity(fields.len());
        for (position, field) in fields.into_iter().enumerate() {
            if field.key.trim().is_empty() {
                return Err(SchemaError::EmptyFieldKey { index: position });
            }
            if index.insert(field.key.clone(), position).is_some() {
                return Err(SchemaError::DuplicateFieldKey(field.key));
            }
            compiled.push(CompiledField::compile(field)?);
        }

        for group in &groups {
            if let Some(unknown) = group.fields.iter().find(|key| !index.contains_key(*key)) {
                return Err(SchemaError::UnknownGroupField {
                    group: group.name.clone(),
                    field: unknown.clone(),
                });
            }
        }
        groups.sort_by_key(|group| group.sort_order);

        let questionnaire = Self {
            fields: compiled,
            index,
            groups,
        };
        questionnaire.warn_on_smells();
        debug!(
            fields = questionnaire.fields.len(),
            groups = questionnaire.groups.len(),
            "compiled questionnaire schema"
        );
        Ok(questionnaire)
    }

    /// Fields in schema order.
    pub fn fields(&self) -> &[CompiledField] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&CompiledField> {
        self.index.get(key).map(|position| &self.fields[*position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Groups ordered by `sort_order`.
    pub fn groups(&self) -> &[FieldGroup] {
        &self.groups
    }

    /// Fields not claimed by any group, in schema order.
    pub fn ungrouped_fields(&self) -> Vec<&CompiledField> {
        let grouped: BTreeSet<&str> = self
            .groups
            .iter()
            .flat_map(|group| group.fields.iter().map(String::as_str))
            .collect();
        self.fields
            .iter()
            .filter(|field| !grouped.contains(field.key()))
            .collect()
    }

    fn warn_on_smells(&self) {
        for field in &self.fields {
            if field.spec().kind.is_choice() && field.spec().options().is_empty() {
                warn!(field = field.key(), "choice field declares no options");
            }
            let Some(logic) = field.logic() else {
                continue;
            };
            for condition in &logic.conditions {
                if !self.contains(&condition.field_key) {
                    warn!(
                        field = field.key(),
                        references = condition.field_key.as_str(),
                        "condition references an unknown field"
                    );
                }
                if matches!(
                    condition.operator,
                    ConditionOperator::In | ConditionOperator::NotIn
                ) && matches!(condition.value, ConditionValue::Single(_))
                {
                    warn!(
                        field = field.key(),
                        operator = ?condition.operator,
                        "membership condition has a single value; IN never matches and NOT_IN always matches"
                    );
                }
                if condition.operator == ConditionOperator::Unknown {
                    warn!(field = field.key(), "condition uses an unrecognized operator");
                }
            }
        }
    }
}

fn check_bounds(field: &str, rules: &ValidationRules) -> Result<(), SchemaError> {
    let inverted = |lower: &'static str, upper: &'static str| SchemaError::InvertedBounds {
        field: field.to_string(),
        lower,
        upper,
    };

    if let (Some(min), Some(max)) = (rules.min_length, rules.max_length)
        && min > max
    {
        return Err(inverted("minLength", "maxLength"));
    }
    if let (Some(min), Some(max)) = (rules.min, rules.max)
        && min > max
    {
        return Err(inverted("min", "max"));
    }
    // empty date bounds are unset
    if let (Some(min), Some(max)) = (&rules.min_date, &rules.max_date)
        && !min.is_empty()
        && !max.is_empty()
        && min > max
    {
        return Err(inverted("minDate", "maxDate"));
    }
    if let (Some(min), Some(max)) = (rules.min_select, rules.max_select)
        && min > max
    {
        return Err(inverted("minSelect", "maxSelect"));
    }
    Ok(())
}
