use serde_json::{Map, Value, json};

use crate::{
    answers::{AnswerValue, Answers},
    questionnaire::{CompiledField, Questionnaire},
    spec::field::{FieldOption, FieldType},
    validate::validate,
    visibility::resolve_visibility,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// A visible required field is still unanswered.
    NeedInput,
    /// Every required field is answered but some answers fail validation.
    Invalid,
    /// The answers may be submitted.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Invalid => "invalid",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Progress counters over visible fields.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    pub answered: usize,
    pub total: usize,
}

/// Describes a single field for render outputs.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub key: String,
    pub label: String,
    pub kind: FieldType,
    pub required: bool,
    pub visible: bool,
    pub current_value: Option<AnswerValue>,
    pub error: Option<String>,
    pub options: Vec<FieldOption>,
}

/// A named section of fields; `name` is `None` for ungrouped fields.
#[derive(Debug, Clone)]
pub struct RenderGroup {
    pub name: Option<String>,
    pub fields: Vec<RenderField>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub status: RenderStatus,
    pub progress: RenderProgress,
    pub groups: Vec<RenderGroup>,
}

impl RenderPayload {
    pub fn fields(&self) -> impl Iterator<Item = &RenderField> {
        self.groups.iter().flat_map(|group| group.fields.iter())
    }
}

/// Build the renderer payload from the questionnaire and the live answers.
pub fn build_render_payload(questionnaire: &Questionnaire, answers: &Answers) -> RenderPayload {
    let visibility = resolve_visibility(questionnaire, answers);
    let result = validate(questionnaire, answers);

    let render_field = |field: &CompiledField| {
        let spec = field.spec();
        RenderField {
            key: spec.key.clone(),
            label: spec.label.clone(),
            kind: spec.kind,
            required: spec.required,
            visible: visibility.get(field.key()).copied().unwrap_or(true),
            current_value: answers.get(field.key()).cloned(),
            error: result.error_for(field.key()).map(str::to_string),
            options: spec.options().to_vec(),
        }
    };

    let mut groups: Vec<RenderGroup> = questionnaire
        .groups()
        .iter()
        .map(|group| RenderGroup {
            name: Some(group.name.clone()),
            fields: group
                .fields
                .iter()
                .filter_map(|key| questionnaire.field(key))
                .map(render_field)
                .collect(),
        })
        .collect();
    let ungrouped = questionnaire.ungrouped_fields();
    if !ungrouped.is_empty() {
        groups.push(RenderGroup {
            name: None,
            fields: ungrouped.into_iter().map(render_field).collect(),
        });
    }

    let visible = questionnaire
        .fields()
        .iter()
        .filter(|field| visibility.get(field.key()).copied().unwrap_or(true));
    let total = visible.clone().count();
    let answered = visible
        .clone()
        .filter(|field| answers.get(field.key()).is_some_and(|value| !value.is_empty()))
        .count();
    let missing_required = visible.clone().any(|field| {
        field.spec().required && answers.get(field.key()).is_none_or(AnswerValue::is_empty)
    });

    let status = if result.valid {
        RenderStatus::Complete
    } else if missing_required {
        RenderStatus::NeedInput
    } else {
        RenderStatus::Invalid
    };

    RenderPayload {
        status,
        progress: RenderProgress { answered, total },
        groups,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let groups = payload
        .groups
        .iter()
        .map(|group| {
            let fields = group
                .fields
                .iter()
                .map(|field| {
                    let mut map = Map::new();
                    map.insert("key".into(), Value::String(field.key.clone()));
                    map.insert("label".into(), Value::String(field.label.clone()));
                    map.insert("type".into(), Value::String(field.kind.as_str().into()));
                    map.insert("required".into(), Value::Bool(field.required));
                    map.insert("visible".into(), Value::Bool(field.visible));
                    if let Some(value) = &field.current_value {
                        map.insert(
                            "current_value".into(),
                            serde_json::to_value(value).unwrap_or(Value::Null),
                        );
                    }
                    if let Some(error) = &field.error {
                        map.insert("error".into(), Value::String(error.clone()));
                    }
                    if !field.options.is_empty() {
                        map.insert(
                            "options".into(),
                            Value::Array(
                                field
                                    .options
                                    .iter()
                                    .map(|option| {
                                        json!({ "value": option.value, "label": option.label })
                                    })
                                    .collect(),
                            ),
                        );
                    }
                    Value::Object(map)
                })
                .collect::<Vec<_>>();
            json!({ "name": group.name, "fields": fields })
        })
        .collect::<Vec<_>>();

    json!({
        "status": payload.status.as_str(),
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "groups": groups,
    })
}

/// Render the payload as human-friendly text, listing visible fields only.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));

    for group in &payload.groups {
        let visible: Vec<_> = group.fields.iter().filter(|field| field.visible).collect();
        if visible.is_empty() {
            continue;
        }
        lines.push(match &group.name {
            Some(name) => format!("[{}]", name),
            None => "[Other]".to_string(),
        });
        for field in visible {
            let mut entry = format!(" - {} ({})", field.label, field.key);
            if field.required {
                entry.push_str(" [required]");
            }
            if let Some(value) = &field.current_value {
                entry.push_str(&format!(" = {}", value_to_display(field, value)));
            }
            lines.push(entry);
            if let Some(error) = &field.error {
                lines.push(format!("   ! {}", error));
            }
        }
    }

    lines.join("\n")
}

/// Shows option labels instead of raw values where possible.
fn value_to_display(field: &RenderField, value: &AnswerValue) -> String {
    let label_for = |raw: &str| {
        field
            .options
            .iter()
            .find(|option| option.value == raw)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| raw.to_string())
    };
    match value {
        AnswerValue::Choices(items) => items
            .iter()
            .map(|item| label_for(item))
            .collect::<Vec<_>>()
            .join(", "),
        AnswerValue::Text(text) if field.kind.is_choice() => label_for(text),
        other => other.to_display(),
    }
}
