use crate::answers::{AnswerValue, Answers, ValidationError, ValidationResult, format_number};
use crate::questionnaire::{CompiledField, Questionnaire};
use crate::spec::field::FieldType;
use crate::visibility::resolve_visibility;

/// Validates every visible field and gathers one message per failing field.
///
/// Hidden fields are skipped entirely. Answers without a matching field are
/// listed in `unknown_fields` but do not make the result invalid.
pub fn validate(questionnaire: &Questionnaire, answers: &Answers) -> ValidationResult {
    let visibility = resolve_visibility(questionnaire, answers);

    let errors: Vec<ValidationError> = questionnaire
        .fields()
        .iter()
        .filter(|field| visibility.get(field.key()).copied().unwrap_or(true))
        .filter_map(|field| {
            validate_field(field, answers.get(field.key())).map(|message| ValidationError {
                field_key: field.key().to_string(),
                message,
            })
        })
        .collect();

    let unknown_fields = answers
        .keys()
        .filter(|key| !questionnaire.contains(key))
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        unknown_fields,
    }
}

/// Checks one answer against its field and returns the first failure.
///
/// The required check runs first; an absent optional answer passes without
/// further checks. Type checks follow the field's declared type.
pub fn validate_field(field: &CompiledField, value: Option<&AnswerValue>) -> Option<String> {
    let spec = field.spec();
    let custom = field
        .rules()
        .and_then(|rules| rules.custom_message.as_deref());
    let fail = |generated: String| Some(custom.map(str::to_string).unwrap_or(generated));

    let value = match value {
        Some(value) if !value.is_empty() => value,
        _ if spec.required => return fail(format!("{} is required", spec.label)),
        _ => return None,
    };

    let rules = field.rules()?;
    let label = &spec.label;

    match spec.kind {
        FieldType::Text => {
            let text = value.to_display();
            let length = text.chars().count();
            if let Some(min) = rules.min_length
                && length < min
            {
                return fail(format!("{label} must be at least {min} characters"));
            }
            if let Some(max) = rules.max_length
                && length > max
            {
                return fail(format!("{label} must be at most {max} characters"));
            }
            if let Some(pattern) = field.pattern()
                && !pattern.is_match(&text)
            {
                return fail(format!("{label} has an invalid format"));
            }
        }
        FieldType::Number => {
            let number = value.to_number();
            if let Some(min) = rules.min
                && number < min
            {
                return fail(format!("{label} must not be less than {}", format_number(min)));
            }
            if let Some(max) = rules.max
                && number > max
            {
                return fail(format!(
                    "{label} must not be greater than {}",
                    format_number(max)
                ));
            }
        }
        FieldType::Date => {
            let date = value.to_display();
            if let Some(min) = rules.min_date.as_deref().filter(|min| !min.is_empty())
                && date.as_str() < min
            {
                return fail(format!("{label} must not be earlier than {min}"));
            }
            if let Some(max) = rules.max_date.as_deref().filter(|max| !max.is_empty())
                && date.as_str() > max
            {
                return fail(format!("{label} must not be later than {max}"));
            }
        }
        FieldType::MultiChoice => {
            if let AnswerValue::Choices(selected) = value {
                if let Some(min) = rules.min_select
                    && selected.len() < min
                {
                    return fail(format!("{label} needs at least {min} selections"));
                }
                if let Some(max) = rules.max_select
                    && selected.len() > max
                {
                    return fail(format!("{label} allows at most {max} selections"));
                }
            }
        }
        FieldType::SingleChoice | FieldType::Dropdown => {}
    }

    None
}
