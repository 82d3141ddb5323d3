use std::collections::BTreeSet;
use std::io::{self, Write};

use questionnaire_spec::{
    AnswerValue, Answers, CompiledField, FieldType, Questionnaire, resolve_visibility, validate,
    validate_field,
};
use tracing::debug;

use crate::CliResult;

/// Controls which bits of state the wizard prints.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Verbosity {
    /// Clean output: prompts only.
    Clean,
    /// Verbose output: progress, option lists, parse details.
    Verbose,
}

impl Verbosity {
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Clean
        }
    }

    pub fn is_verbose(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}

/// Prints prompts and feedback while the wizard walks the questionnaire.
pub struct WizardPresenter {
    verbosity: Verbosity,
}

impl WizardPresenter {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn show_prompt(&self, prompt: &PromptContext) {
        let mut line = format!("{}/{} {}", prompt.index, prompt.total, prompt.label);
        if prompt.required {
            line.push_str(" *");
        }
        if let Some(hint) = &prompt.hint {
            line.push(' ');
            line.push_str(hint);
        }
        println!("{}", line);
        if let Some(current) = &prompt.current {
            println!("Current answer: {} (blank keeps it)", current);
        }
        if !prompt.options.is_empty() {
            for (position, option) in prompt.options.iter().enumerate() {
                println!("  {}) {}", position + 1, option);
            }
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
        if self.verbosity.is_verbose()
            && let Some(debug) = &error.debug_message
        {
            eprintln!("  Expected: {}", debug);
        }
    }

    pub fn show_validation_error(&self, message: &str) {
        eprintln!("Invalid answer: {}", message);
    }
}

/// Context used to format a single prompt.
pub struct PromptContext {
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub required: bool,
    pub hint: Option<String>,
    pub current: Option<String>,
    pub options: Vec<String>,
}

impl PromptContext {
    fn new(
        field: &CompiledField,
        index: usize,
        total: usize,
        current: Option<&AnswerValue>,
    ) -> Self {
        let spec = field.spec();
        Self {
            index,
            total,
            label: spec.label.clone(),
            required: spec.required,
            hint: kind_hint(spec.kind),
            current: current.map(AnswerValue::to_display),
            options: spec
                .options()
                .iter()
                .map(|option| format!("{} [{}]", option.label, option.value))
                .collect(),
        }
    }
}

fn kind_hint(kind: FieldType) -> Option<String> {
    match kind {
        FieldType::Number => Some("(number)".to_string()),
        FieldType::Date => Some("(YYYY-MM-DD)".to_string()),
        FieldType::MultiChoice => Some("(comma-separated values or numbers)".to_string()),
        FieldType::SingleChoice | FieldType::Dropdown => Some("(value or number)".to_string()),
        FieldType::Text => None,
    }
}

/// Error produced when parsing answers typed by the user.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
    pub debug_message: Option<String>,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>, debug_message: Option<String>) -> Self {
        Self {
            user_message: user_message.into(),
            debug_message,
        }
    }
}

/// Walks visible fields in schema order until every one has been asked.
///
/// Visibility is re-resolved after each answer, so fields revealed by an
/// answer are asked in their schema position on the next pass.
pub fn fill(
    questionnaire: &Questionnaire,
    mut answers: Answers,
    presenter: &WizardPresenter,
) -> CliResult<Answers> {
    let mut asked = BTreeSet::new();

    loop {
        let visibility = resolve_visibility(questionnaire, &answers);
        let visible: Vec<&CompiledField> = questionnaire
            .fields()
            .iter()
            .filter(|field| visibility.get(field.key()).copied().unwrap_or(true))
            .collect();
        let Some((position, field)) = visible
            .iter()
            .enumerate()
            .find(|(_, field)| !asked.contains(field.key()))
        else {
            break;
        };

        let current = answers.get(field.key());
        let prompt = PromptContext::new(field, position + 1, visible.len(), current);
        match prompt_field(field, &prompt, current, presenter)? {
            Some(value) => answers.insert(field.key(), value),
            None => {
                answers.remove(field.key());
            }
        }
        debug!(field = field.key(), "answer accepted");
        asked.insert(field.key().to_string());
    }

    let result = validate(questionnaire, &answers);
    if !result.valid {
        for error in &result.errors {
            presenter.show_validation_error(&format!("{}: {}", error.field_key, error.message));
        }
        return Err("answers failed final validation".into());
    }
    Ok(answers)
}

fn prompt_field(
    field: &CompiledField,
    prompt: &PromptContext,
    current: Option<&AnswerValue>,
    presenter: &WizardPresenter,
) -> CliResult<Option<AnswerValue>> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err("input ended before the questionnaire was complete".into());
        }

        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("wizard aborted by user".into());
        }

        let candidate = if trimmed.is_empty() {
            current.cloned()
        } else {
            match parse_answer(field, trimmed) {
                Ok(value) => Some(value),
                Err(err) => {
                    presenter.show_parse_error(&err);
                    continue;
                }
            }
        };

        match validate_field(field, candidate.as_ref()) {
            None => return Ok(candidate),
            Some(message) => presenter.show_validation_error(&message),
        }
    }
}

/// Converts raw input into an answer of the field's declared type.
pub fn parse_answer(field: &CompiledField, raw: &str) -> Result<AnswerValue, AnswerParseError> {
    match field.spec().kind {
        FieldType::Text => Ok(AnswerValue::Text(raw.to_string())),
        FieldType::Number => parse_number(raw),
        FieldType::Date => parse_date(raw),
        FieldType::SingleChoice | FieldType::Dropdown => {
            resolve_option(field, raw).map(AnswerValue::Text)
        }
        FieldType::MultiChoice => {
            let mut selected: Vec<String> = Vec::new();
            for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
                let value = resolve_option(field, token)?;
                if !selected.contains(&value) {
                    selected.push(value);
                }
            }
            Ok(AnswerValue::Choices(selected))
        }
    }
}

fn parse_number(raw: &str) -> Result<AnswerValue, AnswerParseError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(AnswerValue::Number)
        .ok_or_else(|| {
            AnswerParseError::new("Please enter a number.", Some("expected number".to_string()))
        })
}

fn parse_date(raw: &str) -> Result<AnswerValue, AnswerParseError> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(position, byte)| match position {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if shaped {
        Ok(AnswerValue::Text(raw.to_string()))
    } else {
        Err(AnswerParseError::new(
            "Please enter a date as YYYY-MM-DD.",
            Some("expected ISO date".to_string()),
        ))
    }
}

/// Accepts an option value, a case-insensitive label, or a 1-based index.
fn resolve_option(field: &CompiledField, raw: &str) -> Result<String, AnswerParseError> {
    let options = field.spec().options();
    if options.is_empty() {
        return Ok(raw.to_string());
    }
    if let Some(option) = options.iter().find(|option| option.value == raw) {
        return Ok(option.value.clone());
    }
    if let Some(option) = options
        .iter()
        .find(|option| option.label.eq_ignore_ascii_case(raw))
    {
        return Ok(option.value.clone());
    }
    if let Ok(position) = raw.parse::<usize>()
        && let Some(option) = position.checked_sub(1).and_then(|index| options.get(index))
    {
        return Ok(option.value.clone());
    }

    let allowed = options
        .iter()
        .map(|option| option.value.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Err(AnswerParseError::new(
        format!("Choose one of: {}.", allowed),
        Some(format!("unknown option '{}'", raw)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use questionnaire_spec::Field;

    fn compiled(field: Field) -> CompiledField {
        CompiledField::compile(field).expect("compile")
    }

    #[test]
    fn choices_resolve_by_value_label_or_index() {
        let field = compiled(
            Field::new("role", FieldType::MultiChoice, "Role")
                .with_options([("intern", "Intern"), ("member", "Member"), ("leader", "Leader")]),
        );
        let value = parse_answer(&field, "intern, 2, LEADER, member").expect("parse");
        assert_eq!(
            value,
            AnswerValue::Choices(vec!["intern".into(), "member".into(), "leader".into()])
        );
        assert!(parse_answer(&field, "4").is_err());
        assert!(parse_answer(&field, "0").is_err());
    }

    #[test]
    fn numbers_and_dates_are_checked() {
        let number = compiled(Field::new("n", FieldType::Number, "N"));
        assert_eq!(parse_answer(&number, "2.5").expect("parse"), AnswerValue::Number(2.5));
        assert!(parse_answer(&number, "NaN").is_err());

        let date = compiled(Field::new("d", FieldType::Date, "D"));
        assert!(parse_answer(&date, "2024-06-15").is_ok());
        assert!(parse_answer(&date, "15/06/2024").is_err());
    }
}
