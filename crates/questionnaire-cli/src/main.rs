mod wizard;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use questionnaire_spec::{
    Answers, Questionnaire, QuestionnaireSchema, ValidationResult, build_render_payload,
    render_json_ui, render_text, resolve_visibility, validate,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Questionnaire schema and answer tooling",
    long_about = "Checks questionnaire schemas, resolves conditional visibility, validates answers and fills questionnaires interactively"
)]
struct Cli {
    /// Log schema loading and wizard progress to stderr.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Load a schema and report authoring errors.
    Check {
        /// Path to the questionnaire schema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
    },
    /// Print which fields are visible for the given answers.
    Visibility {
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Validate answers against a schema; exits non-zero when invalid.
    Validate {
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Render the questionnaire state for the given answers.
    Render {
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file with the current answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        #[arg(long, value_enum, env = "QUESTIONNAIRE_FORMAT", default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Fill a questionnaire interactively in the terminal.
    Fill {
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file with answers to start from.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Write the final answers here instead of stdout.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
    },
    /// Print the JSON Schema describing questionnaire schema files.
    JsonSchema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Check { schema } => run_check(&schema),
        Command::Visibility { schema, answers } => run_visibility(&schema, &answers),
        Command::Validate { schema, answers } => run_validate(&schema, &answers),
        Command::Render {
            schema,
            answers,
            format,
        } => run_render(&schema, answers.as_deref(), format),
        Command::Fill {
            schema,
            answers,
            out,
        } => run_fill(&schema, answers.as_deref(), out.as_deref(), cli.verbose),
        Command::JsonSchema => run_json_schema(),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "questionnaire=debug,questionnaire_spec=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_questionnaire(path: &Path) -> CliResult<Questionnaire> {
    let contents = fs::read_to_string(path)?;
    let questionnaire = Questionnaire::from_json(&contents)
        .map_err(|err| format!("{}: {}", path.display(), err))?;
    info!(path = %path.display(), "loaded questionnaire");
    Ok(questionnaire)
}

fn load_answers(path: Option<&Path>) -> CliResult<Answers> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(Answers::new()),
    }
}

fn run_check(schema_path: &Path) -> CliResult<()> {
    let questionnaire = load_questionnaire(schema_path)?;
    let conditional = questionnaire
        .fields()
        .iter()
        .filter(|field| field.logic().is_some())
        .count();
    println!(
        "Schema OK: {} fields, {} groups, {} with conditional logic",
        questionnaire.fields().len(),
        questionnaire.groups().len(),
        conditional
    );
    Ok(())
}

fn run_visibility(schema_path: &Path, answers_path: &Path) -> CliResult<()> {
    let questionnaire = load_questionnaire(schema_path)?;
    let answers = load_answers(Some(answers_path))?;
    let visibility = resolve_visibility(&questionnaire, &answers);
    println!("{}", serde_json::to_string_pretty(&visibility)?);
    Ok(())
}

fn run_validate(schema_path: &Path, answers_path: &Path) -> CliResult<()> {
    let questionnaire = load_questionnaire(schema_path)?;
    let answers = load_answers(Some(answers_path))?;

    let result = validate(&questionnaire, &answers);
    println!("{}", serde_json::to_string_pretty(&result)?);
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    for error in &result.errors {
        eprintln!("  {} - {}", error.field_key, error.message);
    }
    if !result.unknown_fields.is_empty() {
        eprintln!(
            "Unknown answer fields (ignored): {}",
            result.unknown_fields.join(", ")
        );
    }
}

fn run_render(
    schema_path: &Path,
    answers_path: Option<&Path>,
    format: RenderMode,
) -> CliResult<()> {
    let questionnaire = load_questionnaire(schema_path)?;
    let answers = load_answers(answers_path)?;
    let payload = build_render_payload(&questionnaire, &answers);
    match format {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => {
            let ui = render_json_ui(&payload);
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
    }
    Ok(())
}

fn run_fill(
    schema_path: &Path,
    answers_path: Option<&Path>,
    out: Option<&Path>,
    verbose: bool,
) -> CliResult<()> {
    let questionnaire = load_questionnaire(schema_path)?;
    let answers = load_answers(answers_path)?;
    let presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));

    let answers = wizard::fill(&questionnaire, answers, &presenter)?;
    let pretty = answers.to_json_pretty()?;
    match out {
        Some(path) => {
            fs::write(path, format!("{}\n", pretty))?;
            println!("Done. Answers written to {}", path.display());
        }
        None => {
            println!("Done.");
            println!("{}", pretty);
        }
    }
    Ok(())
}

fn run_json_schema() -> CliResult<()> {
    let schema = schemars::schema_for!(QuestionnaireSchema);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
