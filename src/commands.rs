//! Command handlers behind the CLI.
use crate::cli::{ContextArgs, GeneratorArgs, NormalizeArgs, QuestionsArgs, RunArgs, ValidateArgs};
use crate::config::{resolve_backends, resolve_config, ConfigOverrides, RunConfig};
use crate::context::build_context_for_name;
use crate::lm::build_generator;
use crate::output::{read_documents, write_run_outputs, Diagnostics};
use crate::product::{normalize_pair, normalize_product, NormalizedProduct, RawProduct};
use crate::questions::{generate_questions, Category};
use crate::schema::{validate_document, SchemaErrors};
use crate::workflow::{run_pipeline, Collaborators, ExecutionState};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read one raw product record; the file must hold a JSON object.
pub fn load_raw_product(path: &Path) -> Result<RawProduct> {
    let bytes = fs::read(path).with_context(|| format!("read product {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse product JSON {}", path.display()))?;
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(anyhow!(
            "product {} must be a JSON object",
            path.display()
        )),
    }
}

fn load_normalized(path: &Path) -> Result<NormalizedProduct> {
    let raw = load_raw_product(path)?;
    normalize_product(&raw).with_context(|| format!("normalize {}", path.display()))
}

fn overrides(generator: &GeneratorArgs) -> ConfigOverrides {
    ConfigOverrides {
        expand_questions: generator.expand_questions,
        lm: generator.lm.clone(),
        ..ConfigOverrides::default()
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{text}");
    Ok(())
}

pub fn run_run(args: RunArgs) -> Result<()> {
    let raw_product = load_raw_product(&args.product)?;
    let raw_competitor = load_raw_product(&args.competitor)?;
    if let Err(errors) = normalize_pair(&raw_product, &raw_competitor) {
        return Err(anyhow!("product parsing failed: {}", errors.join("; ")));
    }
    let config = resolve_config(
        args.generator.config.as_deref(),
        &ConfigOverrides {
            min_questions: args.min_questions,
            max_attempts: args.max_attempts,
            comparison_lm: args.comparison_lm.clone(),
            ..overrides(&args.generator)
        },
    )?;

    let state = execute(&config, raw_product, raw_competitor)?;
    if !state.parse_errors.is_empty() {
        return Err(anyhow!(
            "product parsing failed: {}",
            state.parse_errors.join("; ")
        ));
    }

    let written = write_run_outputs(&args.out, &state)?;
    if args.json {
        print_json(&Diagnostics::from_state(&state))?;
    } else {
        print_run_summary(&state, &written);
    }

    if args.strict && !state.is_clean() {
        return Err(anyhow!(
            "schema validation failed for: {}",
            schema_error_names(&state.schema_validation_errors)
        ));
    }
    Ok(())
}

fn execute(
    config: &RunConfig,
    raw_product: RawProduct,
    raw_competitor: RawProduct,
) -> Result<ExecutionState> {
    let backends = resolve_backends(config);
    let answers = build_generator(&backends.answers).context("set up answer generator")?;
    let comparisons =
        build_generator(&backends.comparisons).context("set up comparison generator")?;
    tracing::info!(
        answers = answers.label(),
        comparisons = comparisons.label(),
        expand_questions = config.expand_questions,
        "generators ready"
    );

    let collaborators = Collaborators {
        answers: answers.as_ref(),
        comparisons: comparisons.as_ref(),
        question_expansion: config.expand_questions.then_some(answers.as_ref()),
    };
    let state = run_pipeline(raw_product, raw_competitor, config.limits(), collaborators)?;
    Ok(state)
}

fn schema_error_names(errors: &SchemaErrors) -> String {
    errors.keys().cloned().collect::<Vec<_>>().join(", ")
}

fn print_run_summary(state: &ExecutionState, written: &[std::path::PathBuf]) {
    for entry in &state.execution_log {
        println!("{entry}");
    }
    for path in written {
        println!("wrote {}", path.display());
    }
    for error in &state.faq_answer_errors {
        eprintln!("warning: {error}");
    }
    if let Some(error) = &state.comparison_error {
        eprintln!("warning: comparison failed: {error}");
    }
    for (document, issues) in &state.schema_validation_errors {
        for issue in issues {
            eprintln!("warning: {document}: {issue}");
        }
    }
}

pub fn run_normalize(args: NormalizeArgs) -> Result<()> {
    print_json(&load_normalized(&args.product)?)
}

pub fn run_questions(args: QuestionsArgs) -> Result<()> {
    let product = load_normalized(&args.product)?;
    let config = resolve_config(args.generator.config.as_deref(), &overrides(&args.generator))?;
    let expander = if config.expand_questions {
        let backends = resolve_backends(&config);
        Some(build_generator(&backends.answers).context("set up answer generator")?)
    } else {
        None
    };
    let questions = generate_questions(&product, expander.as_deref())?;
    print_json(&questions)
}

pub fn run_context(args: ContextArgs) -> Result<()> {
    if Category::parse(&args.category).is_none() {
        let known: Vec<&str> = Category::ALL.iter().map(|category| category.as_str()).collect();
        return Err(anyhow!(
            "unknown category '{}' (expected one of: {})",
            args.category,
            known.join(", ")
        ));
    }
    let product = load_normalized(&args.product)?;
    print_json(&build_context_for_name(&product, &args.category))
}

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let errors: SchemaErrors = read_documents(&args.out)?
        .into_iter()
        .filter_map(|(kind, document)| {
            let issues = validate_document(kind, document.as_ref());
            (!issues.is_empty()).then(|| (kind.name().to_string(), issues))
        })
        .collect();

    if args.json {
        print_json(&errors)?;
    } else if errors.is_empty() {
        println!("All output schemas validated successfully");
    } else {
        for (document, issues) in &errors {
            for issue in issues {
                println!("{document}: {issue}");
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "schema validation failed for: {}",
            schema_error_names(&errors)
        ))
    }
}
