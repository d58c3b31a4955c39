//! Graph nodes.
//!
//! Each node reads the state, calls into one collaborator module and returns a
//! patch. Nodes that depend on parsed products report `ProductsNotParsed` when
//! visited out of order.
use super::state::{ExecutionState, RetryPoint, StatePatch};
use crate::answers::generate_answer;
use crate::compare::compare_products;
use crate::context::{build_context, SupportingContext};
use crate::error::{PipelineError, Result};
use crate::lm::TextGenerator;
use crate::pages::{build_comparison_page, build_faq_page, build_product_page, FaqItem};
use crate::product::{normalize_pair, NormalizedProduct};
use crate::questions;
use crate::schema::{validate_documents, SchemaErrors, SchemaIssue};
use serde::Serialize;
use serde_json::Value;

fn product_a<'s>(state: &'s ExecutionState, stage: &'static str) -> Result<&'s NormalizedProduct> {
    state
        .normalized_product_a
        .as_ref()
        .ok_or(PipelineError::ProductsNotParsed { stage })
}

pub(super) fn parse_products(state: &ExecutionState) -> StatePatch {
    match normalize_pair(&state.raw_product_a, &state.raw_product_b) {
        Ok((product_a, product_b)) => {
            tracing::info!(
                product_a = %product_a.name,
                product_b = %product_b.name,
                "products parsed"
            );
            StatePatch {
                normalized_products: Some((product_a, product_b)),
                ..StatePatch::logged("Products parsed successfully")
            }
        }
        Err(parse_errors) => {
            tracing::warn!(errors = ?parse_errors, "product parsing failed");
            StatePatch {
                parse_errors,
                ..StatePatch::logged("Parsing failed")
            }
        }
    }
}

pub(super) fn generate_questions(
    state: &ExecutionState,
    expander: Option<&dyn TextGenerator>,
) -> Result<StatePatch> {
    let product = product_a(state, "question generation")?;
    let generated = questions::generate_questions(product, expander)?;
    let attempt = state.question_generation_attempts + 1;
    tracing::info!(count = generated.len(), attempt, "questions generated");
    Ok(StatePatch {
        log: vec![format!(
            "Generated {} questions (attempt {attempt})",
            generated.len()
        )],
        generated_questions: Some(generated),
        ..StatePatch::default()
    })
}

pub(super) fn validate_question_count(state: &ExecutionState) -> StatePatch {
    let count = state.question_count;
    let minimum = state.min_required_questions;
    let attempts = state.question_generation_attempts;

    if count >= minimum {
        return StatePatch {
            retry: Some((RetryPoint::Questions, false)),
            ..StatePatch::logged(format!("FAQ count validated ({count} questions)"))
        };
    }

    if attempts >= state.max_question_generation_attempts {
        tracing::warn!(count, minimum, attempts, "question retries exhausted");
        let issue = SchemaIssue::new(
            "",
            format!("Failed to generate >={minimum} questions after {attempts} attempts"),
        );
        return StatePatch {
            retry: Some((RetryPoint::Questions, false)),
            schema_validation_errors: SchemaErrors::from([("questions".to_string(), vec![issue])]),
            ..StatePatch::logged(format!(
                "Max question generation retries reached, continuing with {count} questions"
            ))
        };
    }

    tracing::info!(count, minimum, attempts, "question count below minimum");
    StatePatch {
        retry: Some((RetryPoint::Questions, true)),
        ..StatePatch::logged(format!(
            "FAQ count {count} < {minimum}, retrying (attempt {attempts})"
        ))
    }
}

pub(super) fn build_faq_context(state: &ExecutionState) -> Result<StatePatch> {
    let product = product_a(state, "context building")?;
    let context_map = state
        .generated_questions
        .iter()
        .enumerate()
        .map(|(index, question)| (index, build_context(product, question.category)))
        .collect();
    Ok(StatePatch {
        faq_context_map: Some(context_map),
        ..StatePatch::logged(format!(
            "FAQ context built for {} questions",
            state.generated_questions.len()
        ))
    })
}

/// Answer every question; a failure is recorded against its question and
/// never stops the others.
pub(super) fn generate_faq_answers(
    state: &ExecutionState,
    generator: &dyn TextGenerator,
) -> Result<StatePatch> {
    let product = product_a(state, "answer generation")?;
    let empty = SupportingContext::new();
    let mut answers = Vec::with_capacity(state.generated_questions.len());
    let mut errors = Vec::new();

    for (index, question) in state.generated_questions.iter().enumerate() {
        let context = state.faq_context_map.get(&index).unwrap_or(&empty);
        let outcome = generate_answer(
            generator,
            product,
            question.category,
            &question.question,
            context,
        );
        match outcome {
            Ok(answer) if answer.answer.is_empty() => {
                tracing::warn!(index, question = %question.question, "empty answer");
                errors.push(format!("question {index} ({}): empty answer", question.question));
            }
            Ok(answer) => answers.push(FaqItem {
                category: question.category.as_str().to_string(),
                question: answer.question,
                answer: answer.answer,
            }),
            Err(err) => {
                tracing::warn!(index, question = %question.question, error = %err, "answer failed");
                errors.push(format!("question {index} ({}): {err}", question.question));
            }
        }
    }

    let entry = format!(
        "FAQ answers generated ({} answered, {} failed)",
        answers.len(),
        errors.len()
    );
    Ok(StatePatch {
        faq_answers: Some(answers),
        faq_answer_errors: errors,
        ..StatePatch::logged(entry)
    })
}

pub(super) fn assemble_faq_page(state: &ExecutionState) -> Result<StatePatch> {
    let page = build_faq_page(&state.faq_answers)?;
    Ok(StatePatch {
        faq_page: Some(page),
        ..StatePatch::logged("FAQ page assembled")
    })
}

pub(super) fn assemble_product_page(state: &ExecutionState) -> Result<StatePatch> {
    let product = product_a(state, "product page assembly")?;
    Ok(StatePatch {
        product_page: Some(build_product_page(product)),
        ..StatePatch::logged("Product page assembled")
    })
}

/// A failed comparison leaves the page absent; final validation reports it.
pub(super) fn generate_comparison(
    state: &ExecutionState,
    generator: &dyn TextGenerator,
) -> Result<StatePatch> {
    let (product_a, product_b) = state.products().ok_or(PipelineError::ProductsNotParsed {
        stage: "comparison",
    })?;
    match compare_products(generator, product_a, product_b) {
        Ok(blocks) => Ok(StatePatch {
            comparison_page: Some(build_comparison_page(blocks)),
            ..StatePatch::logged("Comparison page generated")
        }),
        Err(err) => {
            tracing::warn!(error = %err, "comparison failed");
            Ok(StatePatch {
                comparison_error: Some(err.to_string()),
                ..StatePatch::logged(format!("Comparison failed: {err}"))
            })
        }
    }
}

fn to_document<T: Serialize>(page: Option<&T>) -> Option<Value> {
    page.and_then(|page| serde_json::to_value(page).ok())
}

pub(super) fn validate_final_output(state: &ExecutionState) -> StatePatch {
    let faq = to_document(state.faq_page.as_ref());
    let product = to_document(state.product_page.as_ref());
    let comparison = to_document(state.comparison_page.as_ref());
    let errors = validate_documents(faq.as_ref(), product.as_ref(), comparison.as_ref());

    let entry = if errors.is_empty() {
        "All output schemas validated successfully".to_string()
    } else {
        let failed: Vec<&str> = errors.keys().map(String::as_str).collect();
        tracing::warn!(documents = ?failed, "schema validation failed");
        format!("Schema validation failed: [{}]", failed.join(", "))
    };
    StatePatch {
        schema_validation_errors: errors,
        ..StatePatch::logged(entry)
    }
}
