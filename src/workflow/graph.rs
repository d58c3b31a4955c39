//! Stage machine driving one run.
//!
//! Every stage runs exactly once except question generation and count
//! validation, which form the only cycle. The cycle is bounded by the attempt
//! ceiling carried in the state.
use super::nodes;
use super::state::{ExecutionState, RetryPoint, StatePatch};
use crate::error::Result;
use crate::lm::TextGenerator;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parsing,
    GeneratingQuestions,
    ValidatingCount,
    BuildingContext,
    GeneratingAnswers,
    AssemblingFaq,
    AssemblingProduct,
    Comparing,
    Validating,
    Done,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Parsing => "parsing",
            Stage::GeneratingQuestions => "generating_questions",
            Stage::ValidatingCount => "validating_count",
            Stage::BuildingContext => "building_context",
            Stage::GeneratingAnswers => "generating_answers",
            Stage::AssemblingFaq => "assembling_faq",
            Stage::AssemblingProduct => "assembling_product",
            Stage::Comparing => "comparing",
            Stage::Validating => "validating",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text generators used by the generating stages.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub answers: &'a dyn TextGenerator,
    pub comparisons: &'a dyn TextGenerator,
    /// Optional source of extra question variants.
    pub question_expansion: Option<&'a dyn TextGenerator>,
}

pub struct ExecutionGraph<'a> {
    collaborators: Collaborators<'a>,
}

impl<'a> ExecutionGraph<'a> {
    pub fn new(collaborators: Collaborators<'a>) -> Self {
        Self { collaborators }
    }

    /// Drive `state` from parsing to done.
    ///
    /// Only contract violations (malformed questions or FAQ items) abort the
    /// run; every other failure is recorded in the returned state.
    pub fn run(&self, mut state: ExecutionState) -> Result<ExecutionState> {
        let mut stage = Stage::Parsing;
        while stage != Stage::Done {
            let patch = self.visit(stage, &state).inspect_err(|err| {
                tracing::error!(stage = %stage, error = %err, "run aborted");
            })?;
            state.apply(stage, patch);
            tracing::debug!(stage = %stage, version = state.version, "stage complete");
            stage = next_stage(stage, &state);
        }
        tracing::info!(
            questions = state.question_count,
            attempts = state.question_generation_attempts,
            answered = state.faq_answers.len(),
            schema_errors = state.schema_validation_errors.len(),
            "run complete"
        );
        Ok(state)
    }

    fn visit(&self, stage: Stage, state: &ExecutionState) -> Result<StatePatch> {
        let collaborators = &self.collaborators;
        match stage {
            Stage::Parsing => Ok(nodes::parse_products(state)),
            Stage::GeneratingQuestions => {
                nodes::generate_questions(state, collaborators.question_expansion)
            }
            Stage::ValidatingCount => Ok(nodes::validate_question_count(state)),
            Stage::BuildingContext => nodes::build_faq_context(state),
            Stage::GeneratingAnswers => nodes::generate_faq_answers(state, collaborators.answers),
            Stage::AssemblingFaq => nodes::assemble_faq_page(state),
            Stage::AssemblingProduct => nodes::assemble_product_page(state),
            Stage::Comparing => nodes::generate_comparison(state, collaborators.comparisons),
            Stage::Validating => Ok(nodes::validate_final_output(state)),
            Stage::Done => Ok(StatePatch::default()),
        }
    }
}

/// Successor of `stage` given the state after it ran.
pub fn next_stage(stage: Stage, state: &ExecutionState) -> Stage {
    match stage {
        Stage::Parsing if state.products().is_some() => Stage::GeneratingQuestions,
        Stage::Parsing => Stage::Validating,
        Stage::GeneratingQuestions => Stage::ValidatingCount,
        Stage::ValidatingCount => route_after_question_validation(state),
        Stage::BuildingContext => Stage::GeneratingAnswers,
        Stage::GeneratingAnswers => Stage::AssemblingFaq,
        Stage::AssemblingFaq => Stage::AssemblingProduct,
        Stage::AssemblingProduct => Stage::Comparing,
        Stage::Comparing => Stage::Validating,
        Stage::Validating | Stage::Done => Stage::Done,
    }
}

/// The retry decision is read from the flag alone.
pub fn route_after_question_validation(state: &ExecutionState) -> Stage {
    if state.retry_requested(RetryPoint::Questions) {
        Stage::GeneratingQuestions
    } else {
        Stage::BuildingContext
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
