//! Execution state threaded through one pipeline run.
//!
//! Nodes never mutate the state directly. Each node reads `&ExecutionState`
//! and returns a [`StatePatch`]; the graph applies patches one at a time and
//! bumps `version`, so every transition of the retry cycle is auditable.
use super::graph::Stage;
use crate::context::SupportingContext;
use crate::pages::{ComparisonPage, FaqItem, FaqPage, ProductPage};
use crate::product::{NormalizedProduct, RawProduct};
use crate::questions::GeneratedQuestion;
use crate::schema::SchemaErrors;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default lower bound on generated questions.
pub const DEFAULT_MIN_REQUIRED_QUESTIONS: usize = 15;
/// Default ceiling on question generation attempts.
pub const DEFAULT_MAX_QUESTION_GENERATION_ATTEMPTS: u32 = 5;

/// Named decision points that can request a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryPoint {
    Questions,
}

/// Bounds for the question retry cycle, fixed for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionLimits {
    pub min_required_questions: usize,
    pub max_question_generation_attempts: u32,
}

impl Default for QuestionLimits {
    fn default() -> Self {
        Self {
            min_required_questions: DEFAULT_MIN_REQUIRED_QUESTIONS,
            max_question_generation_attempts: DEFAULT_MAX_QUESTION_GENERATION_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionState {
    pub raw_product_a: RawProduct,
    pub raw_product_b: RawProduct,

    pub normalized_product_a: Option<NormalizedProduct>,
    pub normalized_product_b: Option<NormalizedProduct>,
    pub parse_errors: Vec<String>,

    pub generated_questions: Vec<GeneratedQuestion>,
    pub question_count: usize,
    pub question_generation_attempts: u32,
    pub max_question_generation_attempts: u32,
    pub min_required_questions: usize,

    pub faq_context_map: BTreeMap<usize, SupportingContext>,
    pub faq_answers: Vec<FaqItem>,
    pub faq_answer_errors: Vec<String>,

    pub faq_page: Option<FaqPage>,
    pub product_page: Option<ProductPage>,
    pub comparison_page: Option<ComparisonPage>,
    pub comparison_error: Option<String>,

    pub schema_validation_errors: SchemaErrors,
    pub retry_flags: BTreeMap<RetryPoint, bool>,
    pub execution_log: Vec<String>,

    /// Number of patches applied so far.
    pub version: u64,
    /// Stages in the order they were visited, retries included.
    pub visited: Vec<Stage>,
}

impl ExecutionState {
    pub fn new(raw_product_a: RawProduct, raw_product_b: RawProduct, limits: QuestionLimits) -> Self {
        Self {
            raw_product_a,
            raw_product_b,
            normalized_product_a: None,
            normalized_product_b: None,
            parse_errors: Vec::new(),
            generated_questions: Vec::new(),
            question_count: 0,
            question_generation_attempts: 0,
            max_question_generation_attempts: limits.max_question_generation_attempts,
            min_required_questions: limits.min_required_questions,
            faq_context_map: BTreeMap::new(),
            faq_answers: Vec::new(),
            faq_answer_errors: Vec::new(),
            faq_page: None,
            product_page: None,
            comparison_page: None,
            comparison_error: None,
            schema_validation_errors: SchemaErrors::new(),
            retry_flags: BTreeMap::new(),
            execution_log: Vec::new(),
            version: 0,
            visited: Vec::new(),
        }
    }

    /// Both normalized products, once parsing has succeeded.
    pub fn products(&self) -> Option<(&NormalizedProduct, &NormalizedProduct)> {
        self.normalized_product_a
            .as_ref()
            .zip(self.normalized_product_b.as_ref())
    }

    /// Absent flags read as "no retry".
    pub fn retry_requested(&self, point: RetryPoint) -> bool {
        self.retry_flags.get(&point).copied().unwrap_or(false)
    }

    /// True when parsing succeeded and no schema problem was recorded.
    pub fn is_clean(&self) -> bool {
        self.parse_errors.is_empty() && self.schema_validation_errors.is_empty()
    }

    /// Merge `patch` produced by `stage`.
    pub(super) fn apply(&mut self, stage: Stage, patch: StatePatch) {
        if let Some((product_a, product_b)) = patch.normalized_products {
            self.normalized_product_a = Some(product_a);
            self.normalized_product_b = Some(product_b);
        }
        self.parse_errors.extend(patch.parse_errors);

        if let Some(questions) = patch.generated_questions {
            self.question_count = questions.len();
            self.generated_questions = questions;
            self.question_generation_attempts += 1;
        }
        if let Some((point, retry)) = patch.retry {
            self.retry_flags.insert(point, retry);
        }

        if let Some(context_map) = patch.faq_context_map {
            self.faq_context_map = context_map;
        }
        if let Some(answers) = patch.faq_answers {
            self.faq_answers = answers;
        }
        self.faq_answer_errors.extend(patch.faq_answer_errors);

        if let Some(page) = patch.faq_page {
            self.faq_page = Some(page);
        }
        if let Some(page) = patch.product_page {
            self.product_page = Some(page);
        }
        if let Some(page) = patch.comparison_page {
            self.comparison_page = Some(page);
        }
        if let Some(error) = patch.comparison_error {
            self.comparison_error = Some(error);
        }

        self.schema_validation_errors
            .extend(patch.schema_validation_errors);
        self.execution_log.extend(patch.log);
        self.version += 1;
        self.visited.push(stage);
    }
}

/// The effect of one node visit.
///
/// Replacement fields are `Option` (absent means untouched); append-only logs
/// are plain vectors. Setting `generated_questions` counts as one generation
/// attempt.
#[derive(Debug, Default)]
pub struct StatePatch {
    pub normalized_products: Option<(NormalizedProduct, NormalizedProduct)>,
    pub parse_errors: Vec<String>,
    pub generated_questions: Option<Vec<GeneratedQuestion>>,
    pub retry: Option<(RetryPoint, bool)>,
    pub faq_context_map: Option<BTreeMap<usize, SupportingContext>>,
    pub faq_answers: Option<Vec<FaqItem>>,
    pub faq_answer_errors: Vec<String>,
    pub faq_page: Option<FaqPage>,
    pub product_page: Option<ProductPage>,
    pub comparison_page: Option<ComparisonPage>,
    pub comparison_error: Option<String>,
    pub schema_validation_errors: SchemaErrors,
    pub log: Vec<String>,
}

impl StatePatch {
    pub fn logged(entry: impl Into<String>) -> Self {
        Self {
            log: vec![entry.into()],
            ..Self::default()
        }
    }
}
