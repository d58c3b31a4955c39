//! Categorized question generation.
//!
//! A deterministic baseline guarantees coverage of every category. An optional
//! generator pass may add variants; its output is only ever merged in when it
//! parses cleanly, otherwise the baseline stands alone.
use crate::error::{PipelineError, Result};
use crate::lm::TextGenerator;
use crate::product::NormalizedProduct;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Minimum number of questions each category must carry.
pub const MIN_QUESTIONS_PER_CATEGORY: usize = 3;

/// Fixed question/content classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Informational,
    Usage,
    Safety,
    Ingredients,
    Pricing,
    Comparison,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Informational,
        Category::Usage,
        Category::Safety,
        Category::Ingredients,
        Category::Pricing,
        Category::Comparison,
    ];

    /// Return the stable string identifier used in JSON artifacts.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Informational => "informational",
            Category::Usage => "usage",
            Category::Safety => "safety",
            Category::Ingredients => "ingredients",
            Category::Pricing => "pricing",
            Category::Comparison => "comparison",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == name)
    }

    fn templates(self, name: &str) -> [String; MIN_QUESTIONS_PER_CATEGORY] {
        match self {
            Category::Informational => [
                format!("What is {name}?"),
                format!("What are the main benefits of {name}?"),
                format!("What concentration does {name} contain?"),
            ],
            Category::Usage => [
                format!("How should {name} be used?"),
                format!("When is the best time to use {name}?"),
                format!("Which skin types is {name} suitable for?"),
            ],
            Category::Safety => [
                format!("Is {name} safe to use?"),
                format!("Are there any side effects of {name}?"),
                format!("Can people with sensitive skin use {name}?"),
            ],
            Category::Ingredients => [
                format!("What ingredients are used in {name}?"),
                format!("How do the ingredients in {name} help the skin?"),
                format!("What are the key active ingredients in {name}?"),
            ],
            Category::Pricing => [
                format!("What is the price of {name}?"),
                format!("Is {name} worth its price?"),
                format!("Does {name} offer good value for money?"),
            ],
            Category::Comparison => [
                format!("How does {name} compare to similar products?"),
                format!("Is {name} better than alternative options?"),
                format!("What makes {name} different from other serums?"),
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One question in the flattened, downstream-facing list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub category: Category,
    pub question: String,
}

/// Questions grouped by category, iterated in category declaration order.
pub type CategorizedQuestions = BTreeMap<Category, Vec<String>>;

/// Generate the flattened question list for `product`.
///
/// `expander`, when present, is asked once for additional variants. Expansion
/// problems of any kind leave the baseline untouched.
pub fn generate_questions(
    product: &NormalizedProduct,
    expander: Option<&dyn TextGenerator>,
) -> Result<Vec<GeneratedQuestion>> {
    let mut questions = baseline_questions(product);
    if let Some(generator) = expander {
        if let Some(extra) = expand_questions(generator, product) {
            merge_questions(&mut questions, extra);
        }
    }
    validate_questions(&questions)?;
    Ok(flatten_questions(questions))
}

/// Template questions for every category.
pub fn baseline_questions(product: &NormalizedProduct) -> CategorizedQuestions {
    let name = match product.name.trim() {
        "" => "this product",
        name => name,
    };
    Category::ALL
        .into_iter()
        .map(|category| (category, category.templates(name).to_vec()))
        .collect()
}

fn expand_questions(
    generator: &dyn TextGenerator,
    product: &NormalizedProduct,
) -> Option<CategorizedQuestions> {
    let prompt = build_expansion_prompt(product);
    let response = match generator.generate(&prompt) {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(error = %format!("{err:#}"), "question expansion call failed");
            return None;
        }
    };
    match parse_expansion(&response) {
        Ok(extra) => Some(extra),
        Err(reason) => {
            tracing::debug!(%reason, "question expansion discarded");
            None
        }
    }
}

fn build_expansion_prompt(product: &NormalizedProduct) -> String {
    let keys = Category::ALL
        .iter()
        .map(|category| format!("\"{category}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let product_json = serde_json::to_string_pretty(product).unwrap_or_default();
    format!(
        r#"You are generating user questions for a product content system.

Rules:
- Use ONLY the provided product data
- Do NOT add or infer new facts
- Do NOT answer the questions
- Generate only question variants, each ending with a question mark
- Output STRICTLY valid JSON
- Keys must be exactly: [{keys}]

Product Data:
{product_json}

Output Format:
{{"informational": [string], "usage": [string], "safety": [string], "ingredients": [string], "pricing": [string], "comparison": [string]}}
"#
    )
}

/// The outermost `{...}` span of a response, which drops code fences and any
/// prose around the object.
fn expansion_object(text: &str) -> std::result::Result<&str, String> {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err("response holds no JSON object".to_string()),
    }
}

/// Parse an expansion response; unknown keys are ignored.
pub(crate) fn parse_expansion(text: &str) -> std::result::Result<CategorizedQuestions, String> {
    let raw: BTreeMap<String, Vec<String>> =
        serde_json::from_str(expansion_object(text)?).map_err(|err| err.to_string())?;
    let mut parsed = CategorizedQuestions::new();
    for (key, entries) in raw {
        let Some(category) = Category::parse(&key) else {
            continue;
        };
        let entries: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.trim().to_string())
            .collect();
        if let Some(bad) = entries.iter().find(|entry| !is_question(entry)) {
            return Err(format!("{category} entry is not a question: {bad:?}"));
        }
        parsed.entry(category).or_default().extend(entries);
    }
    Ok(parsed)
}

/// Append `extra` to `base`, then dedupe every category keeping first occurrences.
pub fn merge_questions(base: &mut CategorizedQuestions, extra: CategorizedQuestions) {
    for (category, entries) in extra {
        base.entry(category).or_default().extend(entries);
    }
    for entries in base.values_mut() {
        let merged = std::mem::take(entries);
        *entries = dedupe_preserving_order(merged);
    }
}

fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn is_question(entry: &str) -> bool {
    !entry.trim().is_empty() && entry.contains('?')
}

/// Enforce the per-category contract before questions leave this module.
pub fn validate_questions(questions: &CategorizedQuestions) -> Result<()> {
    for category in Category::ALL {
        let entries = questions
            .get(&category)
            .ok_or_else(|| PipelineError::QuestionSchema(format!("missing category: {category}")))?;
        if entries.len() < MIN_QUESTIONS_PER_CATEGORY {
            return Err(PipelineError::QuestionSchema(format!(
                "category '{category}' has fewer than {MIN_QUESTIONS_PER_CATEGORY} questions"
            )));
        }
        if let Some(bad) = entries.iter().find(|entry| !is_question(entry)) {
            return Err(PipelineError::QuestionSchema(format!(
                "category '{category}' contains a non-question entry: {bad:?}"
            )));
        }
    }
    Ok(())
}

/// Flatten category-major, preserving order within each category.
pub fn flatten_questions(questions: CategorizedQuestions) -> Vec<GeneratedQuestion> {
    questions
        .into_iter()
        .flat_map(|(category, entries)| {
            entries
                .into_iter()
                .map(move |question| GeneratedQuestion { category, question })
        })
        .collect()
}

#[cfg(test)]
#[path = "questions_tests.rs"]
mod tests;
