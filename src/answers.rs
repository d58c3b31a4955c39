//! FAQ answer generation: one grounded generator call per question.
use crate::context::SupportingContext;
use crate::error::{PipelineError, Result};
use crate::lm::TextGenerator;
use crate::product::NormalizedProduct;
use crate::questions::Category;
use serde::{Deserialize, Serialize};

/// A generated answer for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
}

/// Answer `question` from `product` and `supporting_context` only.
///
/// The generator is called exactly once; failures propagate so the caller can
/// record them per question.
pub fn generate_answer(
    generator: &dyn TextGenerator,
    product: &NormalizedProduct,
    category: Category,
    question: &str,
    supporting_context: &SupportingContext,
) -> Result<Answer> {
    let prompt = build_answer_prompt(product, category, question, supporting_context);
    let raw = generator
        .generate(&prompt)
        .map_err(|err| PipelineError::generation(&err))?;
    Ok(Answer {
        question: question.to_string(),
        answer: postprocess_answer(&raw),
    })
}

fn build_answer_prompt(
    product: &NormalizedProduct,
    category: Category,
    question: &str,
    supporting_context: &SupportingContext,
) -> String {
    let product_json = serde_json::to_string_pretty(product).unwrap_or_default();
    let context_json = serde_json::to_string_pretty(supporting_context).unwrap_or_default();
    format!(
        r#"You are generating an FAQ answer for a skincare product.

Product data:
{product_json}

Additional context:
{context_json}

Category:
{category}

Question:
{question}

Rules:
- Use ONLY the provided product data
- Do NOT add external facts
- Answer in 1 to 2 clear sentences
- Be specific to the question
- Do NOT mention the category explicitly
"#
    )
}

/// Trim whitespace and one layer of enclosing quotes.
pub fn postprocess_answer(raw: &str) -> String {
    let text = raw.trim();
    let mut chars = text.chars();
    let enclosed = match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) => matches!(
            (open, close),
            ('"', '"') | ('\'', '\'') | ('\u{201c}', '\u{201d}') | ('\u{2018}', '\u{2019}')
        ),
        _ => false,
    };
    if enclosed {
        chars.as_str().trim().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::build_context;
    use crate::lm::scripted::ScriptedGenerator;
    use crate::test_support::glowboost;
    use anyhow::anyhow;

    #[test]
    fn postprocess_strips_whitespace_and_one_quote_layer() {
        assert_eq!(postprocess_answer("  \"Use it daily.\" \n"), "Use it daily.");
        assert_eq!(postprocess_answer("'Yes.'"), "Yes.");
        assert_eq!(postprocess_answer("\"\"nested\"\""), "\"nested\"");
        assert_eq!(postprocess_answer("\u{201c}Curly.\u{201d}"), "Curly.");
        assert_eq!(postprocess_answer("\"unbalanced"), "\"unbalanced");
        assert_eq!(postprocess_answer(""), "");
        assert_eq!(postprocess_answer("\""), "\"");
    }

    #[test]
    fn calls_generator_once_with_grounding() {
        let generator = ScriptedGenerator::constant(" \"Apply two drops each morning.\" ");
        let product = glowboost();
        let context = build_context(&product, Category::Usage);
        let answer = generate_answer(
            &generator,
            &product,
            Category::Usage,
            "How should it be used?",
            &context,
        )
        .expect("answer");

        assert_eq!(generator.calls(), 1);
        assert_eq!(answer.question, "How should it be used?");
        assert_eq!(answer.answer, "Apply two drops each morning.");
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("How should it be used?"));
        assert!(prompt.contains("Use ONLY the provided product data"));
        assert!(prompt.contains("Apply 2-3 drops in the morning before sunscreen"));
    }

    #[test]
    fn generator_failure_propagates() {
        let generator = ScriptedGenerator::new(|_| Err(anyhow!("rate limited")));
        let err = generate_answer(
            &generator,
            &glowboost(),
            Category::Safety,
            "Is it safe?",
            &SupportingContext::new(),
        )
        .expect_err("generation error");
        assert_eq!(err, PipelineError::Generation("rate limited".to_string()));
        assert_eq!(generator.calls(), 1);
    }
}
