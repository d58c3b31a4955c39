//! Output document shapes.
//!
//! Assembly only re-keys already computed blocks; the one check performed here
//! is that every FAQ item carries its three text fields.
use crate::compare::ComparisonBlocks;
use crate::error::{PipelineError, Result};
use crate::product::NormalizedProduct;
use serde::{Deserialize, Serialize};

pub const FAQ_PAGE_TYPE: &str = "faq";
pub const PRODUCT_PAGE_TYPE: &str = "product";
pub const COMPARISON_PAGE_TYPE: &str = "comparison";

/// One answered question as it appears on the FAQ page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub category: String,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqPage {
    pub page_type: &'static str,
    pub total_questions: usize,
    pub questions: Vec<FaqItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPage {
    pub page_type: &'static str,
    pub content: NormalizedProduct,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPage {
    pub page_type: &'static str,
    pub comparison: ComparisonBlocks,
}

/// Build the FAQ page; an empty item list is a valid zero-question page.
pub fn build_faq_page(items: &[FaqItem]) -> Result<FaqPage> {
    for (index, item) in items.iter().enumerate() {
        let fields = [
            ("category", &item.category),
            ("question", &item.question),
            ("answer", &item.answer),
        ];
        if let Some((key, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(PipelineError::FaqItemSchema(format!(
                "item {index} is missing '{key}'"
            )));
        }
    }
    Ok(FaqPage {
        page_type: FAQ_PAGE_TYPE,
        total_questions: items.len(),
        questions: items.to_vec(),
    })
}

pub fn build_product_page(product: &NormalizedProduct) -> ProductPage {
    ProductPage {
        page_type: PRODUCT_PAGE_TYPE,
        content: product.clone(),
    }
}

pub fn build_comparison_page(blocks: ComparisonBlocks) -> ComparisonPage {
    ComparisonPage {
        page_type: COMPARISON_PAGE_TYPE,
        comparison: blocks,
    }
}
