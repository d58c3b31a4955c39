//! Per-category supporting facts for answer generation.
//!
//! Contexts are plain projections of the normalized product. They carry no
//! prose, only the fields an answer in that category is allowed to draw on.
use crate::product::NormalizedProduct;
use crate::questions::Category;
use serde_json::Value;
use std::collections::BTreeMap;

/// Small fact mapping handed to the answer generator.
pub type SupportingContext = BTreeMap<String, Value>;

/// Facts relevant to `category`.
pub fn build_context(product: &NormalizedProduct, category: Category) -> SupportingContext {
    let fields: Vec<(&str, Value)> = match category {
        Category::Informational => vec![
            ("name", Value::from(product.name.as_str())),
            ("concentration", Value::from(product.concentration.as_str())),
            ("benefits", Value::from(product.benefits.clone())),
        ],
        Category::Usage => vec![
            ("usage", Value::from(product.usage.as_str())),
            ("skin_type", Value::from(product.skin_type.clone())),
        ],
        Category::Safety => vec![
            ("side_effects", Value::from(product.side_effects.as_str())),
            ("skin_type", Value::from(product.skin_type.clone())),
        ],
        Category::Ingredients => vec![
            ("ingredients", Value::from(product.ingredients.clone())),
            ("concentration", Value::from(product.concentration.as_str())),
        ],
        Category::Pricing => vec![
            ("price", product.price.reported_value()),
            ("name", Value::from(product.name.as_str())),
        ],
        Category::Comparison => vec![
            ("name", Value::from(product.name.as_str())),
            ("concentration", Value::from(product.concentration.as_str())),
            ("price", product.price.reported_value()),
        ],
    };
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Lookup by category name; unknown names yield an empty context.
pub fn build_context_for_name(product: &NormalizedProduct, category: &str) -> SupportingContext {
    Category::parse(category)
        .map(|category| build_context(product, category))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::glowboost;
    use serde_json::json;

    #[test]
    fn safety_context_carries_side_effects_and_skin_type() {
        let context = build_context(&glowboost(), Category::Safety);
        assert_eq!(context.len(), 2);
        assert_eq!(context["side_effects"], json!("Mild tingling for sensitive skin"));
        assert_eq!(context["skin_type"], json!(["Oily", "Combination"]));
    }

    #[test]
    fn pricing_context_carries_price_and_name() {
        let context = build_context(&glowboost(), Category::Pricing);
        assert_eq!(context["price"], json!(699));
        assert_eq!(context["name"], json!("GlowBoost Vitamin C Serum"));
    }

    #[test]
    fn every_category_yields_facts() {
        for category in Category::ALL {
            assert!(!build_context(&glowboost(), category).is_empty(), "{category}");
        }
    }

    #[test]
    fn unknown_category_name_yields_empty_context() {
        assert!(build_context_for_name(&glowboost(), "purchase").is_empty());
        assert_eq!(
            build_context_for_name(&glowboost(), "Usage"),
            build_context(&glowboost(), Category::Usage)
        );
    }
}
