//! Two-product comparison.
//!
//! Price is compared deterministically. Every qualitative dimension gets its
//! own generator verdict, followed by one overall summary call.
use crate::error::{PipelineError, Result};
use crate::lm::TextGenerator;
use crate::product::NormalizedProduct;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Qualitative dimensions compared by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Ingredients,
    Benefits,
    SkinType,
    Usage,
    SideEffects,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Ingredients,
        Dimension::Benefits,
        Dimension::SkinType,
        Dimension::Usage,
        Dimension::SideEffects,
    ];

    /// Key of this dimension's block in the comparison document.
    pub fn section(self) -> &'static str {
        match self {
            Dimension::Ingredients => "ingredients_comparison",
            Dimension::Benefits => "benefits_comparison",
            Dimension::SkinType => "skin_type_comparison",
            Dimension::Usage => "usage_comparison",
            Dimension::SideEffects => "side_effects_comparison",
        }
    }

    fn field(self) -> &'static str {
        match self {
            Dimension::Ingredients => "ingredients",
            Dimension::Benefits => "benefits",
            Dimension::SkinType => "skin_type",
            Dimension::Usage => "usage",
            Dimension::SideEffects => "side_effects",
        }
    }

    fn instruction(self) -> &'static str {
        match self {
            Dimension::Ingredients => "Compare formulation focus and ingredient strategy.",
            Dimension::Benefits => "Compare user-visible benefits and outcomes.",
            Dimension::SkinType => "Compare suitability for different skin types.",
            Dimension::Usage => "Compare ease of use and daily routine compatibility.",
            Dimension::SideEffects => "Compare tolerability and potential risks.",
        }
    }

    fn values(self, product: &NormalizedProduct) -> Value {
        match self {
            Dimension::Ingredients => Value::from(product.ingredients.clone()),
            Dimension::Benefits => Value::from(product.benefits.clone()),
            Dimension::SkinType => Value::from(product.skin_type.clone()),
            Dimension::Usage => Value::from(product.usage.as_str()),
            Dimension::SideEffects => Value::from(product.side_effects.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductPair {
    pub product_a: String,
    pub product_b: String,
}

/// Keys sharing a block with the product names.
const RESERVED_NAMES: [&str; 2] = ["cheaper_option", "verdict"];

/// Prices keyed by product name plus the cheaper product's name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparison {
    #[serde(flatten)]
    pub prices: BTreeMap<String, Value>,
    pub cheaper_option: Option<String>,
}

/// Dimension values keyed by product name plus the generator's verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldComparison {
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
    pub verdict: String,
}

/// Structured comparison handed to the page assembler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonBlocks {
    pub products: ProductPair,
    pub price_comparison: PriceComparison,
    #[serde(flatten)]
    pub dimensions: BTreeMap<String, FieldComparison>,
    pub summary: String,
}

/// Compare `product_a` against `product_b`.
///
/// Makes one generator call per dimension plus one summary call. The first
/// failing call aborts the comparison.
pub fn compare_products(
    generator: &dyn TextGenerator,
    product_a: &NormalizedProduct,
    product_b: &NormalizedProduct,
) -> Result<ComparisonBlocks> {
    if product_a.name.trim().is_empty() || product_b.name.trim().is_empty() {
        return Err(PipelineError::MissingProductName);
    }
    if let Some(name) = [&product_a.name, &product_b.name]
        .into_iter()
        .find(|name| RESERVED_NAMES.contains(&name.trim()))
    {
        return Err(PipelineError::ReservedProductName(name.clone()));
    }

    let mut dimensions = BTreeMap::new();
    for dimension in Dimension::ALL {
        let block = compare_dimension(generator, dimension, product_a, product_b)?;
        dimensions.insert(dimension.section().to_string(), block);
    }

    let summary = generator
        .generate(&build_summary_prompt(product_a, product_b))
        .map_err(|err| PipelineError::generation(&err))?;

    Ok(ComparisonBlocks {
        products: ProductPair {
            product_a: product_a.name.clone(),
            product_b: product_b.name.clone(),
        },
        price_comparison: compare_price(product_a, product_b),
        dimensions,
        summary: summary.trim().to_string(),
    })
}

/// Deterministic price comparison; `cheaper_option` is `None` unless both
/// prices are numeric. Ties resolve to `product_b`.
pub fn compare_price(product_a: &NormalizedProduct, product_b: &NormalizedProduct) -> PriceComparison {
    let cheaper_option = match (product_a.price.amount(), product_b.price.amount()) {
        (Some(price_a), Some(price_b)) if price_a < price_b => Some(product_a.name.clone()),
        (Some(_), Some(_)) => Some(product_b.name.clone()),
        _ => None,
    };
    let prices = BTreeMap::from([
        (product_a.name.clone(), product_a.price.reported_value()),
        (product_b.name.clone(), product_b.price.reported_value()),
    ]);
    PriceComparison {
        prices,
        cheaper_option,
    }
}

fn compare_dimension(
    generator: &dyn TextGenerator,
    dimension: Dimension,
    product_a: &NormalizedProduct,
    product_b: &NormalizedProduct,
) -> Result<FieldComparison> {
    let values_a = dimension.values(product_a);
    let values_b = dimension.values(product_b);
    let prompt = format!(
        r#"You are comparing two skincare products.

Task:
{instruction}

Rules:
- Use ONLY the provided data
- Do NOT add assumptions
- Be concise (1-2 sentences)

{name_a} ({field}):
{values_a}

{name_b} ({field}):
{values_b}
"#,
        instruction = dimension.instruction(),
        field = dimension.field(),
        name_a = product_a.name,
        name_b = product_b.name,
    );
    let verdict = generator
        .generate(&prompt)
        .map_err(|err| PipelineError::generation(&err))?;
    tracing::debug!(section = dimension.section(), "comparison verdict received");

    Ok(FieldComparison {
        values: BTreeMap::from([
            (product_a.name.clone(), values_a),
            (product_b.name.clone(), values_b),
        ]),
        verdict: verdict.trim().to_string(),
    })
}

fn build_summary_prompt(product_a: &NormalizedProduct, product_b: &NormalizedProduct) -> String {
    let product_a = serde_json::to_string_pretty(product_a).unwrap_or_default();
    let product_b = serde_json::to_string_pretty(product_b).unwrap_or_default();
    format!(
        r#"You are given full details of two skincare products.

Task:
Provide a short overall comparison summary highlighting key differences and
which type of user each product suits best.

Rules:
- Use ONLY the provided data
- No assumptions
- 2 to 3 sentences maximum

Product A:
{product_a}

Product B:
{product_b}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lm::scripted::ScriptedGenerator;
    use crate::product::Price;
    use crate::test_support::{glowboost, radiantplus};
    use anyhow::anyhow;
    use serde_json::json;

    #[test]
    fn cheaper_option_follows_lower_price_in_either_order() {
        let a = glowboost();
        let b = radiantplus();

        let forward = compare_price(&a, &b);
        assert_eq!(forward.cheaper_option.as_deref(), Some("GlowBoost Vitamin C Serum"));
        assert_eq!(forward.prices["GlowBoost Vitamin C Serum"], json!(699));
        assert_eq!(forward.prices["RadiantPlus Serum"], json!(799));

        let reverse = compare_price(&b, &a);
        assert_eq!(reverse.cheaper_option.as_deref(), Some("GlowBoost Vitamin C Serum"));
    }

    #[test]
    fn non_numeric_price_yields_no_cheaper_option() {
        let a = glowboost();
        let mut b = radiantplus();
        b.price = Price::Money {
            currency: "INR".to_string(),
            amount: json!("on request"),
        };
        assert_eq!(compare_price(&a, &b).cheaper_option, None);

        b.price = Price::Money {
            currency: "INR".to_string(),
            amount: json!(500),
        };
        assert_eq!(
            compare_price(&a, &b).cheaper_option.as_deref(),
            Some("RadiantPlus Serum")
        );
    }

    #[test]
    fn makes_one_call_per_dimension_plus_summary() {
        let generator = ScriptedGenerator::constant("  Both are comparable.  ");
        let blocks = compare_products(&generator, &glowboost(), &radiantplus()).expect("compare");
        assert_eq!(generator.calls(), Dimension::ALL.len() + 1);
        assert_eq!(blocks.dimensions.len(), Dimension::ALL.len());
        assert_eq!(blocks.summary, "Both are comparable.");

        let skin = &blocks.dimensions["skin_type_comparison"];
        assert_eq!(skin.values["RadiantPlus Serum"], json!(["Dry"]));
        assert_eq!(skin.verdict, "Both are comparable.");
    }

    #[test]
    fn serializes_names_as_keys() {
        let generator = ScriptedGenerator::constant("verdict");
        let blocks = compare_products(&generator, &glowboost(), &radiantplus()).expect("compare");
        let value = serde_json::to_value(&blocks).expect("serialize");
        assert_eq!(
            value["price_comparison"]["cheaper_option"],
            json!("GlowBoost Vitamin C Serum")
        );
        assert_eq!(value["usage_comparison"]["RadiantPlus Serum"], json!("Apply at night"));
        assert_eq!(value["products"]["product_b"], json!("RadiantPlus Serum"));
    }

    #[test]
    fn requires_both_names() {
        let generator = ScriptedGenerator::constant("verdict");
        let mut unnamed = radiantplus();
        unnamed.name = String::new();
        let err = compare_products(&generator, &glowboost(), &unnamed).expect_err("no name");
        assert_eq!(err, PipelineError::MissingProductName);
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn rejects_names_that_collide_with_block_fields() {
        let generator = ScriptedGenerator::constant("verdict");
        for reserved in ["cheaper_option", "verdict"] {
            let mut clashing = radiantplus();
            clashing.name = reserved.to_string();
            let err = compare_products(&generator, &glowboost(), &clashing).expect_err("reserved");
            assert_eq!(err, PipelineError::ReservedProductName(reserved.to_string()));
        }
        assert_eq!(generator.calls(), 0);
    }

    #[test]
    fn generator_failure_aborts_comparison() {
        let generator = ScriptedGenerator::new(|prompt| {
            if prompt.contains("skin types") {
                Err(anyhow!("timeout"))
            } else {
                Ok("fine".to_string())
            }
        });
        let err = compare_products(&generator, &glowboost(), &radiantplus())
            .expect_err("failing dimension");
        assert!(matches!(err, PipelineError::Generation(_)));
    }
}
