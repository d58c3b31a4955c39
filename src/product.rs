//! Normalization of raw product records into the canonical product shape.
//!
//! Raw records are loosely typed JSON objects. Normalization is strict about
//! presence (every required field, reported together) and lenient about shape
//! (lists may arrive as comma-separated strings, prices as decorated text).
use crate::error::{PipelineError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Untyped product record as read from input JSON.
pub type RawProduct = Map<String, Value>;

/// Canonical product record consumed by every downstream stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub name: String,
    pub concentration: String,
    pub skin_type: Vec<String>,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
    pub usage: String,
    pub side_effects: String,
    pub price: Price,
}

/// Product price, either a bare amount or a `{currency, amount}` record.
///
/// A record price keeps its currency through normalization; its amount is
/// parsed like a bare price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(i64),
    Money { currency: String, amount: Value },
}

impl Price {
    /// Numeric amount, or `None` when the record form carries a non-number.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(value) => Some(*value as f64),
            Price::Money { amount, .. } => amount.as_f64(),
        }
    }

    /// JSON value reported in comparisons (the bare amount when present).
    pub fn reported_value(&self) -> Value {
        match self {
            Price::Amount(value) => Value::from(*value),
            Price::Money { amount, .. } => amount.clone(),
        }
    }
}

/// A required input field and the key it takes once normalized.
#[derive(Debug, Clone, Copy)]
struct Field {
    raw: &'static str,
    normalized: &'static str,
}

impl Field {
    const fn new(raw: &'static str, normalized: &'static str) -> Self {
        Self { raw, normalized }
    }

    fn value<'a>(&self, record: &'a RawProduct) -> Option<&'a Value> {
        record
            .get(self.raw)
            .or_else(|| record.get(self.normalized))
    }

    fn require<'a>(&self, record: &'a RawProduct) -> Result<&'a Value> {
        self.value(record).ok_or_else(|| PipelineError::MissingFields {
            fields: vec![self.raw.to_string()],
        })
    }
}

const NAME: Field = Field::new("product_name", "name");
const CONCENTRATION: Field = Field::new("concentration", "concentration");
const SKIN_TYPE: Field = Field::new("skin_type", "skin_type");
const INGREDIENTS: Field = Field::new("key_ingredients", "ingredients");
const BENEFITS: Field = Field::new("benefits", "benefits");
const USAGE: Field = Field::new("how_to_use", "usage");
const SIDE_EFFECTS: Field = Field::new("side_effects", "side_effects");
const PRICE: Field = Field::new("price", "price");

const REQUIRED_FIELDS: [Field; 8] = [
    NAME,
    CONCENTRATION,
    SKIN_TYPE,
    INGREDIENTS,
    BENEFITS,
    USAGE,
    SIDE_EFFECTS,
    PRICE,
];

/// Validate and normalize one raw product record.
///
/// Accepts both the raw input keys (`product_name`, `key_ingredients`,
/// `how_to_use`) and the normalized keys, so normalized output can be fed
/// back in unchanged.
pub fn normalize_product(raw: &RawProduct) -> Result<NormalizedProduct> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| field.value(raw).is_none())
        .map(|field| field.raw.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingFields { fields: missing });
    }

    Ok(NormalizedProduct {
        name: text_field(raw, NAME)?,
        concentration: text_field(raw, CONCENTRATION)?,
        skin_type: list_field(raw, SKIN_TYPE)?,
        ingredients: list_field(raw, INGREDIENTS)?,
        benefits: list_field(raw, BENEFITS)?,
        usage: text_field(raw, USAGE)?,
        side_effects: text_field(raw, SIDE_EFFECTS)?,
        price: price_field(PRICE.require(raw)?)?,
    })
}

/// Normalize both records of a pair, reporting every failure prefixed with
/// `product_a:` or `product_b:`.
pub fn normalize_pair(
    raw_a: &RawProduct,
    raw_b: &RawProduct,
) -> std::result::Result<(NormalizedProduct, NormalizedProduct), Vec<String>> {
    match (normalize_product(raw_a), normalize_product(raw_b)) {
        (Ok(product_a), Ok(product_b)) => Ok((product_a, product_b)),
        (parsed_a, parsed_b) => Err([("product_a", parsed_a), ("product_b", parsed_b)]
            .into_iter()
            .filter_map(|(label, parsed)| parsed.err().map(|err| format!("{label}: {err}")))
            .collect()),
    }
}

fn text_field(raw: &RawProduct, field: Field) -> Result<String> {
    match field.require(raw)? {
        Value::String(text) => Ok(text.trim().to_string()),
        _ => Err(PipelineError::InvalidField {
            field: field.raw,
            expected: "a string",
        }),
    }
}

fn list_field(raw: &RawProduct, field: Field) -> Result<Vec<String>> {
    let invalid = || PipelineError::InvalidField {
        field: field.raw,
        expected: "a string or a list of strings",
    };
    match field.require(raw)? {
        Value::String(text) => Ok(normalize_list(text.split(','))),
        Value::Array(items) => {
            let texts = items
                .iter()
                .map(|item| item.as_str().ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()?;
            Ok(normalize_list(texts))
        }
        _ => Err(invalid()),
    }
}

/// Trim entries and drop blanks; order and duplicates are kept.
fn normalize_list<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn price_field(value: &Value) -> Result<Price> {
    let Value::Object(record) = value else {
        return parse_price(value).map(Price::Amount);
    };
    let invalid = || PipelineError::InvalidPrice(value.to_string());
    let currency = record
        .get("currency")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|currency| !currency.is_empty())
        .ok_or_else(invalid)?;
    let amount = record.get("amount").ok_or_else(invalid)?;
    Ok(Price::Money {
        currency: currency.to_string(),
        amount: Value::from(parse_price(amount)?),
    })
}

/// Parse a price given as a number or as decorated text such as `"₹1,299.50"`.
///
/// The amount is truncated to an integer. Negative amounts and amounts beyond
/// `i64` are rejected.
pub fn parse_price(value: &Value) -> Result<i64> {
    let invalid = || PipelineError::InvalidPrice(value.to_string());
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(amount) if amount >= 0 => Ok(amount),
            Some(_) => Err(invalid()),
            None => number.as_f64().and_then(whole_amount).ok_or_else(invalid),
        },
        Value::String(text) => parse_price_text(text),
        _ => Err(invalid()),
    }
}

fn parse_price_text(text: &str) -> Result<i64> {
    let invalid = || PipelineError::InvalidPrice(text.to_string());
    let mut tokens = price_pattern().find_iter(text);
    let token = tokens.next().ok_or_else(invalid)?;
    // "12 for 2" is ambiguous, not decorated.
    if tokens.next().is_some() {
        return Err(invalid());
    }
    let amount: f64 = token
        .as_str()
        .replace(',', "")
        .parse()
        .map_err(|_| invalid())?;
    whole_amount(amount).ok_or_else(invalid)
}

/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn whole_amount(amount: f64) -> Option<i64> {
    (amount.is_finite() && amount >= 0.0 && amount < i64::MAX as f64).then(|| amount.trunc() as i64)
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("price pattern compiles"))
}

#[cfg(test)]
#[path = "product_tests.rs"]
mod tests;
