//! Shared fixtures for unit tests.
use crate::product::{NormalizedProduct, Price, RawProduct};
use serde_json::{json, Value};

fn object(value: Value) -> RawProduct {
    match value {
        Value::Object(map) => map,
        _ => panic!("fixture must be a JSON object"),
    }
}

pub(crate) fn raw_glowboost() -> RawProduct {
    object(json!({
        "product_name": "GlowBoost Vitamin C Serum",
        "concentration": "10% Vitamin C",
        "skin_type": ["Oily", "Combination"],
        "key_ingredients": ["Vitamin C", "Hyaluronic Acid"],
        "benefits": ["Brightening", "Fades dark spots"],
        "how_to_use": "Apply 2-3 drops in the morning before sunscreen",
        "side_effects": "Mild tingling for sensitive skin",
        "price": "₹699"
    }))
}

pub(crate) fn raw_radiantplus() -> RawProduct {
    object(json!({
        "product_name": "RadiantPlus Serum",
        "concentration": "8% Vitamin C",
        "skin_type": "Dry",
        "key_ingredients": "Vitamin C, Niacinamide",
        "benefits": ["Hydration", "Glow"],
        "how_to_use": "Apply at night",
        "side_effects": "None",
        "price": 799
    }))
}

pub(crate) fn glowboost() -> NormalizedProduct {
    NormalizedProduct {
        name: "GlowBoost Vitamin C Serum".to_string(),
        concentration: "10% Vitamin C".to_string(),
        skin_type: vec!["Oily".to_string(), "Combination".to_string()],
        ingredients: vec!["Vitamin C".to_string(), "Hyaluronic Acid".to_string()],
        benefits: vec!["Brightening".to_string(), "Fades dark spots".to_string()],
        usage: "Apply 2-3 drops in the morning before sunscreen".to_string(),
        side_effects: "Mild tingling for sensitive skin".to_string(),
        price: Price::Amount(699),
    }
}

pub(crate) fn radiantplus() -> NormalizedProduct {
    NormalizedProduct {
        name: "RadiantPlus Serum".to_string(),
        concentration: "8% Vitamin C".to_string(),
        skin_type: vec!["Dry".to_string()],
        ingredients: vec!["Vitamin C".to_string(), "Niacinamide".to_string()],
        benefits: vec!["Hydration".to_string(), "Glow".to_string()],
        usage: "Apply at night".to_string(),
        side_effects: "None".to_string(),
        price: Price::Amount(799),
    }
}
