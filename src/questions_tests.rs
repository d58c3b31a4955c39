use super::*;
use crate::lm::scripted::ScriptedGenerator;
use crate::test_support::glowboost;
use anyhow::anyhow;

fn questions_of(list: &[GeneratedQuestion], category: Category) -> Vec<&str> {
    list.iter()
        .filter(|item| item.category == category)
        .map(|item| item.question.as_str())
        .collect()
}

#[test]
fn baseline_covers_every_category() {
    let list = generate_questions(&glowboost(), None).expect("baseline questions");
    assert_eq!(list.len(), Category::ALL.len() * MIN_QUESTIONS_PER_CATEGORY);
    for category in Category::ALL {
        let entries = questions_of(&list, category);
        assert_eq!(entries.len(), MIN_QUESTIONS_PER_CATEGORY, "{category}");
        assert!(entries.iter().all(|q| q.contains("GlowBoost Vitamin C Serum")));
    }
}

#[test]
fn flattening_is_category_major() {
    let list = generate_questions(&glowboost(), None).expect("baseline questions");
    let order: Vec<Category> = list.iter().map(|item| item.category).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
    assert_eq!(list[0].question, "What is GlowBoost Vitamin C Serum?");
}

#[test]
fn blank_name_falls_back_to_generic_subject() {
    let mut product = glowboost();
    product.name = "  ".to_string();
    let baseline = baseline_questions(&product);
    assert_eq!(baseline[&Category::Safety][0], "Is this product safe to use?");
}

#[test]
fn merge_dedupes_preserving_first_occurrence() {
    let mut base = CategorizedQuestions::new();
    base.insert(Category::Usage, vec!["Q1?".to_string(), "Q2?".to_string()]);
    let mut extra = CategorizedQuestions::new();
    extra.insert(Category::Usage, vec!["Q2?".to_string(), "Q3?".to_string()]);

    merge_questions(&mut base, extra);
    assert_eq!(base[&Category::Usage], vec!["Q1?", "Q2?", "Q3?"]);
}

#[test]
fn expansion_is_merged_when_well_formed() {
    let generator = ScriptedGenerator::constant(
        "```json\n{\"usage\": [\"Can GlowBoost Vitamin C Serum be layered?\", \"How should GlowBoost Vitamin C Serum be used?\"], \"unknown\": [\"Ignored?\"]}\n```",
    );
    let list = generate_questions(&glowboost(), Some(&generator)).expect("expanded questions");
    assert_eq!(generator.calls(), 1);
    let usage = questions_of(&list, Category::Usage);
    assert_eq!(usage.len(), MIN_QUESTIONS_PER_CATEGORY + 1);
    assert_eq!(usage[3], "Can GlowBoost Vitamin C Serum be layered?");
    assert!(!list.iter().any(|item| item.question == "Ignored?"));
}

#[test]
fn expansion_object_is_found_inside_prose_and_fences() {
    let text = "Here are more:\n```\n{\"safety\": [\"Is it safe daily?\"]}\n```\nEnjoy!";
    let parsed = parse_expansion(text).expect("object in fence");
    assert_eq!(parsed[&Category::Safety], vec!["Is it safe daily?"]);

    let parsed = parse_expansion("Sure: {\"pricing\": [\"Is it on sale?\"]}").expect("inline");
    assert_eq!(parsed[&Category::Pricing], vec!["Is it on sale?"]);

    let err = parse_expansion("} nothing here {").expect_err("no object");
    assert_eq!(err, "response holds no JSON object");
}

#[test]
fn unparseable_expansion_keeps_baseline() {
    let generator = ScriptedGenerator::constant("Sure! Here are some questions: ...");
    let list = generate_questions(&glowboost(), Some(&generator)).expect("baseline survives");
    assert_eq!(list.len(), Category::ALL.len() * MIN_QUESTIONS_PER_CATEGORY);
}

#[test]
fn malformed_expansion_shape_keeps_baseline() {
    for response in [
        r#"{"usage": "How?"}"#,
        r#"["How?"]"#,
        r#"{"usage": ["Not a question"]}"#,
        r#"{"safety": ["   "]}"#,
    ] {
        let generator = ScriptedGenerator::constant(response);
        let list = generate_questions(&glowboost(), Some(&generator)).expect("baseline survives");
        assert_eq!(
            list.len(),
            Category::ALL.len() * MIN_QUESTIONS_PER_CATEGORY,
            "response {response}"
        );
    }
}

#[test]
fn failing_expansion_call_keeps_baseline() {
    let generator = ScriptedGenerator::new(|_| Err(anyhow!("backend offline")));
    let list = generate_questions(&glowboost(), Some(&generator)).expect("baseline survives");
    assert_eq!(list.len(), Category::ALL.len() * MIN_QUESTIONS_PER_CATEGORY);
}

#[test]
fn expansion_prompt_names_every_category_key() {
    let generator = ScriptedGenerator::constant("{}");
    generate_questions(&glowboost(), Some(&generator)).expect("questions");
    let prompt = &generator.prompts()[0];
    for category in Category::ALL {
        assert!(prompt.contains(&format!("\"{category}\"")), "{category}");
    }
}

#[test]
fn validation_rejects_contract_violations() {
    let mut questions = baseline_questions(&glowboost());
    questions.remove(&Category::Pricing);
    assert!(matches!(
        validate_questions(&questions),
        Err(PipelineError::QuestionSchema(message)) if message.contains("pricing")
    ));

    let mut questions = baseline_questions(&glowboost());
    questions.insert(Category::Safety, vec!["Is it safe?".to_string()]);
    assert!(validate_questions(&questions).is_err());

    let mut questions = baseline_questions(&glowboost());
    questions
        .get_mut(&Category::Usage)
        .expect("usage present")
        .push("Apply daily.".to_string());
    assert!(validate_questions(&questions).is_err());
}

#[test]
fn category_lookup_is_case_insensitive() {
    assert_eq!(Category::parse("Safety"), Some(Category::Safety));
    assert_eq!(Category::parse(" PRICING "), Some(Category::Pricing));
    assert_eq!(Category::parse("purchase"), None);
}
