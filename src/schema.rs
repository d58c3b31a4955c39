//! Structural schemas for the three output documents.
//!
//! Validation works on plain JSON so it can check documents produced in this
//! run as well as documents read back from disk. Every violation is collected;
//! nothing here returns early on the first problem.
use crate::pages::{COMPARISON_PAGE_TYPE, FAQ_PAGE_TYPE, PRODUCT_PAGE_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One schema violation, located by a dotted path into the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub loc: String,
    pub message: String,
}

impl SchemaIssue {
    pub fn new(loc: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loc.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.loc, self.message)
        }
    }
}

/// Document name to its violations; empty means every document passed.
pub type SchemaErrors = BTreeMap<String, Vec<SchemaIssue>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Faq,
    Product,
    Comparison,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Faq,
        DocumentKind::Product,
        DocumentKind::Comparison,
    ];

    /// Name used as the key in [`SchemaErrors`].
    pub fn name(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq",
            DocumentKind::Product => "product",
            DocumentKind::Comparison => "comparison",
        }
    }

    /// File name used when documents are persisted.
    pub fn file_name(self) -> &'static str {
        match self {
            DocumentKind::Faq => "faq.json",
            DocumentKind::Product => "product_page.json",
            DocumentKind::Comparison => "comparison_page.json",
        }
    }

    fn page_type(self) -> &'static str {
        match self {
            DocumentKind::Faq => FAQ_PAGE_TYPE,
            DocumentKind::Product => PRODUCT_PAGE_TYPE,
            DocumentKind::Comparison => COMPARISON_PAGE_TYPE,
        }
    }
}

/// Validate one document; `None` is reported as a missing document.
pub fn validate_document(kind: DocumentKind, document: Option<&Value>) -> Vec<SchemaIssue> {
    let Some(document) = document else {
        return vec![SchemaIssue::new("", "document missing")];
    };
    let Some(object) = document.as_object() else {
        return vec![SchemaIssue::new("", "expected an object")];
    };

    let mut issues = Vec::new();
    match object.get("page_type").and_then(Value::as_str) {
        Some(page_type) if page_type == kind.page_type() => {}
        _ => issues.push(SchemaIssue::new(
            "page_type",
            format!("expected \"{}\"", kind.page_type()),
        )),
    }
    match kind {
        DocumentKind::Faq => check_faq(object, &mut issues),
        DocumentKind::Product => require_object(object, "content", &mut issues),
        DocumentKind::Comparison => require_object(object, "comparison", &mut issues),
    }
    issues
}

/// Validate all three documents independently.
pub fn validate_documents(
    faq: Option<&Value>,
    product: Option<&Value>,
    comparison: Option<&Value>,
) -> SchemaErrors {
    let documents = [
        (DocumentKind::Faq, faq),
        (DocumentKind::Product, product),
        (DocumentKind::Comparison, comparison),
    ];
    documents
        .into_iter()
        .filter_map(|(kind, document)| {
            let issues = validate_document(kind, document);
            (!issues.is_empty()).then(|| (kind.name().to_string(), issues))
        })
        .collect()
}

fn require_object(object: &Map<String, Value>, key: &str, issues: &mut Vec<SchemaIssue>) {
    if !object.get(key).is_some_and(Value::is_object) {
        issues.push(SchemaIssue::new(key, "expected an object"));
    }
}

fn check_faq(object: &Map<String, Value>, issues: &mut Vec<SchemaIssue>) {
    let total = object.get("total_questions").and_then(Value::as_u64);
    if total.is_none() {
        issues.push(SchemaIssue::new(
            "total_questions",
            "expected a non-negative integer",
        ));
    }
    let Some(items) = object.get("questions").and_then(Value::as_array) else {
        issues.push(SchemaIssue::new("questions", "expected an array"));
        return;
    };
    for (index, item) in items.iter().enumerate() {
        let Some(item) = item.as_object() else {
            issues.push(SchemaIssue::new(
                format!("questions.{index}"),
                "expected an object",
            ));
            continue;
        };
        for key in ["category", "question", "answer"] {
            if !item.get(key).is_some_and(Value::is_string) {
                issues.push(SchemaIssue::new(
                    format!("questions.{index}.{key}"),
                    "expected a string",
                ));
            }
        }
    }
    if let Some(total) = total {
        if total != items.len() as u64 {
            issues.push(SchemaIssue::new(
                "total_questions",
                format!("{total} does not match {} questions", items.len()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn faq(items: Value, total: Value) -> Value {
        json!({ "page_type": "faq", "total_questions": total, "questions": items })
    }

    #[test]
    fn accepts_well_formed_documents() {
        let faq = faq(
            json!([{ "category": "usage", "question": "How?", "answer": "Daily." }]),
            json!(1),
        );
        let product = json!({ "page_type": "product", "content": { "name": "X" } });
        let comparison = json!({ "page_type": "comparison", "comparison": {} });
        let errors = validate_documents(Some(&faq), Some(&product), Some(&comparison));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn zero_question_faq_is_valid() {
        assert!(validate_document(DocumentKind::Faq, Some(&faq(json!([]), json!(0)))).is_empty());
    }

    #[test]
    fn collects_every_faq_violation() {
        let document = json!({
            "page_type": "faq_page",
            "total_questions": 3,
            "questions": [
                { "category": "usage", "question": "How?" },
                "not an object"
            ]
        });
        let issues = validate_document(DocumentKind::Faq, Some(&document));
        let locs: Vec<&str> = issues.iter().map(|issue| issue.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec!["page_type", "questions.0.answer", "questions.1", "total_questions"]
        );
    }

    #[test]
    fn missing_documents_are_reported_not_fatal() {
        let product = json!({ "page_type": "product", "content": {} });
        let errors = validate_documents(None, Some(&product), None);
        assert_eq!(
            errors.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["comparison", "faq"]
        );
        assert_eq!(errors["faq"][0].message, "document missing");
    }

    #[test]
    fn rejects_wrong_payload_types() {
        let product = json!({ "page_type": "product", "content": [] });
        let issues = validate_document(DocumentKind::Product, Some(&product));
        assert_eq!(issues, vec![SchemaIssue::new("content", "expected an object")]);

        let issues = validate_document(DocumentKind::Comparison, Some(&json!("page")));
        assert_eq!(issues[0].to_string(), "expected an object");
    }
}
