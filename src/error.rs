//! Domain errors raised by the pipeline collaborators.
//!
//! Input validation and contract violations are typed so the graph can decide
//! which ones to record and which ones abort the run. Collaborators that talk
//! to the outside world (generators, disk) stay on `anyhow`.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("invalid field {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    #[error("comparison requires both products to carry a name")]
    MissingProductName,

    #[error("product name '{0}' collides with a comparison field")]
    ReservedProductName(String),

    #[error("question schema violation: {0}")]
    QuestionSchema(String),

    #[error("faq item schema violation: {0}")]
    FaqItemSchema(String),

    #[error("{stage} requires parsed products")]
    ProductsNotParsed { stage: &'static str },

    #[error("generation failed: {0}")]
    Generation(String),
}

impl PipelineError {
    pub fn generation(err: &anyhow::Error) -> Self {
        Self::Generation(format!("{err:#}"))
    }
}
