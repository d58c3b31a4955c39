//! Workflow orchestration for one FAQ/product/comparison run.
//!
//! The graph owns sequencing and the question retry cycle; nodes stay thin
//! adapters over the collaborator modules so each one can be tested alone.
mod graph;
mod nodes;
mod state;

pub use graph::{Collaborators, ExecutionGraph};
pub use state::{ExecutionState, QuestionLimits};

use crate::error::Result;
use crate::product::RawProduct;

/// Run the whole pipeline for one product pair.
pub fn run_pipeline(
    raw_product_a: RawProduct,
    raw_product_b: RawProduct,
    limits: QuestionLimits,
    collaborators: Collaborators<'_>,
) -> Result<ExecutionState> {
    let state = ExecutionState::new(raw_product_a, raw_product_b, limits);
    ExecutionGraph::new(collaborators).run(state)
}
