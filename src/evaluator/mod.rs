pub mod blocking;
pub mod fake;
pub mod llm;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// What an evaluation produced. Both halves are opaque JSON and are handed
/// to the caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub evaluation_result: Value,
    pub scores: Value,
}

impl Evaluation {
    pub fn new(evaluation_result: Value, scores: Value) -> Self {
        Self {
            evaluation_result,
            scores,
        }
    }
}

/// The routine that scores a prompt against a named model
///
/// The HTTP layer only validates input and shapes output; everything about
/// how a prompt is evaluated lives behind this trait.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, model: &str, prompt: &str) -> Result<Evaluation>;
}
