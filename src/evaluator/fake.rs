use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::evaluator::{Evaluation, Evaluator};

/// Arguments of one call into a [`FakeEvaluator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationCall {
    pub model: String,
    pub prompt: String,
}

/// An evaluator with scripted outcomes for tests
///
/// ```
/// use prompt_eval::evaluator::fake::FakeEvaluator;
/// use prompt_eval::evaluator::Evaluator;
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let evaluator = FakeEvaluator::new()
///         .with_evaluation(json!("looks good"), json!({"clarity": 0.9}));
///
///     let evaluation = evaluator.evaluate("gpt-x", "hello").await?;
///
///     assert_eq!(evaluation.evaluation_result, json!("looks good"));
///     assert_eq!(evaluator.call_count(), 1);
///     Ok(())
/// }
/// ```
pub struct FakeEvaluator {
    outcomes: Mutex<VecDeque<Result<Evaluation, String>>>,
    pub calls: Mutex<Vec<EvaluationCall>>,
}

impl Default for FakeEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEvaluator {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(vec![]),
        }
    }

    /// Returned when no outcome is queued
    pub fn default_evaluation() -> Evaluation {
        Evaluation::new(
            json!("Fake evaluation"),
            json!({"fairness": 5, "safety": 5, "bias": 5}),
        )
    }

    pub fn with_evaluation(self, evaluation_result: Value, scores: Value) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(Evaluation::new(evaluation_result, scores)));
        self
    }

    pub fn with_error(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Evaluator for FakeEvaluator {
    async fn evaluate(&self, model: &str, prompt: &str) -> Result<Evaluation> {
        self.calls.lock().unwrap().push(EvaluationCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
        });

        match self.outcomes.lock().unwrap().pop_front() {
            Some(Ok(evaluation)) => Ok(evaluation),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Self::default_evaluation()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outcomes_are_returned_in_order() {
        let evaluator = FakeEvaluator::new()
            .with_evaluation(json!("first"), json!(1))
            .with_error("second fails");

        let first = evaluator.evaluate("a", "b").await.unwrap();
        assert_eq!(first, Evaluation::new(json!("first"), json!(1)));

        let second = evaluator.evaluate("a", "b").await.unwrap_err();
        assert_eq!(second.to_string(), "second fails");

        let third = evaluator.evaluate("a", "b").await.unwrap();
        assert_eq!(third, FakeEvaluator::default_evaluation());
    }

    #[tokio::test]
    async fn records_calls() {
        let evaluator = FakeEvaluator::new();
        evaluator.evaluate("gpt-x", "hello").await.unwrap();

        let calls = evaluator.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![EvaluationCall {
                model: "gpt-x".to_string(),
                prompt: "hello".to_string(),
            }]
        );
    }
}
