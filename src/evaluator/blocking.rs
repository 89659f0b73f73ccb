use crate::evaluator::{Evaluation, Evaluator};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

type EvaluateFn = dyn Fn(&str, &str) -> Result<(Value, Value)> + Send + Sync;

/// Adapts a synchronous evaluation function. Calls run on tokio's blocking
/// pool, so a slow function holds a blocking thread rather than a runtime
/// worker.
pub struct BlockingEvaluator {
    func: Arc<EvaluateFn>,
}

impl BlockingEvaluator {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(Value, Value)> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }
}

#[async_trait]
impl Evaluator for BlockingEvaluator {
    async fn evaluate(&self, model: &str, prompt: &str) -> Result<Evaluation> {
        let func = Arc::clone(&self.func);
        let model = model.to_string();
        let prompt = prompt.to_string();

        let (evaluation_result, scores) =
            tokio::task::spawn_blocking(move || (*func)(&model, &prompt))
                .await
                .map_err(|e| anyhow::anyhow!("Evaluation task failed: {}", e))??;

        Ok(Evaluation::new(evaluation_result, scores))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn runs_function_with_arguments() {
        let evaluator = BlockingEvaluator::new(|model, prompt| {
            Ok((json!(format!("{model}:{prompt}")), json!({"length": prompt.len()})))
        });

        let evaluation = evaluator.evaluate("gpt-x", "hello").await.unwrap();
        assert_eq!(evaluation.evaluation_result, json!("gpt-x:hello"));
        assert_eq!(evaluation.scores, json!({"length": 5}));
    }

    #[tokio::test]
    async fn propagates_function_errors() {
        let evaluator = BlockingEvaluator::new(|_, _| {
            Err(anyhow::anyhow!("model offline"))
        });

        let err = evaluator.evaluate("m", "p").await.unwrap_err();
        assert_eq!(err.to_string(), "model offline");
    }

    #[tokio::test]
    async fn reports_panics_as_errors() {
        let evaluator = BlockingEvaluator::new(|_, _| panic!("boom"));

        let err = evaluator.evaluate("m", "p").await.unwrap_err();
        assert!(err.to_string().starts_with("Evaluation task failed"));
    }
}
