use crate::evaluator::{Evaluation, Evaluator};
use crate::models::{ModelCatalog, Provider, ResolvedModel};
use crate::openai::{system_message, user_message, ChatClient};
use crate::prompts::{judge_user_prompt, JUDGE_SYSTEM_PROMPT};
use crate::scores::{parse_scores, Scores};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Evaluates a prompt by asking the selected model for an answer and then
/// having a judge model grade that answer.
///
/// `evaluation_result` is the answer text and `scores` is a [`Scores`]
/// object.
pub struct LlmEvaluator {
    clients: HashMap<Provider, Arc<dyn ChatClient>>,
    catalog: Arc<ModelCatalog>,
    judge_model: String,
}

impl LlmEvaluator {
    pub fn new(
        clients: HashMap<Provider, Arc<dyn ChatClient>>,
        catalog: Arc<ModelCatalog>,
        judge_model: impl Into<String>,
    ) -> Self {
        Self {
            clients,
            catalog,
            judge_model: judge_model.into(),
        }
    }

    pub fn providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.clients.contains_key(p))
            .collect()
    }

    fn client_for(&self, provider: Provider) -> Result<&Arc<dyn ChatClient>> {
        self.clients.get(&provider).ok_or_else(|| {
            anyhow::anyhow!("No client configured for provider {}", provider)
        })
    }

    async fn respond(&self, target: &ResolvedModel, prompt: &str) -> Result<String> {
        let client = self.client_for(target.provider)?;
        let response = client
            .complete(&target.model_id, vec![user_message(prompt)?])
            .await?;

        response.ok_or_else(|| {
            anyhow::anyhow!("Model {} returned no content", target.model_id)
        })
    }

    async fn judge(&self, prompt: &str, response: &str) -> Result<Scores> {
        let judge = self.catalog.resolve(&self.judge_model);
        let client = self.client_for(judge.provider)?;

        let messages = vec![
            system_message(JUDGE_SYSTEM_PROMPT)?,
            user_message(&judge_user_prompt(prompt, response))?,
        ];
        let verdict = client
            .complete(&judge.model_id, messages)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!("Judge {} returned no content", judge.model_id)
            })?;
        debug!("Judge verdict: {}", verdict);

        parse_scores(&verdict)
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    #[instrument(skip(self, prompt))]
    async fn evaluate(&self, model: &str, prompt: &str) -> Result<Evaluation> {
        let start_time = std::time::Instant::now();
        let target = self.catalog.resolve(model);
        info!(
            provider = %target.provider,
            model_id = %target.model_id,
            "Requesting model response"
        );

        let response = self.respond(&target, prompt).await?;
        let scores = self.judge(prompt, &response).await?;

        info!(
            duration_ms = start_time.elapsed().as_millis() as u64,
            fairness = scores.fairness,
            safety = scores.safety,
            bias = scores.bias,
            "Evaluation complete"
        );

        Ok(Evaluation::new(
            Value::String(response),
            serde_json::to_value(scores)?,
        ))
    }
}
