use crate::models::Provider;
use crate::openai::ChatClient;
use anyhow::Result;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

// Chat client backed by async-openai
pub struct RealChatClient {
    client: Client<OpenAIConfig>,
}

impl RealChatClient {
    pub fn new(client: Client<OpenAIConfig>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatClient for RealChatClient {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<Option<String>> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()?;

        let response =
            self.client.chat().create(request).await.map_err(|e| {
                anyhow::anyhow!("Failed to create chat completion: {}", e)
            })?;
        debug!(model, choices = response.choices.len(), "Chat completion");

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

/// Builds a client for `provider` when an API key is available.
pub fn maybe_create_chat_client(
    provider: Provider,
    api_key: Option<String>,
    api_base: Option<String>,
) -> Result<Arc<dyn ChatClient>> {
    let api_key = api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No API key configured for {}", provider))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) =
        api_base.as_deref().or_else(|| provider.default_api_base())
    {
        config = config.with_api_base(base);
    }

    Ok(Arc::new(RealChatClient::new(Client::with_config(config))))
}
