pub mod fake;
pub mod real;

use anyhow::Result;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use async_trait::async_trait;

/// A struct to define what a chat client was asked for
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub message_count: usize,
}

/// A trait that abstracts an OpenAI compatible chat endpoint
///
/// Real and fake clients implement it so the evaluator can be exercised
/// without network access.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `messages` to `model` and returns the content of the first
    /// choice, or `None` when the model produced no content.
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<Option<String>>;
}

pub fn system_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    let message = ChatCompletionRequestSystemMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build system message: {}", e))?;
    Ok(ChatCompletionRequestMessage::System(message))
}

pub fn user_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    let message = ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build user message: {}", e))?;
    Ok(ChatCompletionRequestMessage::User(message))
}
