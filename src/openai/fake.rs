use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::openai::{ChatClient, ChatRequest};

/// A scripted chat client for tests
///
/// Responses are returned in the order they were queued. Once the queue is
/// empty every call answers with a fixed default. Each call is recorded in
/// `requests`.
pub struct FakeChatClient {
    responses: Mutex<VecDeque<Result<Option<String>, String>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl Default for FakeChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeChatClient {
    pub const DEFAULT_RESPONSE: &'static str = "Fake default response";

    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(vec![]),
        }
    }

    pub fn with_response(self, response: &str) -> Self {
        self.push(Ok(Some(response.to_string())));
        self
    }

    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        for response in responses {
            self.push(Ok(Some(response.to_string())));
        }
        self
    }

    /// Next call returns a completion without content
    pub fn with_none_content_response(self) -> Self {
        self.push(Ok(None));
        self
    }

    /// Next call fails with `message`
    pub fn with_error(self, message: &str) -> Self {
        self.push(Err(message.to_string()));
        self
    }

    pub fn requested_models(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.model.clone())
            .collect()
    }

    fn push(&self, response: Result<Option<String>, String>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
    ) -> Result<Option<String>> {
        self.requests.lock().unwrap().push(ChatRequest {
            model: model.to_string(),
            message_count: messages.len(),
        });

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => Ok(Some(Self::DEFAULT_RESPONSE.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::{system_message, user_message};

    #[tokio::test]
    async fn returns_queued_responses_then_default() -> Result<()> {
        let client = FakeChatClient::new()
            .with_responses(vec!["First response", "Second response"]);

        let first = client
            .complete("gpt-4", vec![system_message("You are helpful")?])
            .await?;
        assert_eq!(first.as_deref(), Some("First response"));

        let second = client.complete("gpt-4", vec![]).await?;
        assert_eq!(second.as_deref(), Some("Second response"));

        let third = client.complete("gpt-4", vec![]).await?;
        assert_eq!(third.as_deref(), Some(FakeChatClient::DEFAULT_RESPONSE));
        Ok(())
    }

    #[tokio::test]
    async fn scripted_failures_and_empty_content() {
        let client = FakeChatClient::new()
            .with_none_content_response()
            .with_error("upstream unavailable");

        assert_eq!(client.complete("m", vec![]).await.unwrap(), None);
        let err = client.complete("m", vec![]).await.unwrap_err();
        assert_eq!(err.to_string(), "upstream unavailable");
    }

    #[tokio::test]
    async fn records_requests() -> Result<()> {
        let client = FakeChatClient::new();
        client
            .complete(
                "deepseek-chat",
                vec![system_message("judge")?, user_message("hello")?],
            )
            .await?;

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "deepseek-chat");
        assert_eq!(requests[0].message_count, 2);
        Ok(())
    }
}
