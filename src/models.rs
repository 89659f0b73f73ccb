use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream API family a model is served from. Every provider speaks the
/// OpenAI chat completions protocol, only the base URL differs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Gemini,
    DeepSeek,
}

impl Provider {
    pub const ALL: [Provider; 3] =
        [Provider::OpenAI, Provider::Gemini, Provider::DeepSeek];

    /// Base URL used when none is configured. `None` keeps the
    /// async-openai default.
    pub fn default_api_base(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => None,
            Provider::Gemini => {
                Some("https://generativelanguage.googleapis.com/v1beta/openai")
            }
            Provider::DeepSeek => Some("https://api.deepseek.com"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Provider::OpenAI => write!(f, "openai"),
            Provider::Gemini => write!(f, "gemini"),
            Provider::DeepSeek => write!(f, "deepseek"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
    pub provider: Provider,
    pub model_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl ModelInfo {
    fn new(
        id: &str,
        display_name: &str,
        provider: Provider,
        model_id: &str,
        aliases: &[&str],
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            provider,
            model_id: model_id.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Where a request for a model name should be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub provider: Provider,
    pub model_id: String,
}

/// The models offered to callers, keyed by the names the web client sends.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(vec![
            ModelInfo::new(
                "gemini",
                "Gemini",
                Provider::Gemini,
                "gemini-2.0-flash",
                &[],
            ),
            ModelInfo::new(
                "openai",
                "GPT-4o mini",
                Provider::OpenAI,
                "gpt-4o-mini",
                &["gpt-4o", "gpt-4"],
            ),
            ModelInfo::new(
                "deepseek",
                "Deepseek",
                Provider::DeepSeek,
                "deepseek-chat",
                &[],
            ),
        ])
    }
}

impl ModelCatalog {
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    /// Resolves a caller supplied model name, ignoring ASCII case.
    /// Names that are not in the catalog are sent verbatim to OpenAI.
    pub fn resolve(&self, name: &str) -> ResolvedModel {
        match self.models.iter().find(|m| m.matches(name)) {
            Some(info) => ResolvedModel {
                provider: info.provider,
                model_id: info.model_id.clone(),
            },
            None => ResolvedModel {
                provider: Provider::OpenAI,
                model_id: name.to_string(),
            },
        }
    }
}
