use crate::evaluator::llm::LlmEvaluator;
use crate::evaluator::Evaluator;
use crate::models::{ModelCatalog, Provider};
use crate::openai::real::maybe_create_chat_client;
use crate::openai::ChatClient;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

pub mod app;
pub mod cli;
pub mod eval;
pub mod evaluation;
pub mod evaluator;
pub mod models;
pub mod openai;
pub mod prompts;
pub mod scores;

pub mod test_utils;

// Shared, read-only state handed to every request
pub struct AppState {
    pub evaluator: Option<Arc<dyn Evaluator>>,
    pub catalog: Arc<ModelCatalog>,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new_for_testing() -> Self {
        Self::new_for_testing_with_evaluator(None)
    }

    pub fn new_for_testing_with_evaluator(
        evaluator: Option<Arc<dyn Evaluator>>,
    ) -> Self {
        Self {
            evaluator,
            catalog: Arc::new(ModelCatalog::default()),
            static_dir: None,
        }
    }

    pub fn with_static_dir(mut self, static_dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(static_dir.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub api_key: Option<String>,
    pub api_base: Option<String>,
}

// Configuration needed to build AppState
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai: ProviderCredentials,
    pub gemini: ProviderCredentials,
    pub deepseek: ProviderCredentials,
    pub judge_model: String,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Configuration with no provider credentials and the default judge
    pub fn without_providers(static_dir: Option<PathBuf>) -> Self {
        Self {
            openai: ProviderCredentials::default(),
            gemini: ProviderCredentials::default(),
            deepseek: ProviderCredentials::default(),
            judge_model: "openai".to_string(),
            static_dir,
        }
    }

    fn credentials(&self, provider: Provider) -> &ProviderCredentials {
        match provider {
            Provider::OpenAI => &self.openai,
            Provider::Gemini => &self.gemini,
            Provider::DeepSeek => &self.deepseek,
        }
    }
}

/// Builds the LLM evaluator from whichever providers have credentials.
/// Returns `None` when no provider is usable.
pub fn build_evaluator(
    config: &AppConfig,
    catalog: Arc<ModelCatalog>,
) -> Option<Arc<dyn Evaluator>> {
    let mut clients: HashMap<Provider, Arc<dyn ChatClient>> = HashMap::new();

    for provider in Provider::ALL {
        let credentials = config.credentials(provider);
        match maybe_create_chat_client(
            provider,
            credentials.api_key.clone(),
            credentials.api_base.clone(),
        ) {
            Ok(client) => {
                info!("Configured {} client", provider);
                clients.insert(provider, client);
            }
            Err(e) => info!("Skipping {}: {}", provider, e),
        }
    }

    if clients.is_empty() {
        warn!("No evaluation provider configured; evaluations will be rejected");
        return None;
    }

    let judge = catalog.resolve(&config.judge_model);
    if !clients.contains_key(&judge.provider) {
        warn!(
            "Judge model {} uses {}, which has no client; evaluations will fail",
            judge.model_id, judge.provider
        );
    }

    let evaluator =
        LlmEvaluator::new(clients, catalog, config.judge_model.clone());
    info!(
        "Evaluating with providers {:?}, judge {}",
        evaluator.providers(),
        judge.model_id
    );
    Some(Arc::new(evaluator))
}

// Function to create AppState from configuration
pub fn create_app_state(config: AppConfig) -> Arc<AppState> {
    let catalog = Arc::new(ModelCatalog::default());
    let evaluator = build_evaluator(&config, catalog.clone());

    Arc::new(AppState {
        evaluator,
        catalog,
        static_dir: config.static_dir,
    })
}

/// Creates AppState around a caller supplied evaluator instead of the
/// LLM providers. Provider credentials in `config` are ignored.
///
/// ```
/// use prompt_eval::evaluator::blocking::BlockingEvaluator;
/// use prompt_eval::{create_app_state_with_evaluator, AppConfig};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let evaluator = BlockingEvaluator::new(|model, prompt| {
///     Ok((json!(format!("{model} says {prompt}")), json!({"clarity": 0.9})))
/// });
/// let state = create_app_state_with_evaluator(
///     AppConfig::without_providers(None),
///     Arc::new(evaluator),
/// );
/// let router = prompt_eval::app::routes(state);
/// # drop(router);
/// ```
pub fn create_app_state_with_evaluator(
    config: AppConfig,
    evaluator: Arc<dyn Evaluator>,
) -> Arc<AppState> {
    Arc::new(AppState {
        evaluator: Some(evaluator),
        catalog: Arc::new(ModelCatalog::default()),
        static_dir: config.static_dir,
    })
}
