use clap::Parser;
use std::path::PathBuf;

use crate::{AppConfig, ProviderCredentials};

/// Command-line arguments shared by the server and the evaluation CLI
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY")]
    pub openai_api_key: Option<String>,

    /// OpenAI API base URL
    #[arg(long, env = "OPENAI_API_BASE")]
    pub openai_api_base: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Gemini OpenAI-compatible API base URL
    #[arg(long, env = "GEMINI_API_BASE")]
    pub gemini_api_base: Option<String>,

    /// DeepSeek API key
    #[arg(long, env = "DEEPSEEK_API_KEY")]
    pub deepseek_api_key: Option<String>,

    /// DeepSeek API base URL
    #[arg(long, env = "DEEPSEEK_API_BASE")]
    pub deepseek_api_base: Option<String>,

    /// Model that grades responses (any name the catalog accepts)
    #[arg(long, env = "JUDGE_MODEL", default_value = "openai")]
    pub judge_model: String,
}

impl CommonArgs {
    pub fn into_app_config(self, static_dir: Option<PathBuf>) -> AppConfig {
        AppConfig {
            openai: ProviderCredentials {
                api_key: self.openai_api_key,
                api_base: self.openai_api_base,
            },
            gemini: ProviderCredentials {
                api_key: self.gemini_api_key,
                api_base: self.gemini_api_base,
            },
            deepseek: ProviderCredentials {
                api_key: self.deepseek_api_key,
                api_base: self.deepseek_api_base,
            },
            judge_model: self.judge_model,
            static_dir,
        }
    }
}
