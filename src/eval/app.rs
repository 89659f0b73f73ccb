use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::ModelsResponse;
use crate::evaluation::{
    EvaluationRequest, EvaluationRequestBody, EvaluationResponse,
};
use crate::{cli::CommonArgs, create_app_state, AppState};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    pub common_args: CommonArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a prompt against a model and print the result as JSON
    Evaluate {
        /// Model name, as accepted by the HTTP API
        #[arg(long)]
        model: String,

        /// Prompt to evaluate
        #[arg(long)]
        prompt: String,
    },

    /// List available models
    Models,
}

pub async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run_app(Cli::parse()).await
}

pub async fn run_app(cli: Cli) -> Result<()> {
    let state = create_app_state(cli.common_args.into_app_config(None));

    match cli.command {
        Commands::Evaluate { model, prompt } => {
            info!("Running evaluation with model: {}", model);
            println!("{}", run_evaluation(&state, &model, &prompt).await?);
        }
        Commands::Models => {
            println!("{}", list_models(&state)?);
        }
    }

    Ok(())
}

/// Validates and evaluates one prompt the same way the HTTP endpoint does,
/// returning the response body as pretty-printed JSON.
pub async fn run_evaluation(
    state: &AppState,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let request = EvaluationRequest::try_from(EvaluationRequestBody {
        model: Some(Value::String(model.to_string())),
        prompt: Some(Value::String(prompt.to_string())),
    })?;

    let evaluator = state.evaluator.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No evaluation provider configured. Set OPENAI_API_KEY, GEMINI_API_KEY or DEEPSEEK_API_KEY"
        )
    })?;

    let evaluation = evaluator.evaluate(&request.model, &request.prompt).await?;
    Ok(serde_json::to_string_pretty(&EvaluationResponse::from(
        evaluation,
    ))?)
}

pub fn list_models(state: &AppState) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ModelsResponse {
        models: state.catalog.models().to_vec(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::fake::FakeEvaluator;
    use crate::evaluator::Evaluator;
    use crate::evaluation::MISSING_FIELDS_MESSAGE;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn prints_the_http_response_shape() {
        let fake = Arc::new(
            FakeEvaluator::new()
                .with_evaluation(json!("looks good"), json!({"clarity": 0.9})),
        );
        let state = AppState::new_for_testing_with_evaluator(Some(
            fake.clone() as Arc<dyn Evaluator>,
        ));

        let output = run_evaluation(&state, "gpt-x", "hello").await.unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(
            value,
            json!({"evaluation_result": "looks good", "scores": {"clarity": 0.9}})
        );
        assert_eq!(fake.call_count(), 1);
    }

    #[tokio::test]
    async fn validates_before_evaluating() {
        let fake = Arc::new(FakeEvaluator::new());
        let state = AppState::new_for_testing_with_evaluator(Some(
            fake.clone() as Arc<dyn Evaluator>,
        ));

        let err = run_evaluation(&state, "gpt-x", "").await.unwrap_err();

        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn requires_a_configured_evaluator() {
        let state = AppState::new_for_testing();
        let err = run_evaluation(&state, "gpt-x", "hello").await.unwrap_err();
        assert!(err.to_string().starts_with("No evaluation provider"));
    }

    #[test]
    fn lists_catalog_models() {
        let output = list_models(&AppState::new_for_testing()).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        let ids: Vec<&str> = value["models"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["gemini", "openai", "deepseek"]);
    }

    #[test]
    fn parses_evaluate_command() {
        let cli = Cli::try_parse_from([
            "prompt_eval",
            "evaluate",
            "--model",
            "gemini",
            "--prompt",
            "hello",
        ])
        .unwrap();
        match cli.command {
            Commands::Evaluate { model, prompt } => {
                assert_eq!(model, "gemini");
                assert_eq!(prompt, "hello");
            }
            Commands::Models => panic!("expected evaluate command"),
        }
    }
}
