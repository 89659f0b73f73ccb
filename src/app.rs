use crate::cli::CommonArgs;
use crate::evaluation::{
    ApiError, EvaluationRequest, EvaluationRequestBody, EvaluationResponse,
};
use crate::models::ModelInfo;
use crate::AppState;
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::compression::predicate::{
    NotForContentType, Predicate, SizeAbove,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{prelude::*, Registry};
use tracing_tree::HierarchicalLayer;

// Add build-time information
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to bind to
    #[arg(long, env = "PROMPT_EVAL_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "PROMPT_EVAL_PORT", default_value_t = 5000)]
    port: u16,

    /// Directory served at the web root
    #[arg(long, env = "PROMPT_EVAL_STATIC_DIR", default_value = "server/static")]
    static_dir: PathBuf,

    #[command(flatten)]
    common_args: CommonArgs,
}

// Health check endpoint
#[instrument]
pub async fn health_check() -> &'static str {
    debug!("Health check requested");
    "OK"
}

#[instrument(skip(state, payload))]
async fn evaluate_prompt(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluationRequestBody>, JsonRejection>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::from(rejection)
    })?;

    let request = EvaluationRequest::try_from(body)?;

    let evaluator = state.evaluator.as_ref().ok_or_else(|| {
        warn!("Evaluation requested but no evaluator is configured");
        ApiError::NotConfigured
    })?;

    info!(
        model = %request.model,
        prompt_chars = request.prompt.chars().count(),
        "Evaluating prompt"
    );
    let evaluation = evaluator
        .evaluate(&request.model, &request.prompt)
        .await
        .map_err(|e| {
            error!("Evaluation with model {} failed: {:#}", request.model, e);
            ApiError::EvaluationFailed(e)
        })?;

    Ok(Json(evaluation.into()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}

async fn get_available_models(
    State(state): State<Arc<AppState>>,
) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.catalog.models().to_vec(),
    })
}

pub fn routes(state: Arc<AppState>) -> Router {
    let predicate = SizeAbove::new(32)
        // images are already compressed
        .and(NotForContentType::IMAGES);

    let compression_layer = CompressionLayer::new()
        .br(true)
        .deflate(true)
        .gzip(true)
        .zstd(true)
        .compress_when(predicate);

    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/models", get(get_available_models))
        .route("/api/evaluate_prompt", post(evaluate_prompt));

    let router = match &state.static_dir {
        Some(static_dir) => router.fallback_service(ServeDir::new(static_dir)),
        None => router,
    };

    router
        .layer(cors_layer)
        .layer(compression_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received CTRL-C, shutting down"),
        Err(e) => error!("Failed to listen for CTRL-C: {}", e),
    }
}

pub async fn serve() -> Result<()> {
    // Initialize logging with tracing
    let subscriber = Registry::default()
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        );

    tracing::subscriber::set_global_default(subscriber).map_err(|e| {
        anyhow::anyhow!("Failed to set tracing subscriber: {}", e)
    })?;

    // Parse command line arguments
    let args = Args::parse();

    info!(
        "Starting prompt evaluation service, version {} built {}",
        built_info::PKG_VERSION,
        built_info::BUILT_TIME_UTC
    );

    if !args.static_dir.is_dir() {
        warn!(
            "Static directory {} does not exist; only API routes will respond",
            args.static_dir.display()
        );
    }

    let state = crate::create_app_state(
        args.common_args.into_app_config(Some(args.static_dir)),
    );

    // Start web server
    let app = routes(state);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn default_of(command: &clap::Command, id: &str) -> String {
        let arg = command
            .get_arguments()
            .find(|arg| arg.get_id() == id)
            .unwrap_or_else(|| panic!("no argument {}", id));
        arg.get_default_values()
            .iter()
            .map(|v| v.to_string_lossy().into_owned())
            .collect()
    }

    // Declared defaults, independent of PROMPT_EVAL_* and JUDGE_MODEL
    #[test]
    fn args_default_to_local_port_5000() {
        let command = Args::command();
        assert_eq!(default_of(&command, "port"), "5000");
        assert_eq!(default_of(&command, "host"), "127.0.0.1");
        assert_eq!(default_of(&command, "static_dir"), "server/static");
        assert_eq!(default_of(&command, "judge_model"), "openai");
    }

    #[test]
    fn args_accept_provider_flags() {
        let args = Args::try_parse_from([
            "prompt_eval_server",
            "--port",
            "8080",
            "--gemini-api-key",
            "g-key",
            "--judge-model",
            "gemini",
        ])
        .unwrap();
        assert_eq!(args.port, 8080);

        let config = args.common_args.into_app_config(None);
        assert_eq!(config.gemini.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.judge_model, "gemini");
    }
}
