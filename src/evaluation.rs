use crate::evaluator::Evaluation;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const MISSING_FIELDS_MESSAGE: &str = "Model and prompt are required";
pub const EVALUATION_FAILED_MESSAGE: &str = "Evaluation failed";
pub const NOT_CONFIGURED_MESSAGE: &str = "Evaluation service is not configured";

/// Body of `POST /api/evaluate_prompt` as it arrives. Fields are kept as raw
/// JSON so falsy values can be told apart from wrongly typed ones; absent and
/// `null` both decode to `None`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EvaluationRequestBody {
    pub model: Option<Value>,
    pub prompt: Option<Value>,
}

/// A request that passed validation: both fields present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationRequest {
    pub model: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// A field is absent, `null` or falsy (`""`, `false`, `0`, `[]`, `{}`)
    MissingField,
    /// A field holds a truthy value that is not a string
    NotAString(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValidationError::MissingField => {
                write!(f, "{}", MISSING_FIELDS_MESSAGE)
            }
            ValidationError::NotAString(field) => {
                write!(f, "{} must be a string", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

impl TryFrom<EvaluationRequestBody> for EvaluationRequest {
    type Error = ValidationError;

    fn try_from(body: EvaluationRequestBody) -> Result<Self, Self::Error> {
        // Presence is checked for both fields before any type check.
        let (model, prompt) = match (body.model, body.prompt) {
            (Some(model), Some(prompt))
                if !is_falsy(&model) && !is_falsy(&prompt) =>
            {
                (model, prompt)
            }
            _ => return Err(ValidationError::MissingField),
        };

        match (model, prompt) {
            (Value::String(model), Value::String(prompt)) => {
                Ok(Self { model, prompt })
            }
            (Value::String(_), _) => Err(ValidationError::NotAString("prompt")),
            _ => Err(ValidationError::NotAString("model")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub evaluation_result: Value,
    pub scores: Value,
}

impl From<Evaluation> for EvaluationResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            evaluation_result: evaluation.evaluation_result,
            scores: evaluation.scores,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Failures of the evaluate endpoint. Every variant renders as
/// `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    MissingField,
    NotAString(&'static str),
    InvalidBody(JsonRejection),
    NotConfigured,
    EvaluationFailed(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField => StatusCode::BAD_REQUEST,
            ApiError::NotAString(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::EvaluationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::MissingField => write!(f, "{}", MISSING_FIELDS_MESSAGE),
            ApiError::NotAString(field) => {
                write!(f, "{}", ValidationError::NotAString(field))
            }
            ApiError::InvalidBody(rejection) => {
                write!(f, "{}", rejection.body_text())
            }
            ApiError::NotConfigured => write!(f, "{}", NOT_CONFIGURED_MESSAGE),
            // The cause is logged, not returned.
            ApiError::EvaluationFailed(_) => {
                write!(f, "{}", EVALUATION_FAILED_MESSAGE)
            }
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::InvalidBody(rejection) => Some(rejection),
            ApiError::EvaluationFailed(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::MissingField => ApiError::MissingField,
            ValidationError::NotAString(field) => ApiError::NotAString(field),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
