use thiserror::Error;

use crate::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("failed to build upstream request: {0}")]
    Build(String),

    #[error("request body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(feature = "ssr")]
impl From<async_openai::error::OpenAIError> for GenerateError {
    fn from(e: async_openai::error::OpenAIError) -> Self {
        GenerateError::Upstream(e.to_string())
    }
}

/// Failures the generation endpoint turns into a status code. Only possible
/// before the first body byte is written.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request data: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Generate(#[from] GenerateError),
}

#[cfg(feature = "ssr")]
mod ssr {
    use axum::{
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;

    use super::ApiError;

    impl IntoResponse for ApiError {
        fn into_response(self) -> Response {
            match self {
                ApiError::Validation(details) => {
                    log::warn!("Rejected generation request: {details}");
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "Invalid request data", "details": details })),
                    )
                        .into_response()
                }
                ApiError::Generate(e) => {
                    log::error!("Generation failed before streaming: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Generation failed" })),
                    )
                        .into_response()
                }
            }
        }
    }
}
