use axum::{
    body::Bytes,
    extract::{FromRef, State},
    response::Response,
    routing::post,
    Router,
};
use log::info;
use serde_json::Value;

use crate::error::{ApiError, GenerateError};
use crate::services::SharedBackend;
use crate::streaming::stream_response;
use crate::types::GENERATE_PATH;
use crate::validation::validate;

pub fn generate_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    SharedBackend: FromRef<S>,
{
    Router::new().route(GENERATE_PATH, post(generate_handler))
}

/// `POST /api/generate`: validate, open the configured backend, stream text.
/// Every error path here runs before the first body byte.
pub async fn generate_handler(
    State(backend): State<SharedBackend>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(GenerateError::from)?;
    let request = validate(&value).map_err(ApiError::Validation)?;

    info!(
        "Generating {} ({}, {}) via {:?}",
        request.content_type,
        request.tone,
        request.length,
        backend.mode()
    );

    let chunks = backend.open(&request).await?;
    Ok(stream_response(chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::generate;
    use crate::services::{fallback::FallbackBackend, ChunkStream, ContentBackend};
    use crate::types::{GenerationMode, GenerationRequest, Length};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use futures::stream::{self, StreamExt};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    struct FailingOpen;

    #[async_trait::async_trait]
    impl ContentBackend for FailingOpen {
        fn mode(&self) -> GenerationMode {
            GenerationMode::Live
        }

        async fn open(&self, _: &GenerationRequest) -> Result<ChunkStream, GenerateError> {
            Err(GenerateError::Upstream("invalid api key".to_string()))
        }
    }

    struct FailsMidStream;

    #[async_trait::async_trait]
    impl ContentBackend for FailsMidStream {
        fn mode(&self) -> GenerationMode {
            GenerationMode::Live
        }

        async fn open(&self, _: &GenerationRequest) -> Result<ChunkStream, GenerateError> {
            Ok(stream::iter(vec![
                Ok("Once upon ".to_string()),
                Err(GenerateError::Upstream("stream dropped".to_string())),
            ])
            .boxed())
        }
    }

    fn app(backend: SharedBackend) -> Router {
        generate_routes().with_state(backend)
    }

    fn fallback_app() -> Router {
        app(Arc::new(FallbackBackend::new(Duration::ZERO)))
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::post(GENERATE_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_streams_fallback_text() {
        let body = json!({
            "contentType": "social",
            "prompt": "electric bikes",
            "tone": "humorous",
            "length": "short",
        });
        let response = fallback_app()
            .oneshot(post_json(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        let expected = generate("social", "electric bikes", "humorous", Length::Short);
        assert_eq!(text, format!("{expected} "));
        assert!(text.contains("#electricbikes"));
        assert!(text.contains("I used to think electric bikes was a myth"));
    }

    #[tokio::test]
    async fn test_empty_prompt_is_400() {
        let body = json!({
            "contentType": "blog",
            "prompt": "",
            "tone": "casual",
            "length": "medium",
        });
        let response = fallback_app()
            .oneshot(post_json(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid request data");
        assert_eq!(json["details"]["prompt"][0], "Prompt is required");
    }

    #[tokio::test]
    async fn test_unknown_content_type_is_400() {
        let body = json!({
            "contentType": "poem",
            "prompt": "autumn",
            "tone": "casual",
            "length": "medium",
        });
        let response = fallback_app()
            .oneshot(post_json(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["details"]["contentType"].is_array());
    }

    #[tokio::test]
    async fn test_malformed_json_is_500() {
        let response = fallback_app()
            .oneshot(post_json("{\"contentType\": "))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "Generation failed" }));
    }

    #[tokio::test]
    async fn test_backend_failure_before_stream_is_500() {
        let body = json!({
            "contentType": "email",
            "prompt": "Q3 roadmap",
            "tone": "professional",
            "length": "long",
        });
        let response = app(Arc::new(FailingOpen))
            .oneshot(post_json(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Generation failed");
    }

    #[tokio::test]
    async fn test_mid_stream_failure_truncates_body() {
        let body = json!({
            "contentType": "blog",
            "prompt": "tides",
            "tone": "formal",
            "length": "short",
        });
        let response = app(Arc::new(FailsMidStream))
            .oneshot(post_json(body.to_string()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
    }

    #[tokio::test]
    async fn test_only_post_is_routed() {
        let response = fallback_app()
            .oneshot(Request::get(GENERATE_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
