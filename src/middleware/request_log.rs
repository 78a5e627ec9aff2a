use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

/// Tags each request with an id and logs it once the response head is ready.
/// For streamed bodies the elapsed time covers setup only, not the stream.
pub async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    log::debug!("request_id={request_id} method={method} uri={uri} started");
    let response = next.run(request).await;

    let status = response.status();
    let elapsed = started.elapsed();
    if status.is_server_error() {
        log::error!("request_id={request_id} method={method} uri={uri} status={status} elapsed={elapsed:?}");
    } else {
        log::info!("request_id={request_id} method={method} uri={uri} status={status} elapsed={elapsed:?}");
    }
    response
}
