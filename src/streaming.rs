use axum::{
    body::{Body, Bytes},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use crate::error::GenerateError;
use crate::services::ChunkStream;

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Response body fed by the pump task. Ends when the sender is dropped.
pub struct TextStream {
    receiver: mpsc::Receiver<Result<Bytes, GenerateError>>,
}

impl Stream for TextStream {
    type Item = Result<Bytes, GenerateError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Turns a chunk source into a progressively delivered plain-text response.
///
/// A task forwards chunks through a one-slot channel, so the source is only
/// polled as fast as the client reads. If the client goes away the send
/// fails and the source is dropped. A source error is passed to the body,
/// which aborts the chunked transfer instead of ending it cleanly.
pub fn stream_response(chunks: ChunkStream) -> Response {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(pump(chunks, tx));

    let mut response = Body::from_stream(TextStream { receiver: rx }).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

async fn pump(mut chunks: ChunkStream, tx: mpsc::Sender<Result<Bytes, GenerateError>>) {
    let mut sent = 0usize;
    while let Some(item) = chunks.next().await {
        match item {
            Ok(text) if text.is_empty() => continue,
            Ok(text) => {
                let len = text.len();
                if tx.send(Ok(Bytes::from(text))).await.is_err() {
                    log::info!("Client disconnected after {sent} bytes, stopping generation");
                    return;
                }
                sent += len;
            }
            Err(e) => {
                log::warn!("Generation stream failed after {sent} bytes: {e}");
                let _ = tx.send(Err(e)).await;
                return;
            }
        }
    }
    log::debug!("Generation stream finished, {sent} bytes sent");
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn chunks_of(items: Vec<Result<String, GenerateError>>) -> ChunkStream {
        stream::iter(items).boxed()
    }

    #[tokio::test]
    async fn test_body_is_concatenated_chunks() {
        let response = stream_response(chunks_of(vec![
            Ok("alpha ".to_string()),
            Ok(String::new()),
            Ok("beta ".to_string()),
        ]));
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"alpha beta ");
    }

    #[tokio::test]
    async fn test_chunks_arrive_separately_and_in_order() {
        let response = stream_response(chunks_of(vec![
            Ok("one ".to_string()),
            Ok("two ".to_string()),
            Ok("three ".to_string()),
        ]));
        let mut body = response.into_body().into_data_stream();
        let mut frames = Vec::new();
        while let Some(frame) = body.next().await {
            frames.push(frame.unwrap());
        }
        assert_eq!(frames, ["one ", "two ", "three "]);
    }

    #[tokio::test]
    async fn test_error_aborts_body() {
        let response = stream_response(chunks_of(vec![
            Ok("partial ".to_string()),
            Err(GenerateError::Upstream("connection reset".to_string())),
        ]));
        let mut body = response.into_body().into_data_stream();
        assert_eq!(body.next().await.unwrap().unwrap(), "partial ");
        assert!(body.next().await.unwrap().is_err());
    }

    #[tokio::test]
    async fn test_stops_pulling_when_client_disconnects() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let counter = pulled.clone();
        let endless = stream::repeat_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("word ".to_string())
        })
        .boxed();

        let response = stream_response(endless);
        let mut body = response.into_body().into_data_stream();
        body.next().await.unwrap().unwrap();
        drop(body);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        let after_drop = pulled.load(Ordering::SeqCst);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(pulled.load(Ordering::SeqCst), after_drop);
    }
}
