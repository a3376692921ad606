//! Server-Sent Events (SSE) relay for streaming requests.
//!
//! Upstream bytes are forwarded to the caller chunk by chunk, untouched and
//! unbuffered. The relay ends exactly once: when the upstream finishes, when
//! the upstream fails mid-stream, or when the caller goes away.

use crate::api::disconnect::DisconnectStream;
use crate::core::RelayCompletion;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use std::fmt::Display;

/// Relay an upstream byte stream until it ends or fails.
///
/// A failing chunk stops the relay: the error is logged and the outbound
/// body ends without an error payload, since the status line has already
/// been sent by then.
pub fn relay_upstream<S, E>(
    upstream: S,
    request_id: String,
    completion: RelayCompletion,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    async_stream::stream! {
        let mut upstream = Box::pin(upstream);
        let mut chunks = 0usize;
        let mut bytes_relayed = 0usize;
        let mut failure: Option<String> = None;

        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    chunks += 1;
                    bytes_relayed += bytes.len();
                    yield Ok::<Bytes, std::io::Error>(bytes);
                }
                Err(e) => {
                    failure = Some(e.to_string());
                    break;
                }
            }
        }

        completion.mark_completed();

        match failure {
            Some(error) => tracing::error!(
                request_id = %request_id,
                chunks = chunks,
                bytes = bytes_relayed,
                error = %error,
                "Stream error"
            ),
            None => tracing::debug!(
                request_id = %request_id,
                chunks = chunks,
                bytes = bytes_relayed,
                "Stream completed"
            ),
        }
    }
}

/// Build the caller-facing SSE response for an upstream response.
///
/// The status is always 200; the upstream status is not mirrored once
/// streaming has been selected.
pub fn create_sse_response(response: reqwest::Response, request_id: String) -> Response {
    sse_response_from_stream(response.bytes_stream(), request_id)
}

/// Build an SSE response around any upstream byte stream.
pub fn sse_response_from_stream<S, E>(upstream: S, request_id: String) -> Response
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let completion = RelayCompletion::new();
    let relay = relay_upstream(upstream, request_id.clone(), completion.clone());
    let body = Body::from_stream(DisconnectStream {
        stream: Box::pin(relay),
        completion,
        request_id,
    });

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response()
}
