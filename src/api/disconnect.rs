use crate::core::RelayCompletion;
use axum::body::Bytes;
use futures::stream::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Outbound SSE body that notices when the caller stops reading.
///
/// Dropping it drops the wrapped relay and with it the upstream response,
/// which closes the upstream connection. If the relay had not reached its
/// own end by then, the drop is reported as a client disconnect.
pub struct DisconnectStream<S> {
    pub stream: S,
    pub completion: RelayCompletion,
    pub request_id: String,
}

impl<S, E> Stream for DisconnectStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.stream).poll_next(cx)
    }
}

impl<S> Drop for DisconnectStream<S> {
    fn drop(&mut self) {
        if !self.completion.is_completed() {
            tracing::debug!(
                request_id = %self.request_id,
                "Client disconnected before the stream finished"
            );
        }
    }
}
