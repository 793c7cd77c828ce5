// Chunked JSON streaming utilities (newline-delimited)
use axum::body::Body;
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::stream::Stream;
use futures::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast;

/// Create a chunked NDJSON streaming response, one message per line
pub fn chunked_json_stream<S, T>(stream: S) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let byte_stream = stream.map(|msg| serialize_chunk(&msg));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(byte_stream))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message to a newline-terminated chunk
fn serialize_chunk<T: Serialize>(msg: &T) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(msg)?;

    let mut chunk = BytesMut::with_capacity(json.len() + 1);
    chunk.put_slice(&json);
    chunk.put_u8(b'\n');

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a broadcast receiver.
/// Lagged receivers skip the messages they missed.
pub fn stream_from_receiver<T>(mut rx: broadcast::Receiver<T>) -> impl IntoResponse
where
    T: Serialize + Clone + Send + 'static,
{
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(msg) => yield msg,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event stream lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    match chunked_json_stream(stream) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_chunk_is_newline_terminated() {
        let chunk = serialize_chunk(&serde_json::json!({"panel": "avg_inventory_price"})).unwrap();
        assert_eq!(&chunk[..], b"{\"panel\":\"avg_inventory_price\"}\n");
    }

    #[tokio::test]
    async fn test_stream_from_receiver_ends_when_sender_drops() {
        let (tx, rx) = broadcast::channel(8);
        tx.send(1u32).unwrap();
        tx.send(2u32).unwrap();
        drop(tx);

        let response = stream_from_receiver(rx).into_response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/x-ndjson");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"1\n2\n");
    }
}
