//! WebSocket receive loop.

use futures_util::StreamExt;
use signalbot_core::error::SignalError;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

/// Connect to the receive socket and forward every text frame.
///
/// The channel carries one final `Err` when the socket fails, then closes.
/// Dropping the receiver closes the socket without waiting for another frame.
pub(super) async fn open(
    url: &str,
) -> Result<mpsc::Receiver<Result<String, SignalError>>, SignalError> {
    let (mut ws_stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| SignalError::Receive(format!("connect to {url} failed: {e}")))?;
    info!("connected to {url}");

    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                biased;
                _ = tx.closed() => {
                    debug!("receiver dropped, closing socket");
                    let _ = ws_stream.close(None).await;
                    return;
                }
                frame = ws_stream.next() => frame,
            };
            let Some(frame) = frame else { break };

            let payload = match frame {
                Ok(WsMessage::Text(text)) => text.to_string(),
                Ok(WsMessage::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("dropping non-utf8 binary frame: {e}");
                        continue;
                    }
                },
                Ok(WsMessage::Close(frame)) => {
                    debug!("receive socket closed by peer: {frame:?}");
                    let _ = tx
                        .send(Err(SignalError::Receive("socket closed by peer".into())))
                        .await;
                    return;
                }
                Ok(_) => continue,
                Err(e) => {
                    let _ = tx
                        .send(Err(SignalError::Receive(format!("socket error: {e}"))))
                        .await;
                    return;
                }
            };
            if tx.send(Ok(payload)).await.is_err() {
                // Consumer side dropped.
                let _ = ws_stream.close(None).await;
                return;
            }
        }
        let _ = tx
            .send(Err(SignalError::Receive("socket stream ended".into())))
            .await;
    });

    Ok(rx)
}
