use super::{ConnectionConfig, Link};
use crate::protocol::OutboundFrame;
use crate::state::AppEvent;
use chrono::Local;
use futures_util::{SinkExt, StreamExt};
use std::sync::mpsc::Sender as EventSender;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

enum SessionEnd {
    Closed(String),
    /// The event receiver is gone; the app is shutting down.
    Abandoned,
}

fn wall_ts() -> String {
    Local::now().format("%H:%M:%S%.3f").to_string()
}

/// Keeps the chat socket connected for as long as the event receiver lives.
///
/// Every close, including a failed connect, is reported as `Disconnected` and
/// followed by a fixed `reconnect_delay` before the next attempt. There is no
/// retry limit.
pub async fn run_connection(config: ConnectionConfig, event_tx: EventSender<AppEvent>) {
    let mut generation: u64 = 0;
    loop {
        generation += 1;
        if event_tx.send(AppEvent::Connecting { generation }).is_err() {
            return;
        }
        log::info!(
            "[ws] [{}] connecting to {} (attempt {})",
            wall_ts(),
            config.url,
            generation
        );

        let reason = match connect_async(config.url.as_str()).await {
            Ok((stream, _)) => match drive_connection(stream, generation, &event_tx).await {
                SessionEnd::Closed(reason) => reason,
                SessionEnd::Abandoned => return,
            },
            Err(e) => format!("connect failed: {}", e),
        };

        if event_tx
            .send(AppEvent::Disconnected {
                generation,
                reason: reason.clone(),
            })
            .is_err()
        {
            return;
        }
        log::info!(
            "[ws] [{}] disconnected ({}), retrying in {}ms",
            wall_ts(),
            reason,
            config.reconnect_delay.as_millis()
        );
        tokio::time::sleep(config.reconnect_delay).await;
    }
}

async fn drive_connection(
    stream: WsStream,
    generation: u64,
    event_tx: &EventSender<AppEvent>,
) -> SessionEnd {
    let (mut ws_tx, mut ws_rx) = stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<OutboundFrame>();

    if event_tx
        .send(AppEvent::Connected(Link::new(generation, out_tx)))
        .is_err()
    {
        let _ = ws_tx.close().await;
        return SessionEnd::Abandoned;
    }
    log::info!("[ws] [{}] connected (generation {})", wall_ts(), generation);

    // Single writer: frames leave in the order the controller issued them.
    let send_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let text = frame.encode();
            log::debug!("[ws] send: {}", text);
            if let Err(e) = ws_tx.send(tungstenite::Message::Text(text.into())).await {
                log::warn!("[ws] send failed: {}", e);
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    let end = loop {
        let msg = match ws_rx.next().await {
            Some(Ok(m)) => m,
            Some(Err(e)) => {
                log::warn!("[ws] websocket error: {}", e);
                break SessionEnd::Closed(e.to_string());
            }
            None => break SessionEnd::Closed("stream ended".into()),
        };
        match msg {
            tungstenite::Message::Text(text) => {
                if event_tx.send(AppEvent::Frame(text.to_string())).is_err() {
                    break SessionEnd::Abandoned;
                }
            }
            tungstenite::Message::Close(frame) => {
                let reason = match frame {
                    Some(frame) => format!("closed: {} {}", frame.code, frame.reason),
                    None => "closed".to_string(),
                };
                break SessionEnd::Closed(reason);
            }
            _ => continue,
        }
    };

    // The old handle is discarded outright; nothing queued on it is replayed.
    send_task.abort();
    end
}
