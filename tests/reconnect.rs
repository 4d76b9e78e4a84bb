use futures_util::{SinkExt, StreamExt};
use jarvis::audio::{AudioSink, AudioUnit};
use jarvis::controller::SessionController;
use jarvis::mode::InputMode;
use jarvis::protocol::StatusState;
use jarvis::session::{socket, ConnectionConfig, ConnectionState};
use jarvis::state::AppEvent;
use serde_json::{json, Value};
use std::sync::mpsc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _unit: AudioUnit) {}
}

async fn next_text<S>(ws: &mut S) -> Option<String>
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}

/// First connection: records the resync plus one more frame, then closes.
/// Second: records the resync and closes. Third: records the resync, pushes
/// a status frame and stays open.
async fn serve(listener: TcpListener, seen: mpsc::Sender<Value>) {
    let mut index = 0;
    loop {
        let Ok((tcp, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(tcp).await else {
            continue;
        };
        let reads = if index == 0 { 2 } else { 1 };
        for _ in 0..reads {
            if let Some(text) = next_text(&mut ws).await {
                let _ = seen.send(serde_json::from_str(&text).unwrap());
            }
        }
        if index < 2 {
            let _ = ws.close(None).await;
        } else {
            let status = json!({"type": "status", "state": "listening"}).to_string();
            let _ = ws.send(Message::Text(status.into())).await;
            tokio::spawn(async move { while next_text(&mut ws).await.is_some() {} });
        }
        index += 1;
    }
}

#[test]
fn every_reopen_resyncs_voice_state_once() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let addr = listener.local_addr().unwrap();
    let (seen_tx, seen_rx) = mpsc::channel();
    rt.spawn(serve(listener, seen_tx));

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let config = ConnectionConfig {
        url: format!("ws://{}/ws/chat", addr),
        reconnect_delay: Duration::from_millis(50),
    };
    rt.spawn(socket::run_connection(config, event_tx));

    let mut controller = SessionController::new(InputMode::Voice, Box::new(SilentSink));
    let mut opens = 0;
    let mut closes = 0;
    while !(opens == 3 && controller.view().status == StatusState::Listening) {
        let event = event_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("session stalled");
        let opened = matches!(event, AppEvent::Connected(_));
        if matches!(event, AppEvent::Disconnected { .. }) {
            closes += 1;
        }
        controller.handle_event(event);
        if opened {
            opens += 1;
            if opens == 1 {
                // Pause capture; the next two reopens must carry `false`.
                controller.toggle_mic();
            }
        }
    }

    assert_eq!(closes, 2);
    assert_eq!(controller.view().connection, ConnectionState::Open);

    let toggle = |enabled: bool| json!({"type": "voice_toggle", "enabled": enabled});
    let seen: Vec<Value> = (0..4)
        .map(|_| seen_rx.recv_timeout(Duration::from_secs(5)).unwrap())
        .collect();
    assert_eq!(
        seen,
        vec![toggle(true), toggle(false), toggle(false), toggle(false)]
    );
    assert!(seen_rx.try_recv().is_err());

    rt.shutdown_background();
}
