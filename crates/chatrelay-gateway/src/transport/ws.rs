//! WebSocket handler.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS and assign the connection id
//! - Own the per-connection outbound queue (hub deliveries + local replies)
//! - Decode once, then forward typed events to the relay hub
//! - Lifecycle: server ping + idle timeout, always unregister on exit

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use chatrelay_core::error::{RelayError, Result};
use chatrelay_core::protocol::{ClientEvent, ServerEvent};
use chatrelay_core::ConnectionId;

use crate::app_state::AppState;
use crate::realtime::{Connection, HubEvent, HubHandle};
use crate::transport::codec::{decode, Inbound};

// --------------------
// Entry
// --------------------
pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        let id = ConnectionId::new(Uuid::new_v4().to_string());
        let span = tracing::info_span!("session", conn_id = %id);
        if let Err(e) = run_session(app, id, socket).instrument(span).await {
            tracing::warn!(error = %e, "session ended with error");
        }
    })
}

// --------------------
// Core session loop
// --------------------
async fn run_session(app: AppState, id: ConnectionId, socket: WebSocket) -> Result<()> {
    let hub = app.hub().clone();

    // ---- outbound channel
    let (out_tx, out_rx) = mpsc::channel::<Message>(app.cfg().server.outbound_queue);

    hub.send(HubEvent::Connect {
        id: id.clone(),
        conn: Connection::new(out_tx.clone()),
    })
    .await?;

    let res = session_loop(&app, &hub, &id, socket, out_tx, out_rx).await;

    // The hub may already be gone during shutdown; nothing left to clean up then.
    let _ = hub.send(HubEvent::Disconnect { id: id.clone() }).await;
    tracing::debug!("session closed");
    res
}

async fn session_loop(
    app: &AppState,
    hub: &HubHandle,
    id: &ConnectionId,
    socket: WebSocket,
    out_tx: mpsc::Sender<Message>,
    mut out_rx: mpsc::Receiver<Message>,
) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let server = &app.cfg().server;
    let ping_every = Duration::from_millis(server.ping_interval_ms);
    let idle_timeout = Duration::from_millis(server.idle_timeout_ms);

    let mut ping_tick = tokio::time::interval_at(Instant::now() + ping_every, ping_every);
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                let Some(m) = maybe_out else { break; };
                if ws_tx.send(m).await.is_err() {
                    break;
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };

                last_activity = Instant::now();

                match decode(msg) {
                    Ok(Inbound::Event(ClientEvent::SetUsername(name))) => {
                        hub.send(HubEvent::SetName { id: id.clone(), name }).await?;
                    }
                    Ok(Inbound::Event(ClientEvent::ChatMessage(payload))) => {
                        hub.send(HubEvent::Chat { id: id.clone(), payload }).await?;
                    }
                    // tungstenite answers pings on its own.
                    Ok(Inbound::Ping(_)) | Ok(Inbound::Pong(_)) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        tracing::debug!(error = %e, "undecodable frame");
                        send_error(&out_tx, &e);
                    }
                }
            }

            // ping
            _ = ping_tick.tick() => {
                let _ = out_tx.try_send(Message::Ping(Vec::new()));
            }

            // idle timeout
            _ = tokio::time::sleep_until(last_activity + idle_timeout) => {
                tracing::info!("idle timeout");
                break;
            }
        }
    }

    Ok(())
}

fn send_error(out_tx: &mpsc::Sender<Message>, err: &RelayError) {
    match ServerEvent::error(err).to_json() {
        Ok(s) => {
            let _ = out_tx.try_send(Message::Text(s));
        }
        Err(e) => tracing::warn!(error = %e, "error frame encode failed"),
    }
}
