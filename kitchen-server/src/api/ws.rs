//! Display WebSocket endpoint
//!
//! GET /ws
//!
//! 协议:
//! - Display → Server: ClientCommand (Join, Ping)
//! - Server → Display: ServerMessage (Snapshot, Pong, ticket / timer / menu events)
//!
//! A connection receives nothing until it joins rooms. Every join replaces
//! the previous room set and is answered with a fresh snapshot.

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use shared::models::Room;
use shared::realtime::{ClientCommand, Pong, ServerMessage};
use tokio::sync::broadcast;
use tokio::time::Duration;

use crate::core::ServerState;
use crate::realtime::{ConnectionId, build_snapshot};

pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(handle_ws))
}

/// GET /ws
pub async fn handle_ws(State(state): State<ServerState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_session(socket, state))
}

async fn ws_session(socket: WebSocket, state: ServerState) {
    let (mut sink, mut stream) = socket.split();

    let mut subscription = state.hub.connect();
    let conn_id = subscription.id();
    tracing::info!(conn_id, "Display connected");

    let mut ping_interval =
        tokio::time::interval(Duration::from_secs(state.config.ws_ping_interval_secs));
    ping_interval.tick().await; // skip immediate

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            event = subscription.recv() => {
                match event {
                    Ok(msg) => {
                        if send_message(&mut sink, &msg).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(conn_id, lagged = n, "Display lagged, resending snapshot");
                        subscription.resubscribe();
                        let rooms = state.hub.rooms_of(conn_id);
                        if send_snapshot(&mut sink, &state, &rooms).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(cmd) = serde_json::from_str::<ClientCommand>(&text)
                            && handle_command(&mut sink, &state, conn_id, cmd).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    // dropping the subscription removes the memberships
    drop(subscription);
    tracing::info!(conn_id, "Display disconnected");
}

async fn handle_command<S>(
    sink: &mut S,
    state: &ServerState,
    conn_id: ConnectionId,
    cmd: ClientCommand,
) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    match cmd {
        ClientCommand::Join { rooms } => {
            let joined = state.hub.join(conn_id, &rooms[..]);
            send_snapshot(sink, state, &joined).await
        }
        ClientCommand::Ping { client_sent_ms } => {
            let pong = ServerMessage::Pong(Pong {
                server_now_ms: state.clock.now_millis(),
                client_sent_ms,
            });
            send_message(sink, &pong).await
        }
    }
}

/// Closes the connection with 1011 when the snapshot cannot be built
async fn send_snapshot<S>(sink: &mut S, state: &ServerState, rooms: &[Room]) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    match build_snapshot(state.pool(), rooms, state.clock.now_millis()).await {
        Ok(snapshot) => send_message(sink, &ServerMessage::Snapshot(snapshot)).await,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build snapshot, closing connection");
            let frame = CloseFrame {
                code: close_code::ERROR,
                reason: "snapshot unavailable".into(),
            };
            let _ = sink.send(Message::Close(Some(frame))).await;
            Err(())
        }
    }
}

async fn send_message<S>(sink: &mut S, msg: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
