use crate::domain::{InputError, PlayerHandle};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::utils::ids::next_conn_id;
use crate::use_cases::{WorldCommand, WorldError};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;
const JOIN_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    WorldClosed,
    SessionClosed,
    JoinRequired,
    JoinTimeout,
    InvalidName,
    NameTaken,
    ClosedBeforeJoin,
    TooManyInvalidMessages,
    UnsupportedMessage,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

impl NetError {
    // Close frame sent to the client when this error ends the session.
    fn close_frame(&self) -> Option<CloseFrame> {
        let (code, reason) = match self {
            NetError::JoinRequired => (close_code::POLICY, "join required"),
            NetError::JoinTimeout => (close_code::POLICY, "join timeout"),
            NetError::InvalidName => (close_code::POLICY, "invalid name"),
            NetError::NameTaken => (close_code::POLICY, "name taken"),
            NetError::TooManyInvalidMessages => (close_code::POLICY, "too many invalid messages"),
            NetError::UnsupportedMessage => {
                (close_code::UNSUPPORTED, "binary messages not supported")
            }
            NetError::WorldClosed | NetError::SessionClosed => {
                (close_code::AWAY, "world unavailable")
            }
            NetError::Ws(_) | NetError::Serialization(_) | NetError::ClosedBeforeJoin => {
                return None;
            }
        };
        Some(CloseFrame {
            code,
            reason: reason.into(),
        })
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        // Separate connection id for correlating logs before/after a player exists.
        let conn_id = next_conn_id();
        let span = info_span!("conn", conn_id, entity_id = tracing::field::Empty);
        handle_socket(socket, state).instrument(span)
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let handle = match bootstrap_connection(&mut socket, &state).await {
        Ok(handle) => handle,
        Err(NetError::ClosedBeforeJoin) => {
            info!("client disconnected before join handshake");
            return;
        }
        Err(e) => {
            warn!(error = ?e, "failed to bootstrap connection");
            if let Some(frame) = e.close_frame() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            let _ = socket.close().await;
            return;
        }
    };

    tracing::Span::current().record("entity_id", handle.id);
    info!(name = %handle.name, "client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut tick_rx = state.tick_tx.subscribe();
    let mut inbound = InboundStats::new();
    let mut outbound = OutboundStats::default();

    // Inbound and outbound actors run side by side; whichever stops first ends the session.
    let outcome = tokio::select! {
        result = inbound_actor(&mut receiver, &handle, &mut inbound) => result,
        result = outbound_actor(&mut sender, &handle, &mut tick_rx, &mut outbound) => result,
    };

    if let Err(e) = &outcome {
        warn!(error = ?e, "client session ended with error");
        if let Some(frame) = e.close_frame() {
            let _ = sender.send(Message::Close(Some(frame))).await;
        }
    }
    if let Err(e) = sender.close().await {
        debug!(error = ?e, "socket close error");
    }

    disconnect_cleanup(&state.command_tx, &handle, &inbound, &outbound).await;
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
) -> Result<PlayerHandle, NetError> {
    let name = match timeout(JOIN_HANDSHAKE_TIMEOUT, read_join_handshake(socket)).await {
        Ok(result) => result?,
        Err(_) => return Err(NetError::JoinTimeout),
    };
    let name = validate_display_name(&name)?;

    // The world task owns spawning; wait for it to hand back the session.
    let (reply, reply_rx) = oneshot::channel();
    state
        .command_tx
        .send(WorldCommand::SpawnPlayer {
            name: name.clone(),
            reply,
        })
        .await
        .map_err(|_| NetError::WorldClosed)?;

    match reply_rx.await.map_err(|_| NetError::WorldClosed)? {
        Ok(handle) => Ok(handle),
        Err(WorldError::NameTaken) => {
            let _ = send_message(
                socket,
                &ServerMessage::Error {
                    message: "name taken".to_string(),
                },
            )
            .await;
            Err(NetError::NameTaken)
        }
        Err(e) => {
            warn!(name = %name, error = ?e, "player spawn failed");
            Err(NetError::WorldClosed)
        }
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<usize, NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    let bytes = txt.len();
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)?;
    Ok(bytes)
}

async fn read_join_handshake(socket: &mut WebSocket) -> Result<String, NetError> {
    loop {
        let Some(incoming) = socket.recv().await else {
            return Err(NetError::ClosedBeforeJoin);
        };

        match incoming.map_err(NetError::Ws)? {
            Message::Text(text) => {
                return match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join(payload)) => Ok(payload.name),
                    Ok(ClientMessage::Input(_)) | Err(_) => Err(NetError::JoinRequired),
                };
            }
            Message::Binary(_) => return Err(NetError::UnsupportedMessage),
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Err(NetError::ClosedBeforeJoin),
        }
    }
}

fn validate_display_name(value: &str) -> Result<String, NetError> {
    // Keep names compact and readable for game UI and logs.
    const MIN_LEN: usize = 3;
    const MAX_LEN: usize = 32;

    let len = value.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) || value.trim() != value {
        return Err(NetError::InvalidName);
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
    {
        return Err(NetError::InvalidName);
    }

    Ok(value.to_string())
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

struct InboundStats {
    msgs: u64,
    bytes: u64,
    invalid_json: u32,
    dropped_inputs: u64,
    last_input_full_log: Instant,
    last_invalid_log: Instant,
}

impl InboundStats {
    fn new() -> Self {
        let now = Instant::now() - LOG_THROTTLE;
        Self {
            msgs: 0,
            bytes: 0,
            invalid_json: 0,
            dropped_inputs: 0,
            last_input_full_log: now,
            last_invalid_log: now,
        }
    }
}

#[derive(Default)]
struct OutboundStats {
    msgs: u64,
    bytes: u64,
}

// Pushes client input batches into the session's single-slot queue.
async fn inbound_actor(
    receiver: &mut SplitStream<WebSocket>,
    handle: &PlayerHandle,
    stats: &mut InboundStats,
) -> Result<(), NetError> {
    while let Some(incoming) = receiver.next().await {
        match incoming.map_err(NetError::Ws)? {
            Message::Text(text) => {
                stats.msgs += 1;
                stats.bytes += text.len() as u64;

                match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Input(packet)) => match handle.try_push_input(packet.into()) {
                        Ok(()) => {}
                        Err(InputError::Full) => {
                            // A batch is already waiting for the next tick; drop this one.
                            stats.dropped_inputs += 1;
                            if should_log(&mut stats.last_input_full_log) {
                                warn!(
                                    dropped = stats.dropped_inputs,
                                    "input queue full; dropping input"
                                );
                            }
                        }
                        Err(InputError::Closed) => return Err(NetError::SessionClosed),
                    },
                    Ok(ClientMessage::Join(_)) => {
                        // Ignore repeated Join packets after bootstrap to keep the session stable.
                        if should_log(&mut stats.last_invalid_log) {
                            warn!("duplicate join ignored");
                        }
                    }
                    Err(parse_err) => {
                        stats.invalid_json += 1;
                        if should_log(&mut stats.last_invalid_log) {
                            warn!(
                                bytes = text.len(),
                                error = %parse_err,
                                "failed to parse client message"
                            );
                        }
                        if stats.invalid_json > MAX_INVALID_JSON {
                            return Err(NetError::TooManyInvalidMessages);
                        }
                    }
                }
            }
            Message::Binary(_) => return Err(NetError::UnsupportedMessage),
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => return Ok(()),
        }
    }

    info!("websocket closed");
    Ok(())
}

// Ships the session's accumulated packet once per tick and clears it.
async fn outbound_actor(
    sender: &mut SplitSink<WebSocket, Message>,
    handle: &PlayerHandle,
    tick_rx: &mut watch::Receiver<u64>,
    stats: &mut OutboundStats,
) -> Result<(), NetError> {
    loop {
        tick_rx.changed().await.map_err(|_| NetError::WorldClosed)?;
        if handle.is_closed() {
            return Err(NetError::SessionClosed);
        }

        let packet = handle.take_update();
        let msg = ServerMessage::Update(packet.into());
        let txt = serde_json::to_string(&msg).map_err(NetError::Serialization)?;
        let bytes = txt.len();
        sender
            .send(Message::Text(txt.into()))
            .await
            .map_err(NetError::Ws)?;
        stats.msgs += 1;
        stats.bytes += bytes as u64;
    }
}

async fn disconnect_cleanup(
    command_tx: &mpsc::Sender<WorldCommand>,
    handle: &PlayerHandle,
    inbound: &InboundStats,
    outbound: &OutboundStats,
) {
    if command_tx
        .send(WorldCommand::DespawnPlayer {
            name: handle.name.to_string(),
        })
        .await
        .is_err()
    {
        debug!("world task gone; nothing to despawn");
    }

    debug!(
        msgs_in = inbound.msgs,
        msgs_out = outbound.msgs,
        bytes_in = inbound.bytes,
        bytes_out = outbound.bytes,
        invalid_json = inbound.invalid_json,
        dropped_inputs = inbound.dropped_inputs,
        "connection stats"
    );
    info!("client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_name_is_valid_then_it_is_accepted() {
        assert_eq!(
            validate_display_name("Blue Falcon").ok(),
            Some("Blue Falcon".to_string())
        );
    }

    #[test]
    fn when_name_has_surrounding_whitespace_then_it_is_rejected() {
        assert!(matches!(
            validate_display_name(" Pilot"),
            Err(NetError::InvalidName)
        ));
        assert!(matches!(
            validate_display_name("Pilot "),
            Err(NetError::InvalidName)
        ));
    }

    #[test]
    fn when_name_length_or_charset_is_wrong_then_it_is_rejected() {
        assert!(validate_display_name("ab").is_err());
        assert!(validate_display_name(&"x".repeat(33)).is_err());
        assert!(validate_display_name("pilot!").is_err());
    }
}
