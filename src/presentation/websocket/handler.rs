//! WebSocket Connection Handler
//!
//! Hello, then a single Identify carrying the connection-init payload. The
//! identity resolved from it is pinned for the life of the connection, and
//! the connection stays open for anonymous callers.

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, timeout};
use uuid::Uuid;

use super::gateway::GatewayEvent;
use super::messages::{
    ConnectionInit, GatewayReceive, GatewaySend, OpCode, ReadyPayload, RequestPayload,
    ResponsePayload,
};
use super::requests::handle_request;
use super::session::SessionState;
use crate::application::dto::response::CurrentUserResponse;
use crate::application::services::CredentialSource;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Grace period on top of the advertised heartbeat interval
const HEARTBEAT_GRACE_MS: u64 = 10_000;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_size = state.settings.websocket.max_message_size;
    ws.max_message_size(max_size)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4().to_string();
    tracing::debug!(session_id = %session_id, "New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<GatewaySend>();

    // Subscribe before READY so no event published after it is missed
    let mut event_rx = state.events.subscribe();

    let sender_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(GatewaySend::hello(state.gateway.heartbeat_interval()));

    let identify_timeout = Duration::from_secs(state.settings.websocket.identify_timeout_secs);
    let init = match timeout(identify_timeout, wait_for_identify(&mut receiver)).await {
        Ok(Some(init)) => init,
        Ok(None) => {
            tracing::debug!(session_id = %session_id, "Connection closed before Identify");
            sender_task.abort();
            return;
        }
        Err(_) => {
            tracing::debug!(session_id = %session_id, "Identify timeout");
            let _ = tx.send(GatewaySend::invalid_session());
            drop(tx);
            let _ = sender_task.await;
            return;
        }
    };

    let mut session = open_session(&state, session_id.clone(), &init);

    state
        .gateway
        .register_session(session_id.clone(), session.user_id());

    if tx.send(ready_dispatch(&mut session)).is_err() {
        state.gateway.unregister_session(&session_id);
        sender_task.abort();
        return;
    }

    tracing::info!(
        user_id = ?session.user_id(),
        session_id = %session_id,
        "Gateway session ready"
    );

    let heartbeat_timeout_ms = state.gateway.heartbeat_interval() + HEARTBEAT_GRACE_MS;
    let mut heartbeat_check = interval(Duration::from_millis(heartbeat_timeout_ms));
    heartbeat_check.tick().await; // Skip first immediate tick

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = handle_message(&text, &mut session, &tx, &state).await {
                            tracing::debug!(
                                session_id = %session_id,
                                error = %e,
                                "Error handling message"
                            );
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(session_id = %session_id, "Connection closed");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(session_id = %session_id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }

            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if !session.wants(&event) {
                            continue;
                        }
                        let event = GatewayEvent::from(event);
                        let sequence = session.next_sequence();
                        let dispatch = GatewaySend::dispatch(event.event_name(), sequence, event.to_json());
                        if tx.send(dispatch).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(session_id = %session_id, skipped = n, "Event receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::error!("Event bus closed");
                        break;
                    }
                }
            }

            _ = heartbeat_check.tick() => {
                if !session.is_alive(heartbeat_timeout_ms) {
                    tracing::info!(session_id = %session_id, "Heartbeat timeout, closing connection");
                    break;
                }
            }
        }
    }

    state.gateway.unregister_session(&session_id);
    sender_task.abort();

    tracing::info!(
        user_id = ?session.user_id(),
        session_id = %session_id,
        "Gateway session closed"
    );
}

/// Read frames until an Identify arrives. A missing or malformed `d` counts
/// as an empty init payload, which resolves to an anonymous session.
async fn wait_for_identify<S>(receiver: &mut S) -> Option<ConnectionInit>
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let Ok(frame) = serde_json::from_str::<GatewayReceive>(&text) else {
                    continue;
                };
                if OpCode::from_u8(frame.op) == Some(OpCode::Identify) {
                    let init = frame
                        .d
                        .and_then(|d| serde_json::from_value::<ConnectionInit>(d).ok())
                        .unwrap_or_default();
                    return Some(init);
                }
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            _ => continue,
        }
    }
    None
}

/// Resolve the init payload and pin the result. This is the only place a
/// gateway connection's identity is resolved; later frames cannot change it.
fn open_session(state: &AppState, session_id: String, init: &ConnectionInit) -> SessionState {
    let current_user = state.identity.resolve(CredentialSource::Subscription {
        authorization: init.authorization.as_deref(),
    });
    SessionState::new(session_id, current_user)
}

fn ready_dispatch(session: &mut SessionState) -> GatewaySend {
    let ready = ReadyPayload {
        user: session.current_user().cloned().map(CurrentUserResponse::from),
        session_id: session.session_id.clone(),
    };
    let sequence = session.next_sequence();
    GatewaySend::dispatch(
        "READY",
        sequence,
        serde_json::to_value(ready).unwrap_or_default(),
    )
}

/// Handle one frame after READY
async fn handle_message(
    text: &str,
    session: &mut SessionState,
    tx: &mpsc::UnboundedSender<GatewaySend>,
    state: &AppState,
) -> Result<(), String> {
    let frame: GatewayReceive =
        serde_json::from_str(text).map_err(|e| format!("Invalid JSON: {}", e))?;

    match OpCode::from_u8(frame.op) {
        Some(OpCode::Heartbeat) => {
            session.heartbeat();
            let _ = tx.send(GatewaySend::heartbeat_ack());
            tracing::trace!(session_id = %session.session_id, "Heartbeat received");
        }

        Some(OpCode::Request) => {
            let d = frame.d.unwrap_or(Value::Null);
            let request: RequestPayload = match serde_json::from_value(d.clone()) {
                Ok(request) => request,
                Err(e) => {
                    // Without a nonce there is nothing to answer
                    let nonce = d.get("nonce").cloned().ok_or("Missing request payload")?;
                    let error = AppError::BadRequest(format!("Invalid request payload: {e}"));
                    let _ = tx.send(GatewaySend::response(ResponsePayload::err(
                        nonce,
                        error.to_body(),
                    )));
                    return Ok(());
                }
            };

            // A request also proves the client is alive
            session.heartbeat();

            let request_timeout =
                Duration::from_secs(state.settings.websocket.request_timeout_secs);
            let result = timeout(
                request_timeout,
                handle_request(state, session.current_user(), &request.method, request.params),
            )
            .await
            .unwrap_or_else(|_| Err(AppError::Timeout));

            let payload = match result {
                Ok(data) => ResponsePayload::ok(request.nonce, data),
                Err(e) => {
                    tracing::debug!(
                        session_id = %session.session_id,
                        method = %request.method,
                        error = %e,
                        "Gateway request failed"
                    );
                    ResponsePayload::err(request.nonce, e.to_body())
                }
            };
            let _ = tx.send(GatewaySend::response(payload));
        }

        // Identity is fixed for the connection
        Some(OpCode::Identify) => {
            tracing::debug!(session_id = %session.session_id, "Ignoring repeated Identify");
        }

        _ => {
            tracing::debug!(session_id = %session.session_id, op = frame.op, "Unknown opcode");
        }
    }

    Ok(())
}
