//! WebSocket Message Types
//!
//! Gateway frame formats. Every frame is `{op, d, s, t}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::dto::response::CurrentUserResponse;
use crate::shared::error::ErrorResponse;

/// Gateway opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Event dispatch
    Dispatch = 0,
    /// Heartbeat
    Heartbeat = 1,
    /// Identify (connection init)
    Identify = 2,
    /// Request/response call
    Request = 5,
    /// Invalid session
    InvalidSession = 9,
    /// Hello
    Hello = 10,
    /// Heartbeat ACK
    HeartbeatAck = 11,
    /// Reply to a Request
    Response = 12,
}

impl OpCode {
    pub fn from_u8(op: u8) -> Option<Self> {
        Some(match op {
            0 => OpCode::Dispatch,
            1 => OpCode::Heartbeat,
            2 => OpCode::Identify,
            5 => OpCode::Request,
            9 => OpCode::InvalidSession,
            10 => OpCode::Hello,
            11 => OpCode::HeartbeatAck,
            12 => OpCode::Response,
            _ => return None,
        })
    }
}

/// Incoming gateway message
#[derive(Debug, Deserialize)]
pub struct GatewayReceive {
    pub op: u8,
    #[serde(default)]
    pub d: Option<Value>,
}

/// Outgoing gateway message
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySend {
    pub op: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

impl GatewaySend {
    fn op(op: OpCode, d: Option<Value>) -> Self {
        Self {
            op: op as u8,
            d,
            s: None,
            t: None,
        }
    }

    pub fn hello(heartbeat_interval: u64) -> Self {
        Self::op(
            OpCode::Hello,
            serde_json::to_value(HelloPayload { heartbeat_interval }).ok(),
        )
    }

    pub fn heartbeat_ack() -> Self {
        Self::op(OpCode::HeartbeatAck, None)
    }

    pub fn invalid_session() -> Self {
        Self::op(OpCode::InvalidSession, Some(Value::Bool(false)))
    }

    pub fn response(payload: ResponsePayload) -> Self {
        Self::op(OpCode::Response, serde_json::to_value(payload).ok())
    }

    pub fn dispatch(event_name: &str, sequence: u64, d: Value) -> Self {
        Self {
            op: OpCode::Dispatch as u8,
            d: Some(d),
            s: Some(sequence),
            t: Some(event_name.to_string()),
        }
    }
}

/// Hello payload (op 10)
#[derive(Debug, Serialize)]
pub struct HelloPayload {
    pub heartbeat_interval: u64,
}

/// Connection-init payload (op 2). The credential is read once, here.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectionInit {
    #[serde(rename = "Authorization", alias = "authorization", default)]
    pub authorization: Option<String>,
}

/// Ready payload (dispatch READY). `user` is null for anonymous connections.
#[derive(Debug, Serialize)]
pub struct ReadyPayload {
    pub user: Option<CurrentUserResponse>,
    pub session_id: String,
}

/// Request payload (op 5)
#[derive(Debug, Deserialize)]
pub struct RequestPayload {
    pub nonce: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Response payload (op 12). Exactly one of `data` / `error` is set.
#[derive(Debug, Serialize)]
pub struct ResponsePayload {
    pub nonce: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl ResponsePayload {
    pub fn ok(nonce: Value, data: Value) -> Self {
        Self {
            nonce,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(nonce: Value, error: ErrorResponse) -> Self {
        Self {
            nonce,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}
