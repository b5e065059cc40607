//! WebSocket Gateway
//!
//! Real-time requests and events over WebSocket connections.

pub mod gateway;
pub mod handler;
pub mod messages;
pub mod requests;
pub mod session;

pub use gateway::{Gateway, GatewayEvent};
pub use handler::ws_handler;
pub use messages::{GatewayReceive, GatewaySend, OpCode};
pub use session::SessionState;
