//! Realtime protocol types
//!
//! Kitchen-server → display pushes and display → kitchen-server commands,
//! carried as JSON text frames over the `/ws` WebSocket.

pub mod ws;

pub use ws::*;
