//! Shared types for the kitchen ticket system
//!
//! Types used by the kitchen-server and by station display clients:
//! menu and ticket models, the realtime wire protocol, countdown math
//! and the client-side clock-offset estimator.

pub mod clock;
pub mod daypart;
pub mod models;
pub mod realtime;
pub mod timing;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{MenuItem, Room, Source, Station, Ticket, TicketState};
pub use realtime::{ClientCommand, ServerMessage, Snapshot};
