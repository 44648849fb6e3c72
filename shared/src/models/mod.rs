//! Data models
//!
//! Shared between kitchen-server and display clients (via API and WebSocket).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are Unix millis.

pub mod menu_item;
pub mod patch;
pub mod station;
pub mod ticket;

// Re-exports
pub use menu_item::*;
pub use patch::Patch;
pub use station::*;
pub use ticket::*;
