//! 实时分发层
//!
//! - [`hub`] - 房间成员与事件扇出
//! - [`snapshot`] - 新加入连接的快照

pub mod hub;
pub mod snapshot;

pub use hub::{Audience, ConnectionId, Envelope, RealtimeHub, Subscription};
pub use snapshot::{COMPLETED_HISTORY_LIMIT, build_snapshot};
