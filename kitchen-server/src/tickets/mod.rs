//! 工单模块
//!
//! - [`TicketService`] - 工单状态机 (create/start/complete/reset/extend/cancel)
//! - [`admission`] - 工位并发计时上限

pub mod admission;
pub mod service;

pub use admission::{EXTEND_SECONDS, station_capacity};
pub use service::TicketService;
