//! 计时模块
//!
//! - [`TimerScheduler`] - 每张工单一个可取消的截止时间任务
//! - [`TicketTimerExpiry`] - 到期时复查工单并推送 `timer_ended`

pub mod expiry;
pub mod scheduler;

pub use expiry::TicketTimerExpiry;
pub use scheduler::{TimerExpiry, TimerScheduler};
