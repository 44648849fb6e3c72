//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`Clock`] - 可注入的时钟 (测试用 [`ManualClock`])
//! - 日志、输入校验

pub mod error;
pub mod logger;
pub mod result;
pub mod time;
pub mod validation;

pub use error::{AppError, ErrorResponse};
pub use result::AppResult;
pub use time::{Clock, ManualClock, SystemClock};
