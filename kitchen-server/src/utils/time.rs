//! 时间源
//!
//! 服务层从不直接读系统时钟，统一通过 [`Clock`] 取当前时间，
//! 测试中注入 [`ManualClock`] 即可精确控制 `startedAt` 等时间戳。

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, NaiveDate};

/// 当前时间 (Unix millis) 与营业日
pub trait Clock: Send + Sync + std::fmt::Debug + 'static {
    fn now_millis(&self) -> i64;

    /// Calendar date that new tickets are sequenced under.
    fn today(&self) -> NaiveDate;
}

pub type SharedClock = Arc<dyn Clock>;

/// 系统时钟：UTC 毫秒 + 服务器本地日期
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        shared::util::now_millis()
    }

    fn today(&self) -> NaiveDate {
        shared::util::local_today()
    }
}

/// 手动时钟 (测试用)
///
/// `today()` is the UTC date of the current instant.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self {
            now: AtomicI64::new(now_millis),
        }
    }

    pub fn set(&self, now_millis: i64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        DateTime::from_timestamp_millis(self.now_millis())
            .map(|dt| dt.date_naive())
            .unwrap_or(NaiveDate::MIN)
    }
}
