use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::db::seed::seed_default_menu;
use crate::menu::MenuService;
use crate::realtime::RealtimeHub;
use crate::tickets::TicketService;
use crate::timer::{TicketTimerExpiry, TimerScheduler};
use crate::utils::AppResult;
use crate::utils::time::{SharedClock, SystemClock};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段内部均为 Arc / 连接池，clone 成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | clock | SharedClock | 时间源 |
/// | hub | RealtimeHub | 房间广播 |
/// | timers | TimerScheduler | 工单计时器 |
/// | tickets | TicketService | 工单生命周期 |
/// | menu | MenuService | 菜单管理 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub clock: SharedClock,
    pub hub: RealtimeHub,
    pub timers: TimerScheduler,
    pub tickets: TicketService,
    pub menu: MenuService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 数据库 (迁移)
    /// 2. 默认菜单 (仅空库且 `seed_menu`)
    /// 3. 广播、计时器与业务服务
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        let db = DbService::new(&config.database_path).await?;
        Self::with_clock(config.clone(), db, Arc::new(SystemClock)).await
    }

    /// 使用指定时间源组装状态 (测试注入 `ManualClock`)
    pub async fn with_clock(config: Config, db: DbService, clock: SharedClock) -> AppResult<Self> {
        if config.seed_menu {
            seed_default_menu(&db.pool, clock.now_millis()).await?;
        }

        let hub = RealtimeHub::new(config.broadcast_capacity);
        let expiry = Arc::new(TicketTimerExpiry::new(db.pool.clone(), hub.clone()));
        let timers = TimerScheduler::new(clock.clone(), expiry);
        let tickets = TicketService::new(db.pool.clone(), clock.clone(), timers.clone(), hub.clone());
        let menu = MenuService::new(db.pool.clone(), clock.clone(), hub.clone());

        Ok(Self {
            config,
            db,
            clock,
            hub,
            timers,
            tickets,
            menu,
        })
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.db.pool
    }
}
