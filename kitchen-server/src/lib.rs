//! Kitchen Server - 后厨工单与计时服务
//!
//! # 架构概述
//!
//! - **工单** (`tickets`): create → start → complete 状态机，工位并发上限
//! - **计时** (`timer`): 每张工单一个可重置的截止时间任务，重启后恢复
//! - **实时** (`realtime`): 按工位 / 来源房间推送事件与快照
//! - **菜单** (`menu`): 菜品管理与菜单版本号
//! - **数据库** (`db`): SQLite (sqlx)
//! - **HTTP API** (`api`): REST 接口与 `/ws`
//!
//! # 模块结构
//!
//! ```text
//! kitchen-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、仓储、默认菜单
//! ├── tickets/       # 工单生命周期
//! ├── timer/         # 计时调度
//! ├── realtime/      # 房间广播
//! ├── menu/          # 菜单管理
//! └── utils/         # 错误、日志、时钟、校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod menu;
pub mod realtime;
pub mod tickets;
pub mod timer;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use menu::MenuService;
pub use realtime::RealtimeHub;
pub use tickets::TicketService;
pub use timer::TimerScheduler;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 按配置初始化日志
pub fn setup_environment(config: &Config) {
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
}

pub fn print_banner() {
    println!(
        r#"
   __ __ _ __       __
  / //_/(_) /______/ /_  ___  ____
 / ,<  / / __/ ___/ __ \/ _ \/ __ \
/ /| |/ / /_/ /__/ / / /  __/ / / /
/_/ |_/_/\__/\___/_/ /_/\___/_/ /_/
    "#
    );
}
