//! Server Implementation
//!
//! HTTP / WebSocket 服务器启动和管理

use std::time::Duration;

use crate::api::build_service;
use crate::core::{BackgroundTasks, Config, ServerState, TaskKind};
use crate::utils::logger::cleanup_old_logs;
use crate::utils::{AppError, AppResult};

/// 运行状态日志间隔
const STATS_INTERVAL: Duration = Duration::from_secs(300);

const LOG_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// HTTP Server
pub struct Server {
    config: Config,
    state: ServerState,
}

impl Server {
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self { config, state }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = self.state.clone();
        let tasks = start_background_tasks(&state);

        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

        // 监听就绪后才开始广播
        state.hub.mark_ready();
        tracing::info!("🦀 Kitchen server listening on {}", addr);

        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        let served = axum::serve(listener, build_service(state.clone()))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")));

        state.timers.shutdown();
        tasks.shutdown().await;
        served
    }
}

/// 注册后台任务
///
/// - `timer_reschedule` (Warmup): 按持久化的 startedAt / duration 恢复计时器
/// - `runtime_stats` (Periodic): 定期记录连接数与待触发计时器数
/// - `log_cleanup` (Periodic): 每天删除过期日志文件 (仅配置了 LOG_DIR)
fn start_background_tasks(state: &ServerState) -> BackgroundTasks {
    let mut tasks = BackgroundTasks::new();

    let timers = state.timers.clone();
    let pool = state.pool().clone();
    tasks.spawn("timer_reschedule", TaskKind::Warmup, async move {
        if let Err(e) = timers.reschedule_on_boot(&pool).await {
            tracing::error!(error = %e, "Failed to reschedule timers on boot");
        }
    });

    let hub = state.hub.clone();
    let timers = state.timers.clone();
    let token = tasks.shutdown_token();
    tasks.spawn("runtime_stats", TaskKind::Periodic, async move {
        let mut interval = tokio::time::interval(STATS_INTERVAL);
        interval.tick().await;
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    tracing::info!(
                        connections = hub.connection_count(),
                        pending_timers = timers.pending_count(),
                        "Runtime stats"
                    );
                }
            }
        }
    });

    if let Some(log_dir) = state.config.log_dir.clone() {
        let clock = state.clock.clone();
        let token = tasks.shutdown_token();
        tasks.spawn("log_cleanup", TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(LOG_CLEANUP_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if let Err(e) = cleanup_old_logs(std::path::Path::new(&log_dir), clock.today()) {
                            tracing::warn!(error = %e, "Log cleanup failed");
                        }
                    }
                }
            }
        });
    }

    tasks.log_summary();
    tasks
}
