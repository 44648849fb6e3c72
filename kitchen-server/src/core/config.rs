/// 服务器配置 - 厨房服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | HTTP_PORT | 3333 | HTTP / WebSocket 端口 |
/// | DATABASE_PATH | data/kitchen.db | SQLite 文件 |
/// | LOG_LEVEL | info | 日志级别 (RUST_LOG 优先) |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | (无) | 日志目录，存在时按天滚动写文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | SEED_MENU | 非 production 时 true | 空菜单时写入默认菜单 |
/// | WS_PING_INTERVAL_SECS | 30 | WebSocket 心跳间隔 |
/// | BROADCAST_CAPACITY | 256 | 事件广播通道容量 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 DATABASE_PATH=/data/kitchen.db cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    /// HTTP API 与 `/ws` 共用端口
    pub http_port: u16,
    pub database_path: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 首次启动写入默认菜单
    pub seed_menu: bool,
    pub ws_ping_interval_secs: u64,
    /// 慢连接落后超过该条数时重新发送快照
    pub broadcast_capacity: usize,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        Self {
            http_host: std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3333),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/kitchen.db".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            seed_menu: std::env::var("SEED_MENU")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(environment != "production"),
            ws_ping_interval_secs: std::env::var("WS_PING_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
            broadcast_capacity: std::env::var("BROADCAST_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|cap| *cap > 0)
                .unwrap_or(256),
            environment,
        }
    }

    /// 使用自定义数据库路径覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_database(database_path: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
