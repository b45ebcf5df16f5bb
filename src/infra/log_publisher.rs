//! 日志发布器
//!
//! 封装 Redis pub/sub 连接，把日志事件发布到 `logs:<project_id>` 频道

use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::config::RedisConfig;
use crate::domain::build::{log_channel, LogEvent};

/// 日志发布器
///
/// 持有一个可克隆的共享连接，所有事件按调用顺序发布。
/// 未连接时（本地测试、订阅端只走进程内广播）发布为 no-op。
#[derive(Clone)]
pub struct LogPublisher {
    conn: Option<ConnectionManager>,
    channel: String,
}

/// 发布错误
#[derive(Debug)]
pub enum PublishError {
    /// Redis 连接或 PUBLISH 失败
    Redis(redis::RedisError),
    /// 事件序列化失败
    Encode(serde_json::Error),
}

impl std::fmt::Display for PublishError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishError::Redis(e) => write!(f, "Redis error: {}", e),
            PublishError::Encode(e) => write!(f, "Failed to encode log event: {}", e),
        }
    }
}

impl std::error::Error for PublishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PublishError::Redis(e) => Some(e),
            PublishError::Encode(e) => Some(e),
        }
    }
}

impl LogPublisher {
    /// 连接 Redis 并绑定项目频道
    ///
    /// 连接失败直接返回错误，日志流是 worker 的核心契约
    pub async fn connect(config: &RedisConfig, project_id: &str) -> Result<Self, PublishError> {
        let info = redis::ConnectionInfo {
            addr: redis::ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: redis::RedisConnectionInfo {
                username: config.username.clone(),
                password: config.password.clone(),
                ..Default::default()
            },
        };

        let client = redis::Client::open(info).map_err(PublishError::Redis)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(PublishError::Redis)?;

        let channel = log_channel(project_id);
        info!(
            host = %config.host,
            port = config.port,
            channel = %channel,
            "Connected log publisher"
        );

        Ok(Self {
            conn: Some(conn),
            channel,
        })
    }

    /// 创建未连接的发布器，publish 变为 no-op
    pub fn disconnected(project_id: &str) -> Self {
        Self {
            conn: None,
            channel: log_channel(project_id),
        }
    }

    /// 是否持有真实连接
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// 频道名
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// 发布一条日志事件
    ///
    /// 序列化为 `{"log":"<text>"}` 后 PUBLISH 到项目频道。
    /// 不等待订阅端确认，传输层错误原样返回，由调用方决定是否中止。
    pub async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };

        let payload =
            serde_json::to_string(&LogEvent::new(text)).map_err(PublishError::Encode)?;

        let mut conn = conn.clone();
        let _receivers: i64 = conn
            .publish(&self.channel, payload)
            .await
            .map_err(PublishError::Redis)?;

        Ok(())
    }
}
