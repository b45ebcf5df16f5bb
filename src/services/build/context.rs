//! 构建上下文
//!
//! 贯穿整个构建周期的发布入口：本地回显、进程内广播、Redis 发布

use tokio::sync::broadcast;
use tracing::info;

use crate::domain::build::LogEvent;
use crate::infra::log_publisher::{LogPublisher, PublishError};

/// 进程内事件通道容量
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 构建执行上下文
#[derive(Clone)]
pub struct BuildContext {
    /// 项目 ID
    pub project_id: String,
    /// Redis 日志发布器
    pub publisher: LogPublisher,
    /// 进程内事件镜像（无订阅者时发送失败被忽略）
    pub log_tx: Option<broadcast::Sender<LogEvent>>,
}

impl BuildContext {
    /// 创建不带进程内镜像的上下文
    pub fn new(project_id: String, publisher: LogPublisher) -> Self {
        Self {
            project_id,
            publisher,
            log_tx: None,
        }
    }

    /// 发布一条事件
    ///
    /// 先本地回显，再镜像到进程内通道，最后发布到 Redis。
    /// 只有 Redis 发布失败会返回错误，由调用方决定是否中止。
    pub async fn publish(&self, text: &str) -> Result<(), PublishError> {
        info!(project = %self.project_id, "{}", text);

        if let Some(ref tx) = self.log_tx {
            let _ = tx.send(LogEvent::new(text));
        }

        self.publisher.publish(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<LogEvent>) -> Vec<String> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.log);
        }
        events
    }

    #[tokio::test]
    async fn test_publish_mirrors_to_local_channel_in_order() {
        let (tx, mut rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ctx = BuildContext {
            project_id: "p1".to_string(),
            publisher: LogPublisher::disconnected("p1"),
            log_tx: Some(tx),
        };

        ctx.publish("first").await.unwrap();
        ctx.publish("second").await.unwrap();

        assert_eq!(drain(&mut rx), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_publish_without_local_channel() {
        let ctx = BuildContext::new("p1".to_string(), LogPublisher::disconnected("p1"));
        ctx.publish("no observers").await.unwrap();
    }
}
