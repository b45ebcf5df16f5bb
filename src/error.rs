//! 统一错误处理
//!
//! worker 顶层错误类型，聚合各子系统错误。任何一步失败都会中止
//! 剩余序列，已发布的日志事件保持原样。

use crate::config::ConfigError;
use crate::infra::artifact_store::StoreError;
use crate::infra::log_publisher::PublishError;
use crate::services::build::runner::BuildError;

/// 构建周期错误
#[derive(Debug)]
pub enum WorkerError {
    /// 配置加载失败
    Config(ConfigError),
    /// 日志发布失败
    Publish(PublishError),
    /// 构建命令无法执行（启动、等待、取消）
    Build(BuildError),
    /// 构建命令以非零退出码结束
    BuildFailed { exit_code: i32 },
    /// 构建超时被终止
    BuildTimedOut,
    /// 枚举构建产物失败（dist 目录缺失等）
    Enumerate(walkdir::Error),
    /// 产物上传失败
    Store(StoreError),
}

impl std::fmt::Display for WorkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkerError::Config(e) => write!(f, "Configuration error: {}", e),
            WorkerError::Publish(e) => write!(f, "Log publish failed: {}", e),
            WorkerError::Build(e) => write!(f, "Build execution failed: {}", e),
            WorkerError::BuildFailed { exit_code } => {
                write!(f, "Build failed with exit code {}", exit_code)
            }
            WorkerError::BuildTimedOut => write!(f, "Build timed out"),
            WorkerError::Enumerate(e) => {
                write!(f, "Failed to enumerate build outputs: {}", e)
            }
            WorkerError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkerError::Config(e) => Some(e),
            WorkerError::Publish(e) => Some(e),
            WorkerError::Build(e) => Some(e),
            WorkerError::Enumerate(e) => Some(e),
            WorkerError::Store(e) => Some(e),
            WorkerError::BuildFailed { .. } | WorkerError::BuildTimedOut => None,
        }
    }
}

impl From<ConfigError> for WorkerError {
    fn from(e: ConfigError) -> Self {
        WorkerError::Config(e)
    }
}

impl From<PublishError> for WorkerError {
    fn from(e: PublishError) -> Self {
        WorkerError::Publish(e)
    }
}

impl From<BuildError> for WorkerError {
    fn from(e: BuildError) -> Self {
        WorkerError::Build(e)
    }
}

impl From<walkdir::Error> for WorkerError {
    fn from(e: walkdir::Error) -> Self {
        WorkerError::Enumerate(e)
    }
}

impl From<StoreError> for WorkerError {
    fn from(e: StoreError) -> Self {
        WorkerError::Store(e)
    }
}
