//! 构建相关领域模型

use serde::Serialize;

/// 日志频道前缀
pub const LOG_CHANNEL_PREFIX: &str = "logs:";

/// 对象键前缀
pub const ARTIFACT_KEY_PREFIX: &str = "__outputs";

/// 日志事件
///
/// 线上格式固定为 `{"log":"<text>"}`
#[derive(Clone, Debug, Serialize)]
pub struct LogEvent {
    pub log: String,
}

impl LogEvent {
    /// 创建新日志事件
    pub fn new(text: impl Into<String>) -> Self {
        Self { log: text.into() }
    }
}

/// 构建周期状态
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BuildStatus {
    Running,
    Success,
    Failed,
}

impl BuildStatus {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Running => "running",
            BuildStatus::Success => "success",
            BuildStatus::Failed => "failed",
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Success | BuildStatus::Failed)
    }
}

/// 构建结果
#[derive(Clone, Copy, Debug)]
pub struct BuildOutcome {
    /// 子进程退出码（被信号终止时为 -1）
    pub exit_code: i32,
    /// 是否因超时被终止
    pub timed_out: bool,
}

impl BuildOutcome {
    /// 构建成功等价于退出码 0 且未超时
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }
}

/// 项目的日志频道名
pub fn log_channel(project_id: &str) -> String {
    format!("{}{}", LOG_CHANNEL_PREFIX, project_id)
}

/// 产物在对象存储中的键
///
/// `rel_path` 是产物相对 dist 目录的路径，分隔符已规范化为 `/`
pub fn artifact_key(project_id: &str, rel_path: &str) -> String {
    format!("{}/{}/{}", ARTIFACT_KEY_PREFIX, project_id, rel_path)
}
