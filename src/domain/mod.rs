//! 领域模型模块
//!
//! 纯数据结构与键名推导，不依赖 tokio

pub mod build;

pub use build::{artifact_key, log_channel, BuildOutcome, BuildStatus, LogEvent};
