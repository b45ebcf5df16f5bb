//! 基础设施模块
//!
//! 封装外部依赖（Redis pub/sub、对象存储）

pub mod artifact_store;
pub mod log_publisher;

pub use artifact_store::{ArtifactStore, StoreError};
pub use log_publisher::{LogPublisher, PublishError};
