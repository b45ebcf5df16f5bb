//! 产物存储客户端
//!
//! 封装 S3 上传，每个产物一次 PutObject，文件内容流式传输不进内存

use std::path::{Path, PathBuf};

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::config::StorageConfig;

/// 产物存储客户端
///
/// 存储未配置时 upload 为 no-op，worker 退化为纯日志流模式
#[derive(Clone)]
pub struct ArtifactStore {
    client: Option<Client>,
    bucket: String,
}

/// 存储错误
#[derive(Debug)]
pub enum StoreError {
    /// 读取本地产物失败
    Read {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 上传到对象存储失败
    Upload {
        key: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Read { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
            StoreError::Upload { key, source } => {
                write!(f, "Failed to upload {}: {}", key, source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Read { source, .. } | StoreError::Upload { source, .. } => {
                Some(source.as_ref())
            }
        }
    }
}

impl ArtifactStore {
    /// 创建存储客户端
    ///
    /// 凭证与区域来自环境配置，None 表示存储未配置
    pub fn new(config: Option<&StorageConfig>) -> Self {
        match config {
            Some(config) => {
                let credentials = Credentials::new(
                    config.access_key.clone(),
                    config.secret_key.clone(),
                    None,
                    None,
                    "env",
                );
                let s3_config = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .credentials_provider(credentials)
                    .build();

                info!(
                    region = %config.region,
                    bucket = %config.bucket,
                    "Initialized artifact store"
                );

                Self {
                    client: Some(Client::from_conf(s3_config)),
                    bucket: config.bucket.clone(),
                }
            }
            None => Self {
                client: None,
                bucket: String::new(),
            },
        }
    }

    /// 是否配置了真实存储
    pub fn has_storage(&self) -> bool {
        self.client.is_some()
    }

    /// 上传单个产物
    ///
    /// body 通过 ByteStream 流式读取，content_type 缺失时不设置。
    /// 同键重复上传直接覆盖，无去重。
    pub async fn upload(
        &self,
        local_path: &Path,
        remote_key: &str,
        content_type: Option<&str>,
    ) -> Result<(), StoreError> {
        let Some(client) = &self.client else {
            debug!(key = %remote_key, "Storage not configured, skipping transfer");
            return Ok(());
        };

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StoreError::Read {
                path: local_path.to_path_buf(),
                source: Box::new(e),
            })?;

        client
            .put_object()
            .bucket(&self.bucket)
            .key(remote_key)
            .body(body)
            .set_content_type(content_type.map(String::from))
            .send()
            .await
            .map_err(|e| StoreError::Upload {
                key: remote_key.to_string(),
                source: Box::new(e),
            })?;

        Ok(())
    }
}
