//! 环境变量配置加载

use std::env;
use std::path::PathBuf;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 项目 ID，日志频道与对象键前缀都以它为作用域
    pub project_id: String,
    /// Redis pub/sub 配置
    pub redis: RedisConfig,
    /// 对象存储配置（缺失时跳过上传阶段）
    pub storage: Option<StorageConfig>,
    /// 构建工作目录（项目 checkout 所在目录）
    pub output_dir: PathBuf,
    /// 安装 + 构建命令
    pub build_command: String,
}

/// Redis 连接配置
#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// 对象存储配置
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
}

/// 配置加载错误
#[derive(Debug)]
pub enum ConfigError {
    /// PROJECT_ID 未设置或为空
    MissingProjectId,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingProjectId => write!(f, "PROJECT_ID is not set or empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EnvConfig {
    /// 从环境变量加载配置
    ///
    /// PROJECT_ID 是唯一的必填项，其余键都有默认值或整体可选
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_id = env_opt("PROJECT_ID").ok_or(ConfigError::MissingProjectId)?;

        let redis = RedisConfig::from_env();
        let storage = StorageConfig::from_env();

        let output_dir = PathBuf::from(env_or("BUILD_OUTPUT_DIR", constants::DEFAULT_OUTPUT_DIR));
        let build_command = env_or("BUILD_COMMAND", constants::DEFAULT_BUILD_COMMAND);

        Ok(Self {
            project_id,
            redis,
            storage,
            output_dir,
            build_command,
        })
    }
}

impl RedisConfig {
    /// 从环境变量加载 Redis 配置
    pub fn from_env() -> Self {
        let host = env_or("REDIS_HOST", "127.0.0.1");
        let port = env::var("REDIS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(6379);
        let username = env_opt("REDIS_USERNAME");
        let password = env_opt("REDIS_PASSWORD");

        Self {
            host,
            port,
            username,
            password,
        }
    }
}

impl StorageConfig {
    /// 从环境变量加载存储配置
    ///
    /// 四个键全部设置才返回 Some，否则上传阶段被禁用
    pub fn from_env() -> Option<Self> {
        let region = env_opt("S3_REGION")?;
        let access_key = env_opt("S3_ACCESS_KEY")?;
        let secret_key = env_opt("S3_SECRET_ACCESS_KEY")?;
        let bucket = env_opt("S3_BUCKET_NAME")?;

        Some(Self {
            region,
            access_key,
            secret_key,
            bucket,
        })
    }
}

/// 读取环境变量，空串视为未设置
fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

/// 读取环境变量，未设置时使用默认值
fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

/// 常量
pub mod constants {
    /// 构建超时（秒）
    pub const BUILD_TIMEOUT_SECS: u64 = 1800; // 30 分钟

    /// 构建产物子目录（相对于工作目录）
    pub const DIST_DIR: &str = "dist";

    /// 默认构建工作目录（相对于进程 cwd）
    pub const DEFAULT_OUTPUT_DIR: &str = "output";

    /// 默认安装 + 构建命令
    pub const DEFAULT_BUILD_COMMAND: &str = "npm install && npm run build";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_opt_filters_empty() {
        env::set_var("TEST_ENV_OPT_SET", "value");
        env::set_var("TEST_ENV_OPT_EMPTY", "");

        assert_eq!(env_opt("TEST_ENV_OPT_SET"), Some("value".to_string()));
        assert_eq!(env_opt("TEST_ENV_OPT_EMPTY"), None);
        assert_eq!(env_opt("TEST_ENV_OPT_MISSING"), None);

        env::remove_var("TEST_ENV_OPT_SET");
        env::remove_var("TEST_ENV_OPT_EMPTY");
    }

    #[test]
    fn test_env_or_default() {
        env::set_var("TEST_ENV_OR_SET", "custom");
        assert_eq!(env_or("TEST_ENV_OR_SET", "default"), "custom");
        assert_eq!(env_or("TEST_ENV_OR_MISSING", "default"), "default");
        env::remove_var("TEST_ENV_OR_SET");
    }

    #[test]
    fn test_storage_config_requires_all_keys() {
        // 全部设置 -> Some
        env::set_var("S3_REGION", "ap-east-1");
        env::set_var("S3_ACCESS_KEY", "ak");
        env::set_var("S3_SECRET_ACCESS_KEY", "sk");
        env::set_var("S3_BUCKET_NAME", "artifacts");

        let storage = StorageConfig::from_env().expect("all keys set");
        assert_eq!(storage.region, "ap-east-1");
        assert_eq!(storage.bucket, "artifacts");

        // 缺一个 -> None
        env::remove_var("S3_BUCKET_NAME");
        assert!(StorageConfig::from_env().is_none());

        env::remove_var("S3_REGION");
        env::remove_var("S3_ACCESS_KEY");
        env::remove_var("S3_SECRET_ACCESS_KEY");
    }
}
