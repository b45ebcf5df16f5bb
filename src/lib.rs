//! XJP Build Worker
//!
//! 单周期构建 worker：在工作目录执行项目的安装+构建命令，把构建输出
//! 逐行发布到 `logs:<project_id>` 频道，构建成功后把 dist 目录下的
//! 产物逐个上传到对象存储，全程发布进度事件，然后退出。

pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use config::env::constants;
use config::EnvConfig;
use domain::build::BuildStatus;
use error::WorkerError;
use infra::{ArtifactStore, LogPublisher};
use services::build::BuildContext;

/// 执行一次完整的构建-发布周期
///
/// 配置、连接、执行、收尾。失败时发布终止事件并原样返回错误，
/// 由可执行入口决定进程退出码。
pub async fn init_and_run_worker() -> Result<(), WorkerError> {
    let config = EnvConfig::from_env()?;
    info!(
        project = %config.project_id,
        version = constants::VERSION,
        work_dir = %config.output_dir.display(),
        "Build worker starting"
    );

    let publisher = LogPublisher::connect(&config.redis, &config.project_id).await?;
    let store = ArtifactStore::new(config.storage.as_ref());
    if !store.has_storage() {
        warn!("Artifact upload disabled: storage not configured");
    }

    // Ctrl-C 终止当前构建
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let ctx = BuildContext::new(config.project_id.clone(), publisher);
    let result = services::build::execute(
        &ctx,
        &store,
        &config.output_dir,
        &config.build_command,
        cancel,
        Duration::from_secs(constants::BUILD_TIMEOUT_SECS),
    )
    .await;

    if let Err(ref e) = result {
        error!(project = %config.project_id, error = %e, "Build cycle failed");
        // 终止事件让订阅端区分失败与停滞
        if let Err(pe) = ctx.publish(&format!("error: {}", e)).await {
            warn!(error = %pe, "Failed to publish terminal error event");
        }
    }

    let status = if result.is_ok() {
        BuildStatus::Success
    } else {
        BuildStatus::Failed
    };
    info!(
        project = %config.project_id,
        status = status.as_str(),
        "Build worker finished"
    );

    result
}
