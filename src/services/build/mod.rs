//! Build-and-publish cycle
//!
//! The top-level sequence: announce the build, run it, then upload the
//! dist tree file by file, one log event per notable step.

pub mod context;
pub mod runner;
pub mod upload;

pub use context::BuildContext;

use std::path::Path;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::env::constants::DIST_DIR;
use crate::error::WorkerError;
use crate::infra::artifact_store::ArtifactStore;

/// Run one complete build-and-publish cycle.
///
/// Strictly linear: any failure aborts the remaining steps and no `Done`
/// event is published. A non-zero build exit publishes a failure event and
/// skips the upload phase entirely.
pub async fn execute(
    ctx: &BuildContext,
    store: &ArtifactStore,
    work_dir: &Path,
    build_command: &str,
    cancel: CancellationToken,
    timeout: Duration,
) -> Result<(), WorkerError> {
    ctx.publish("Build Started...").await?;

    let outcome = runner::run(ctx, work_dir, build_command, cancel, timeout).await?;

    if outcome.timed_out {
        ctx.publish("Build Failed (timed out)").await?;
        return Err(WorkerError::BuildTimedOut);
    }
    if !outcome.success() {
        ctx.publish(&format!("Build Failed (exit code {})", outcome.exit_code))
            .await?;
        return Err(WorkerError::BuildFailed {
            exit_code: outcome.exit_code,
        });
    }
    ctx.publish("Build Complete").await?;

    let dist_dir = work_dir.join(DIST_DIR);
    let artifacts = upload::collect_artifacts(&dist_dir, &ctx.project_id)?;
    info!(
        project = %ctx.project_id,
        count = artifacts.len(),
        "Collected build artifacts"
    );

    ctx.publish("Starting to upload").await?;

    // Uploads are sequential, each awaited before the next, so the
    // uploading/uploaded pairs stay strictly ordered.
    for artifact in &artifacts {
        ctx.publish(&format!("uploading {}", artifact.rel_path))
            .await?;
        store
            .upload(&artifact.local_path, &artifact.remote_key, artifact.content_type)
            .await?;
        ctx.publish(&format!("uploaded {}", artifact.rel_path))
            .await?;
    }

    ctx.publish("Done").await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::build::LogEvent;
    use crate::infra::log_publisher::LogPublisher;
    use crate::services::build::context::EVENT_CHANNEL_CAPACITY;
    use std::fs;
    use tokio::sync::broadcast;

    fn test_context(project_id: &str) -> (BuildContext, broadcast::Receiver<LogEvent>) {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ctx = BuildContext {
            project_id: project_id.to_string(),
            publisher: LogPublisher::disconnected(project_id),
            log_tx: Some(tx),
        };
        (ctx, rx)
    }

    fn drain(rx: &mut broadcast::Receiver<LogEvent>) -> Vec<String> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event.log);
        }
        events
    }

    fn position(events: &[String], needle: &str) -> usize {
        events
            .iter()
            .position(|e| e == needle)
            .unwrap_or_else(|| panic!("event {:?} not found in {:?}", needle, events))
    }

    #[tokio::test]
    async fn test_execute_publishes_full_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path();
        fs::create_dir_all(work_dir.join("dist/assets")).unwrap();
        fs::write(work_dir.join("dist/index.html"), "<html></html>").unwrap();
        fs::write(work_dir.join("dist/assets/app.js"), "console.log(1)").unwrap();

        let (ctx, mut rx) = test_context("proj");
        let store = ArtifactStore::new(None);

        execute(
            &ctx,
            &store,
            work_dir,
            "echo building",
            CancellationToken::new(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        let events = drain(&mut rx);

        // lifecycle events appear exactly once, in order
        assert_eq!(events[0], "Build Started...");
        assert_eq!(events.last().unwrap(), "Done");
        let complete = position(&events, "Build Complete");
        let starting = position(&events, "Starting to upload");
        assert!(complete < starting);

        // build output sits between start and completion
        let output = position(&events, "building");
        assert!(output > 0 && output < complete);

        // each file yields an adjacent uploading/uploaded pair
        for rel in ["index.html", "assets/app.js"] {
            let up = position(&events, &format!("uploading {}", rel));
            assert!(up > starting);
            assert_eq!(events[up + 1], format!("uploaded {}", rel));
        }
    }

    #[tokio::test]
    async fn test_execute_failed_build_skips_upload_phase() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path();
        fs::create_dir_all(work_dir.join("dist")).unwrap();
        fs::write(work_dir.join("dist/index.html"), "stale").unwrap();

        let (ctx, mut rx) = test_context("proj");
        let store = ArtifactStore::new(None);

        let result = execute(
            &ctx,
            &store,
            work_dir,
            "echo partial && exit 3",
            CancellationToken::new(),
            Duration::from_secs(30),
        )
        .await;

        assert!(matches!(
            result,
            Err(WorkerError::BuildFailed { exit_code: 3 })
        ));

        let events = drain(&mut rx);
        assert_eq!(events.last().unwrap(), "Build Failed (exit code 3)");
        assert!(events.contains(&"partial".to_string()));
        assert!(!events.iter().any(|e| e == "Build Complete"));
        assert!(!events.iter().any(|e| e == "Starting to upload"));
        assert!(!events.iter().any(|e| e == "Done"));
    }

    #[tokio::test]
    async fn test_execute_missing_dist_dir_aborts_before_upload_events() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path();
        // build succeeds but produces no dist directory

        let (ctx, mut rx) = test_context("proj");
        let store = ArtifactStore::new(None);

        let result = execute(
            &ctx,
            &store,
            work_dir,
            "true",
            CancellationToken::new(),
            Duration::from_secs(30),
        )
        .await;

        assert!(matches!(result, Err(WorkerError::Enumerate(_))));

        let events = drain(&mut rx);
        assert_eq!(events.last().unwrap(), "Build Complete");
        assert!(!events.iter().any(|e| e == "Starting to upload"));
        assert!(!events.iter().any(|e| e == "Done"));
    }

    #[tokio::test]
    async fn test_execute_empty_dist_still_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path();
        fs::create_dir_all(work_dir.join("dist")).unwrap();

        let (ctx, mut rx) = test_context("proj");
        let store = ArtifactStore::new(None);

        execute(
            &ctx,
            &store,
            work_dir,
            "true",
            CancellationToken::new(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![
                "Build Started...",
                "Build Complete",
                "Starting to upload",
                "Done"
            ]
        );
    }
}
