//! Artifact enumeration
//!
//! Walks the dist directory once, right after the build exits, and derives
//! the upload plan: relative path, object key and content type per file.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::build::artifact_key;

/// 单个待上传产物
#[derive(Clone, Debug)]
pub struct Artifact {
    /// 本地绝对路径
    pub local_path: PathBuf,
    /// 相对 dist 目录的路径，`/` 分隔
    pub rel_path: String,
    /// 对象存储键 `__outputs/<project_id>/<rel_path>`
    pub remote_key: String,
    /// 按扩展名推导的 MIME 类型，未知扩展名为 None
    pub content_type: Option<&'static str>,
}

/// Enumerate regular files under `dist_dir`, depth-first.
///
/// Directories are skipped; enumeration order is whatever the walk yields.
/// A missing dist directory surfaces as the first walk error.
pub fn collect_artifacts(
    dist_dir: &Path,
    project_id: &str,
) -> Result<Vec<Artifact>, walkdir::Error> {
    let mut artifacts = Vec::new();

    for entry in WalkDir::new(dist_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = match entry.path().strip_prefix(dist_dir) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        artifacts.push(Artifact {
            local_path: entry.path().to_path_buf(),
            remote_key: artifact_key(project_id, &rel_path),
            content_type: mime_guess::from_path(entry.path()).first_raw(),
            rel_path,
        });
    }

    Ok(artifacts)
}
