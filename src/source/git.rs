use std::path::{Path, PathBuf};

use async_trait::async_trait;
use git2::{Repository, Sort};

use crate::config::GitConfig;
use crate::error::{AppError, Result};
use crate::source::CommitRangeSource;

/// Commit range read from a local clone.
///
/// Equivalent to `git rev-list <marker>^..HEAD --remotes=<glob>`: everything
/// reachable from `HEAD` or the mainline refs, down to and including the
/// marker commit, newest first.
pub struct GitCommitRange {
    repo_path: PathBuf,
    marker_ref: String,
    mainline_glob: String,
}

impl GitCommitRange {
    pub fn new(config: &GitConfig) -> Self {
        Self {
            repo_path: config.repo_path.clone(),
            marker_ref: config.marker_ref.clone(),
            mainline_glob: config.mainline_glob.clone(),
        }
    }
}

#[async_trait]
impl CommitRangeSource for GitCommitRange {
    async fn list_commits(&self) -> Result<Vec<String>> {
        let repo_path = self.repo_path.clone();
        let marker_ref = self.marker_ref.clone();
        let mainline_glob = self.mainline_glob.clone();

        let commits = tokio::task::spawn_blocking(move || {
            list_range(&repo_path, &marker_ref, &mainline_glob)
        })
        .await
        .map_err(|e| AppError::Git(format!("Rev-list task panicked: {e}")))??;

        tracing::info!(
            count = commits.len(),
            marker = %self.marker_ref,
            "Listed candidate commits"
        );

        Ok(commits)
    }
}

fn list_range(repo_path: &Path, marker_ref: &str, mainline_glob: &str) -> Result<Vec<String>> {
    let repo = Repository::open(repo_path)?;

    let marker = repo
        .revparse_single(marker_ref)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|e| {
            AppError::Git(format!(
                "Marker reference {marker_ref} not found: {}",
                e.message()
            ))
        })?;

    // `<marker>^` is the first parent only; side branches merged by the
    // marker stay in range.
    let first_parent = marker.parent_id(0).map_err(|_| {
        AppError::Git(format!("Marker commit {} has no parent", marker.id()))
    })?;

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TIME)?;
    walk.push_head()?;
    walk.push_glob(mainline_glob)?;
    walk.hide(first_parent)?;

    let commits = walk
        .map(|oid| oid.map(|oid| oid.to_string()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if commits.is_empty() {
        return Err(AppError::EmptyCommitRange(format!(
            "nothing between {marker_ref} and HEAD"
        )));
    }

    Ok(commits)
}
