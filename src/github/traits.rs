// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;

#[async_trait]
pub trait ReleaseHost: Send + Sync {
    /// Latest published release tag of a repository, or None if it cannot
    /// be determined (no releases, or the lookup failed).
    async fn latest_release_tag(&self, repo: &str) -> Option<String>;

    /// Whether the repository exists (responds 200, following redirects).
    async fn repo_exists(&self, repo: &str) -> bool;

    /// Ask the CI system to run `workflow` in `repo` against `git_ref`.
    /// Returns true if the dispatch was accepted.
    async fn dispatch_workflow(&self, repo: &str, workflow: &str, git_ref: &str) -> bool;
}
