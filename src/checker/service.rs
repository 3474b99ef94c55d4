// SPDX-License-Identifier: GPL-3.0-only
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

use crate::github::ReleaseHost;

/// Owner of the downstream packaging repositories.
const BUILD_OWNER: &str = "wcbing-build";

/// Suffix appended to the logical name to form the build repository.
const BUILD_SUFFIX: &str = "-debs";

/// Build repository for a logical package name, e.g. "foo" ->
/// "wcbing-build/foo-debs".
pub fn build_repo_name(name: &str) -> String {
    format!("{BUILD_OWNER}/{name}{BUILD_SUFFIX}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Build repo already carries the upstream tag.
    NoUpdateNeeded,
    /// Build repo has no release yet.
    NewBuildNeeded,
    /// Build repo is behind upstream.
    UpdateNeeded,
}

/// Compare the upstream tag against the build repo's tag (None when the
/// build repo has no resolvable release).
pub fn decide(upstream_tag: &str, build_tag: Option<&str>) -> SyncDecision {
    match build_tag {
        Some(tag) if tag == upstream_tag => SyncDecision::NoUpdateNeeded,
        Some(_) => SyncDecision::UpdateNeeded,
        None => SyncDecision::NewBuildNeeded,
    }
}

/// Outcome of a successfully dispatched build, rendered as the
/// user-facing confirmation line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub name: String,
    pub decision: SyncDecision,
    pub old_tag: Option<String>,
    pub new_tag: String,
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.old_tag {
            None => write!(f, "AddNew: {} -> {}", self.name, self.new_tag),
            Some(old) => write!(f, "Update: {} ({} -> {})", self.name, old, self.new_tag),
        }
    }
}

pub struct SyncChecker {
    host: Arc<dyn ReleaseHost>,
    workflow: String,
    git_ref: String,
}

impl SyncChecker {
    pub fn new(host: Arc<dyn ReleaseHost>, workflow: String, git_ref: String) -> Self {
        Self {
            host,
            workflow,
            git_ref,
        }
    }

    /// Check one mapping entry and dispatch a build if the build repo is
    /// behind upstream. Returns a report only when a dispatch was accepted;
    /// every failure is logged here and ends this entry only.
    pub async fn check_entry(&self, name: &str, upstream_repo: &str) -> Option<SyncReport> {
        let build_repo = build_repo_name(name);

        if !self.host.repo_exists(&build_repo).await {
            error!(build_repo = build_repo.as_str(), "Build repo not found");
            return None;
        }

        let Some(upstream_tag) = self.host.latest_release_tag(upstream_repo).await else {
            error!(name, repo = upstream_repo, "Can't get latest releases tag");
            return None;
        };

        // A missing build-repo tag is not fatal: it means the build repo
        // has no release yet and needs its first build.
        let build_tag = self.host.latest_release_tag(&build_repo).await;
        if build_tag.is_none() {
            error!(name, repo = build_repo.as_str(), "Can't get latest releases tag of build repo");
        }

        info!(
            upstream = upstream_repo,
            upstream_tag = upstream_tag.as_str(),
            build = build_repo.as_str(),
            build_tag = build_tag.as_deref().unwrap_or(""),
            "Resolved release tags"
        );

        let decision = decide(&upstream_tag, build_tag.as_deref());
        if decision == SyncDecision::NoUpdateNeeded {
            return None;
        }

        info!(name, build_repo = build_repo.as_str(), "Dispatching build");
        if !self
            .host
            .dispatch_workflow(&build_repo, &self.workflow, &self.git_ref)
            .await
        {
            error!(name, build_repo = build_repo.as_str(), "Failed to dispatch build");
            return None;
        }

        Some(SyncReport {
            name: name.to_string(),
            decision,
            old_tag: build_tag,
            new_tag: upstream_tag,
        })
    }
}
