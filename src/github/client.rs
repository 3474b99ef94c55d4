// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{Client, StatusCode, redirect};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use crate::github::traits::ReleaseHost;

const USER_AGENT: &str = "debs-sync/0.1.0";

/// GitHub-backed [`ReleaseHost`].
///
/// Holds two clients: release tag lookups must see the redirect itself
/// (the tag is in the Location header), existence probes must follow it.
#[derive(Debug, Clone)]
pub struct GithubClient {
    follow: Client,
    no_redirect: Client,
    web_base: String,
    api_base: String,
    token: Option<String>,
    dry_run: bool,
}

impl GithubClient {
    pub fn new(token: Option<String>, dry_run: bool) -> anyhow::Result<Self> {
        Self::with_base_urls("https://github.com", "https://api.github.com", token, dry_run)
    }

    pub fn with_base_urls(
        web_base: impl Into<String>,
        api_base: impl Into<String>,
        token: Option<String>,
        dry_run: bool,
    ) -> anyhow::Result<Self> {
        let follow = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        let no_redirect = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            follow,
            no_redirect,
            web_base: web_base.into().trim_end_matches('/').to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            dry_run,
        })
    }
}

/// Extract the tag name from a "latest release" redirect target of the
/// shape `.../releases/tag/<TAG>`.
fn extract_tag(location: &str) -> Option<String> {
    let re = Regex::new(r".*releases/tag/([^/]+)").ok()?;
    re.captures(location)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl ReleaseHost for GithubClient {
    async fn latest_release_tag(&self, repo: &str) -> Option<String> {
        let url = format!("{}/{}/releases/latest", self.web_base, repo);

        let response = match self.no_redirect.head(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, repo, "Release tag lookup failed");
                return None;
            }
        };

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(extract_tag)
    }

    async fn repo_exists(&self, repo: &str) -> bool {
        let url = format!("{}/{}", self.web_base, repo);

        match self.follow.head(&url).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                error!(error = %e, repo, "Repository probe failed");
                false
            }
        }
    }

    async fn dispatch_workflow(&self, repo: &str, workflow: &str, git_ref: &str) -> bool {
        if self.dry_run {
            info!(repo, workflow, git_ref, "Dry-run dispatch, skipping request");
            return true;
        }

        let url = format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.api_base, repo, workflow
        );

        let mut request = self
            .follow
            .post(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .json(&json!({ "ref": git_ref }));
        if let Some(ref token) = self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, repo, workflow, "Workflow dispatch request failed");
                return false;
            }
        };

        if response.status() == StatusCode::NO_CONTENT {
            info!(repo, workflow, "Triggered workflow");
            true
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(repo, workflow, status = %status, body = %body, "Workflow dispatch rejected");
            false
        }
    }
}
