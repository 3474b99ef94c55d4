// SPDX-License-Identifier: GPL-3.0-only
mod checker;
mod config;
mod github;
mod logging;
mod mapping;

use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use checker::SyncChecker;
use config::Config;
use github::{GithubClient, ReleaseHost};
use logging::setup_logging;
use mapping::load_repo_mappings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level)?;

    info!("Starting debs-sync v{}", env!("CARGO_PKG_VERSION"));

    if config.github_token.is_none() && !config.dry_run {
        error!("No GitHub token found in env GITHUB_PAT");
        std::process::exit(1);
    }

    let mappings = match load_repo_mappings(&config.mapping_path()) {
        Ok(mappings) => mappings,
        Err(e) => {
            error!(error = %e, "Failed to load repository mappings");
            std::process::exit(1);
        }
    };
    info!(count = mappings.len(), "Loaded repository mappings");

    let host: Arc<dyn ReleaseHost> =
        Arc::new(GithubClient::new(config.github_token.clone(), config.dry_run)?);
    let checker = Arc::new(SyncChecker::new(
        host,
        config.workflow.clone(),
        config.git_ref.clone(),
    ));

    // One task per entry, bounded by the worker count. Entries are fully
    // independent; the process waits for all of them before exiting.
    let semaphore = Arc::new(Semaphore::new(config.workers));
    let mut tasks = JoinSet::new();
    for (name, repo) in mappings {
        let checker = Arc::clone(&checker);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            checker.check_entry(&name, &repo).await
        });
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Some(report)) => println!("{report}"),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Check task panicked"),
        }
    }

    Ok(())
}
