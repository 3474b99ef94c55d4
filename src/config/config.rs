// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory containing git-repo.json
    pub data_dir: PathBuf,

    /// Number of entries checked concurrently
    pub workers: usize,

    /// When set, workflow dispatches are logged but never sent
    pub dry_run: bool,

    /// Ref the dispatched workflow runs against
    pub git_ref: String,

    /// Workflow file name in the build repositories
    pub workflow: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// GitHub token, only ever read from the GITHUB_PAT environment variable
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Config {
    /// Load configuration from TOML file with environment variable overrides
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("DEBS_SYNC_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        let mut config: Config = if std::path::Path::new(&config_path).exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            toml::from_str(&contents)?
        } else {
            Config::default()
        };

        // Apply environment variable overrides
        if let Ok(val) = std::env::var("DEBS_SYNC_DATA_DIR") {
            config.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("DEBS_SYNC_WORKERS") {
            config.workers = val.parse()?;
        }
        if let Ok(val) = std::env::var("DEBS_SYNC_DRY_RUN") {
            config.dry_run = matches!(val.as_str(), "1" | "true" | "yes");
        }
        if let Ok(val) = std::env::var("DEBS_SYNC_REF") {
            config.git_ref = val;
        }
        if let Ok(val) = std::env::var("DEBS_SYNC_WORKFLOW") {
            config.workflow = val;
        }
        if let Ok(val) = std::env::var("DEBS_SYNC_LOG_LEVEL") {
            config.log_level = val;
        }

        config.github_token = std::env::var("GITHUB_PAT").ok().filter(|t| !t.is_empty());

        Ok(config)
    }

    /// Path of the repository mapping file
    pub fn mapping_path(&self) -> PathBuf {
        self.data_dir.join("git-repo.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            workers: 5,
            dry_run: false,
            git_ref: String::from("main"),
            workflow: String::from("trigger_build.yaml"),
            log_level: String::from("info"),
            github_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::NamedTempFile;

    // Tests in this module mutate process-wide environment variables and
    // must not run concurrently with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // Helper functions to safely modify environment variables in tests
    fn set_env_var(key: &str, value: &str) {
        unsafe {
            std::env::set_var(key, value);
        }
    }

    fn remove_env_var(key: &str) {
        unsafe {
            std::env::remove_var(key);
        }
    }

    fn clear_env_vars() {
        for key in [
            "DEBS_SYNC_CONFIG",
            "DEBS_SYNC_DATA_DIR",
            "DEBS_SYNC_WORKERS",
            "DEBS_SYNC_DRY_RUN",
            "DEBS_SYNC_REF",
            "DEBS_SYNC_WORKFLOW",
            "DEBS_SYNC_LOG_LEVEL",
            "GITHUB_PAT",
        ] {
            remove_env_var(key);
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.workers, 5);
        assert!(!config.dry_run);
        assert_eq!(config.git_ref, "main");
        assert_eq!(config.workflow, "trigger_build.yaml");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.github_token, None);
    }

    #[test]
    fn test_mapping_path() {
        let config = Config::default();
        assert_eq!(config.mapping_path(), PathBuf::from("data/git-repo.json"));
    }

    #[test]
    fn test_load_from_toml() {
        let _env = lock_env();
        let temp_file = NamedTempFile::new().unwrap();
        let config_content = r#"
data_dir = "/custom/data"
workers = 8
dry_run = true
git_ref = "master"
workflow = "build.yaml"
log_level = "debug"
"#;
        fs::write(temp_file.path(), config_content).unwrap();

        let original_config = std::env::var("DEBS_SYNC_CONFIG").ok();
        clear_env_vars();
        set_env_var("DEBS_SYNC_CONFIG", temp_file.path().to_str().unwrap());

        let config = Config::load().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.workers, 8);
        assert!(config.dry_run);
        assert_eq!(config.git_ref, "master");
        assert_eq!(config.workflow, "build.yaml");
        assert_eq!(config.log_level, "debug");

        if let Some(val) = original_config {
            set_env_var("DEBS_SYNC_CONFIG", &val);
        } else {
            remove_env_var("DEBS_SYNC_CONFIG");
        }
    }

    #[test]
    fn test_env_var_overrides() {
        let _env = lock_env();
        let originals: Vec<(&str, Option<String>)> = [
            "DEBS_SYNC_DATA_DIR",
            "DEBS_SYNC_WORKERS",
            "DEBS_SYNC_DRY_RUN",
            "GITHUB_PAT",
        ]
        .into_iter()
        .map(|k| (k, std::env::var(k).ok()))
        .collect();

        clear_env_vars();
        set_env_var("DEBS_SYNC_DATA_DIR", "/env/data");
        set_env_var("DEBS_SYNC_WORKERS", "2");
        set_env_var("DEBS_SYNC_DRY_RUN", "true");
        set_env_var("GITHUB_PAT", "token-123");

        let config = Config::load().unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/env/data"));
        assert_eq!(config.workers, 2);
        assert!(config.dry_run);
        assert_eq!(config.github_token, Some("token-123".to_string()));

        for (key, val) in originals {
            match val {
                Some(v) => set_env_var(key, &v),
                None => remove_env_var(key),
            }
        }
    }

    #[test]
    fn test_empty_token_treated_as_missing() {
        let _env = lock_env();
        let original = std::env::var("GITHUB_PAT").ok();
        clear_env_vars();
        set_env_var("GITHUB_PAT", "");

        let config = Config::load().unwrap();
        assert_eq!(config.github_token, None);

        if let Some(val) = original {
            set_env_var("GITHUB_PAT", &val);
        } else {
            remove_env_var("GITHUB_PAT");
        }
    }
}
