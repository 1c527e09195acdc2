//! Settings layered from defaults, a TOML file and `TASK_MANAGER_*` variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_STORAGE_PATH: &str = ".task-manager/storage.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";
const DEFAULT_CONFIG_FILE: &str = "task-manager/config";
const ENV_PREFIX: &str = "TASK_MANAGER";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_resume_session")]
    pub resume_session: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            storage_path: default_storage_path(),
            log_level: default_log_level(),
            resume_session: default_resume_session(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file and `TASK_MANAGER_*` environment
    /// variables, the latter taking precedence.
    ///
    /// An explicitly given file must exist; otherwise `task-manager/config.toml`
    /// is read when present.
    pub fn load(file: Option<&Path>) -> anyhow::Result<Self> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file_source)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("could not read configuration")?;

        Ok(settings.try_deserialize()?)
    }

    pub fn log_level(&self) -> anyhow::Result<Level> {
        self.log_level
            .parse()
            .with_context(|| format!("invalid log_level {:?}", self.log_level))
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_PATH)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_resume_session() -> bool {
    true
}
