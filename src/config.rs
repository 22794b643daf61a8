use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;

use crate::error::{Error, Result};

/// Written verbatim when no config file exists yet.
pub const DEFAULT_CONFIG: &str = r#"
[ssh]
user_name = "conductor"

[instances]
exclusions = ["gke-",""]
"#;

const DEFAULT_USER_NAME: &str = "conductor";

#[derive(Debug, Clone, Deserialize)]
pub struct SshConfig {
    /// Login identity passed to `gcloud compute ssh` as `<user>@<instance>`.
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user_name: default_user_name(),
        }
    }
}

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstancesConfig {
    /// Substrings; any instance whose name contains one is hidden and never cached.
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,
}

impl Default for InstancesConfig {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
        }
    }
}

fn default_exclusions() -> Vec<String> {
    vec!["gke-".to_string()]
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub instances: InstancesConfig,
}

impl Config {
    /// Base directory holding the config, caches, history and log.
    pub fn base_dir() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| Error::config("Cannot determine home directory"))?;
        Ok(home.join(".gssh"))
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("config.toml")
    }

    /// Load `config.toml` from `dir`, writing the default file first if it is missing.
    pub async fn load_or_create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).await?;
        let path = Self::path_in(dir);

        if !fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!("Creating default config at {}", path.display());
            fs::write(&path, DEFAULT_CONFIG).await?;
        }

        let content = fs::read_to_string(&path).await?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
