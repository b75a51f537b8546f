use crate::{github::github_client::GITHUB_API_URL, releases::ElementIds};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE_NAME: &str = "releasepage.yaml";

const DEFAULT_LOADING_ID: &str = "loading";
const DEFAULT_ANCHOR_ID: &str = "latest-releases";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub owner: String,
    pub repo: String,
    #[serde(default = "Config::default_api_url")]
    pub api_url: String,
    #[serde(default = "Config::default_log_level")]
    pub log_level: log::Level,
    pub page: PageConfig,
    pub markdown: Option<MarkdownConfig>,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Config> {
        let config_string = tokio::fs::read_to_string(path).await?;

        Config::parse(&config_string)
    }

    pub fn parse(config_string: &str) -> Result<Config> {
        let config = serde_yaml::from_str::<Config>(config_string)?;

        Ok(config)
    }

    fn default_api_url() -> String {
        GITHUB_API_URL.to_owned()
    }

    fn default_log_level() -> log::Level {
        log::Level::Info
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default = "PageConfig::default_loading_id")]
    pub loading_id: String,
    #[serde(default = "PageConfig::default_anchor_id")]
    pub anchor_id: String,
}

impl PageConfig {
    fn default_loading_id() -> String {
        DEFAULT_LOADING_ID.to_owned()
    }

    fn default_anchor_id() -> String {
        DEFAULT_ANCHOR_ID.to_owned()
    }

    pub fn element_ids(&self) -> ElementIds {
        ElementIds::new(&self.loading_id, &self.anchor_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Where the generated download table is written
    pub output: Option<PathBuf>,
    /// Directory searched recursively for `*.md.in` templates
    pub templates: Option<PathBuf>,
}
