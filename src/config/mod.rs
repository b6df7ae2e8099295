use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::Deserialize;
use url::Url;

use crate::domain::{DedupField, PostLimits};
use crate::errors::{ReporterError, ReporterResult};
use crate::scheduler::Cadence;

/// How candidates are turned into publishable items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Use the feed entry itself.
    #[default]
    Rss,
    /// Google News topic feed; articles are scraped for Open Graph tags.
    Gnews,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    pub user_agent: String,
    /// Base delay between posts, in seconds.
    #[serde(default = "defaults::tick")]
    pub tick: u64,
    /// Upper bound of the random offset added to `tick`, in seconds.
    #[serde(default = "defaults::tick_rand")]
    pub tick_rand: u64,
    #[serde(default = "defaults::max_tries")]
    pub max_tries: usize,
    #[serde(default = "defaults::max_history_size")]
    pub max_history_size: usize,
    /// Pause after a failed enrichment attempt, in seconds.
    #[serde(default = "defaults::retry_backoff")]
    pub retry_backoff: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default)]
    pub provider: Provider,
    #[serde(default)]
    pub dedup_key: DedupField,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    pub url: String,
    pub board: String,
    #[serde(default)]
    pub poster_name: String,
    #[serde(default = "defaults::max_subject_len")]
    pub max_subject_len: usize,
    #[serde(default = "defaults::max_message_len")]
    pub max_message_len: usize,
    #[serde(default = "defaults::max_files")]
    pub max_files: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub general: GeneralConfig,
    pub source: SourceConfig,
    pub destination: DestinationConfig,
}

mod defaults {
    pub fn tick() -> u64 {
        60 * 60
    }

    pub fn tick_rand() -> u64 {
        60 * 30
    }

    pub fn max_tries() -> usize {
        10
    }

    pub fn max_history_size() -> usize {
        10
    }

    pub fn retry_backoff() -> u64 {
        3
    }

    pub fn max_subject_len() -> usize {
        50
    }

    pub fn max_message_len() -> usize {
        1000
    }

    pub fn max_files() -> usize {
        4
    }
}

impl Config {
    /// Get the directory where the executable is located
    fn exe_dir() -> Option<std::path::PathBuf> {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Load `.env` files so `REPORTER_CONFIG` and `RUST_LOG` can live there.
    pub fn load_dotenv() {
        // Try to load .env from executable's directory first
        if let Some(dir) = Self::exe_dir() {
            let env_path = dir.join(".env");
            if env_path.exists() {
                dotenvy::from_path(&env_path).ok();
            }
        }
        // Fall back to current directory
        dotenvy::dotenv().ok();
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ReporterResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ReporterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml(&content)?;
        debug!("Config: {:?}", config);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> ReporterResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReporterResult<()> {
        let general = &self.general;
        let destination = &self.destination;

        require(!general.user_agent.trim().is_empty(), "general.user_agent must not be empty")?;
        require(general.tick >= 1, "general.tick must be greater than 0")?;
        require(general.max_tries >= 1, "general.max_tries must be greater than 0")?;
        require(
            general.max_history_size >= 1,
            "general.max_history_size must be greater than 0",
        )?;

        require_absolute_url(&self.source.url, "source.url")?;
        if self.source.provider == Provider::Gnews
            && !self.source.url.starts_with(crate::sources::gnews::TOPIC_URL_PREFIX)
        {
            return Err(ReporterError::InvalidConfiguration(format!(
                "source.url must start with {} for the gnews provider",
                crate::sources::gnews::TOPIC_URL_PREFIX
            )));
        }

        require_absolute_url(&destination.url, "destination.url")?;
        require(!destination.board.trim().is_empty(), "destination.board must not be empty")?;
        require(
            destination.max_subject_len >= 1,
            "destination.max_subject_len must be greater than 0",
        )?;
        require(
            destination.max_message_len >= 1,
            "destination.max_message_len must be greater than 0",
        )?;

        Ok(())
    }

    pub fn cadence(&self) -> Cadence {
        Cadence::from_secs(self.general.tick, self.general.tick_rand)
    }

    pub fn post_limits(&self) -> PostLimits {
        PostLimits {
            max_subject_len: self.destination.max_subject_len,
            max_message_len: self.destination.max_message_len,
            max_files: self.destination.max_files,
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.general.retry_backoff)
    }
}

fn require(condition: bool, message: &str) -> ReporterResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ReporterError::InvalidConfiguration(message.to_string()))
    }
}

fn require_absolute_url(value: &str, key: &str) -> ReporterResult<()> {
    match Url::parse(value) {
        Ok(url) if url.has_host() => Ok(()),
        Ok(_) => Err(ReporterError::InvalidConfiguration(format!(
            "{} has no host: {}",
            key, value
        ))),
        Err(e) => Err(ReporterError::InvalidConfiguration(format!(
            "{} is not a valid URL ({}): {}",
            key, e, value
        ))),
    }
}
