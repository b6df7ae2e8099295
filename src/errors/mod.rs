use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unable to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file parsing failed: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // Selection errors
    #[error("Unable to find a good article after {tries} tries")]
    SelectionExhausted { tries: usize },

    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    // Feed errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Feed parsing failed: {0}")]
    FeedParse(String),

    // Attachment errors
    #[error("Attachment fetch failed: {0}")]
    Fetch(String),

    // Destination errors
    #[error("Publish failed: {0}")]
    Publish(String),

    // Network errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Background thread errors
    #[error("Scheduler thread failed: {0}")]
    Worker(String),
}

pub type ReporterResult<T> = Result<T, ReporterError>;
