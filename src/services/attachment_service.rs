use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, REFERER};
use sha2::{Digest, Sha256};

use crate::domain::Attachment;
use crate::errors::{ReporterError, ReporterResult};

#[cfg_attr(test, mockall::automock)]
pub trait AttachmentFetcher: Send + Sync {
    /// Download `url`, sending `referer` as the Referer header.
    fn fetch(&self, url: &str, referer: &str) -> ReporterResult<Attachment>;
}

/// Fetch at most `max` of `urls`, in order. The first failure aborts.
pub fn fetch_all(
    fetcher: &dyn AttachmentFetcher,
    urls: &[String],
    referer: &str,
    max: usize,
) -> ReporterResult<Vec<Attachment>> {
    urls.iter()
        .take(max)
        .map(|url| fetcher.fetch(url, referer))
        .collect()
}

/// `<sha256 of content>.<mime subtype>`, e.g. `ba78...15ad.jpeg`
pub fn attachment_filename(bytes: &[u8], content_type: &str) -> ReporterResult<String> {
    let subtype = content_type
        .split(';')
        .next()
        .and_then(|essence| essence.split('/').nth(1))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReporterError::Fetch(format!("Unusable content type: {}", content_type)))?;

    Ok(format!("{:x}.{}", Sha256::digest(bytes), subtype))
}

pub struct HttpAttachmentFetcher {
    client: Client,
}

impl HttpAttachmentFetcher {
    pub fn new(user_agent: &str) -> ReporterResult<Self> {
        Ok(Self {
            client: crate::sources::http_client(user_agent)?,
        })
    }
}

impl AttachmentFetcher for HttpAttachmentFetcher {
    fn fetch(&self, url: &str, referer: &str) -> ReporterResult<Attachment> {
        let response = self
            .client
            .get(url)
            .header(REFERER, referer)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReporterError::Fetch(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ReporterError::Fetch(format!("No content type for {}", url)))?;

        let bytes = response
            .bytes()
            .map_err(|e| ReporterError::Fetch(e.to_string()))?
            .to_vec();

        let filename = attachment_filename(&bytes, &content_type)?;
        debug!("Fetched {} ({} bytes) as {}", url, bytes.len(), filename);

        Ok(Attachment {
            filename,
            bytes,
            content_type,
        })
    }
}
