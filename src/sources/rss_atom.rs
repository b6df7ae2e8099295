use feed_rs::parser;
use log::debug;
use reqwest::blocking::Client;

use crate::domain::{Candidate, DedupField};
use crate::errors::{ReporterError, ReporterResult};
use crate::sources::traits::FeedSource;

/// RSS/Atom/JSON feed read with `feed-rs`.
pub struct RssFeedSource {
    client: Client,
    url: String,
    dedup_field: DedupField,
}

impl RssFeedSource {
    pub fn new(url: &str, user_agent: &str, dedup_field: DedupField) -> ReporterResult<Self> {
        Ok(Self {
            client: super::http_client(user_agent)?,
            url: url.to_string(),
            dedup_field,
        })
    }

    fn fetch_bytes(&self) -> ReporterResult<Vec<u8>> {
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }

    /// Map feed entries to candidates, skipping entries without a dedup key.
    pub fn parse_candidates(bytes: &[u8], dedup_field: DedupField) -> ReporterResult<Vec<Candidate>> {
        let parsed = parser::parse(bytes).map_err(|e| ReporterError::FeedParse(e.to_string()))?;

        let candidates = parsed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let title = entry.title.map(|t| t.content).unwrap_or_default();
                let link = entry
                    .links
                    .into_iter()
                    .map(|l| l.href)
                    .next()
                    .unwrap_or_default();

                let summary = entry
                    .summary
                    .map(|s| s.content)
                    .or_else(|| entry.content.and_then(|c| c.body));

                let mut media: Vec<String> = Vec::new();
                for object in entry.media {
                    media.extend(
                        object
                            .content
                            .iter()
                            .filter_map(|c| c.url.as_ref().map(|u| u.to_string())),
                    );
                    media.extend(object.thumbnails.iter().map(|t| t.image.uri.clone()));
                }
                media.dedup();

                Candidate::new(dedup_field, title, link)
                    .map(|c| c.with_summary(summary).with_media(media))
            })
            .collect();

        Ok(candidates)
    }
}

impl FeedSource for RssFeedSource {
    fn list_candidates(&self) -> ReporterResult<Vec<Candidate>> {
        let bytes = self.fetch_bytes()?;
        let candidates = Self::parse_candidates(&bytes, self.dedup_field)?;
        debug!("Feed {} returned {} candidates", self.url, candidates.len());
        Ok(candidates)
    }
}
