use std::sync::OnceLock;

use regex::Regex;

use crate::domain::{Candidate, FullItem};
use crate::errors::{ReporterError, ReporterResult};
use crate::sources::traits::Enricher;

const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

fn html_tag_regex() -> &'static Regex {
    static HTML_TAG: OnceLock<Regex> = OnceLock::new();
    HTML_TAG.get_or_init(|| Regex::new(r"(?s)<.*?>").expect("static regex"))
}

/// Builds items straight from the feed entry, without touching the network.
#[derive(Debug, Default)]
pub struct EntryEnricher;

impl EntryEnricher {
    pub fn new() -> Self {
        Self
    }

    /// Strip tags and collapse whitespace
    pub fn strip_html(html: &str) -> String {
        let text = html_tag_regex().replace_all(html, " ");
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn is_image_url(url: &str) -> bool {
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }
}

impl Enricher for EntryEnricher {
    fn enrich(&self, candidate: &Candidate) -> ReporterResult<FullItem> {
        let title = candidate.title.trim();
        if title.is_empty() {
            return Err(ReporterError::Enrichment(format!(
                "Entry {} has no title",
                candidate.key
            )));
        }

        let url = candidate.link.trim();
        if url.is_empty() {
            return Err(ReporterError::Enrichment(format!(
                "Entry {} has no link",
                candidate.key
            )));
        }

        let body = candidate
            .summary
            .as_deref()
            .map(Self::strip_html)
            .unwrap_or_default();

        let images: Vec<String> = candidate
            .media
            .iter()
            .filter(|m| Self::is_image_url(m))
            .cloned()
            .collect();

        Ok(FullItem::new(title.to_string(), body, url.to_string()).with_attachments(images))
    }
}
