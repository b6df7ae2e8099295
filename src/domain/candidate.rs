use serde::{Deserialize, Serialize};

/// Which feed entry field identifies an item for deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupField {
    #[default]
    Link,
    Title,
}

impl DedupField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DedupField::Link => "link",
            DedupField::Title => "title",
        }
    }
}

impl std::str::FromStr for DedupField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "link" | "url" => Ok(DedupField::Link),
            "title" => Ok(DedupField::Title),
            _ => Err(format!("Unknown dedup key: {}", s)),
        }
    }
}

impl std::fmt::Display for DedupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A feed entry that has not been published yet.
///
/// `key` is the only field the scheduling core looks at; the rest is carried
/// for the enrichment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub key: String,
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub media: Vec<String>,
}

impl Candidate {
    /// Build a candidate keyed by `field`. Returns `None` when that field is empty.
    pub fn new(field: DedupField, title: String, link: String) -> Option<Self> {
        let key = match field {
            DedupField::Link => link.trim(),
            DedupField::Title => title.trim(),
        };

        if key.is_empty() {
            return None;
        }

        Some(Self {
            key: key.to_string(),
            title,
            link,
            summary: None,
            media: Vec::new(),
        })
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_media(mut self, media: Vec<String>) -> Self {
        self.media = media;
        self
    }
}
