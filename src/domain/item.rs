use serde::{Deserialize, Serialize};

/// A candidate resolved to everything needed to publish it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullItem {
    pub title: String,
    pub body: String,
    pub url: String,
    pub attachments: Vec<String>,
}

impl FullItem {
    pub fn new(title: String, body: String, url: String) -> Self {
        Self {
            title,
            body,
            url,
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<String>) -> Self {
        self.attachments = attachments;
        self
    }
}

impl std::fmt::Display for FullItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.title, self.url)
    }
}

/// A downloaded file ready to be attached to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}
