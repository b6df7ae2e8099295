use serde::Serialize;

use super::{Attachment, FullItem};

const ELLIPSIS: &str = "...";

/// Destination limits applied when a post is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostLimits {
    pub max_subject_len: usize,
    pub max_message_len: usize,
    pub max_files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub name: String,
    pub subject: String,
    pub message: String,
    #[serde(skip)]
    pub attachments: Vec<Attachment>,
}

impl Post {
    /// Compose a post for `item`, truncating text and dropping attachments
    /// beyond `limits.max_files`.
    pub fn compose(
        item: &FullItem,
        mut attachments: Vec<Attachment>,
        limits: &PostLimits,
        poster_name: &str,
    ) -> Self {
        attachments.truncate(limits.max_files);

        Self {
            name: poster_name.to_string(),
            subject: truncate_with_ellipsis(&item.title, limits.max_subject_len),
            message: truncate_with_ellipsis(&Self::format_message(item), limits.max_message_len),
            attachments,
        }
    }

    /// Format: ">{body}\n\n{url}"
    pub fn format_message(item: &FullItem) -> String {
        format!(">{}\n\n{}", item.body, item.url)
    }
}

/// Shorten `text` to exactly `max_chars` characters, ending in "...", when it
/// is longer than `max_chars`. Counts characters, not bytes.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let ellipsis_len = ELLIPSIS.len().min(max_chars);
    let mut truncated: String = text.chars().take(max_chars - ellipsis_len).collect();
    truncated.push_str(&ELLIPSIS[..ellipsis_len]);
    truncated
}
