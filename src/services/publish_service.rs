use log::{debug, info};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::REFERER;

use crate::config::DestinationConfig;
use crate::domain::Post;
use crate::errors::{ReporterError, ReporterResult};

#[cfg_attr(test, mockall::automock)]
pub trait Publisher: Send + Sync {
    /// Create a new thread from `post`.
    fn publish(&self, post: &Post) -> ReporterResult<()>;
}

/// Posts new threads through an imageboard's board form.
pub struct BoardPublisher {
    client: Client,
    base_url: String,
    board: String,
}

impl BoardPublisher {
    pub fn new(destination: &DestinationConfig, user_agent: &str) -> ReporterResult<Self> {
        Ok(Self {
            client: crate::sources::http_client(user_agent)?,
            base_url: destination.url.trim_end_matches('/').to_string(),
            board: destination.board.clone(),
        })
    }

    pub fn post_url(&self) -> String {
        format!("{}/forms/board/{}/post", self.base_url, self.board)
    }

    pub fn referer(&self) -> String {
        format!("{}/{}/index.html", self.base_url, self.board)
    }

    fn build_form(post: &Post) -> ReporterResult<Form> {
        let mut form = Form::new()
            .text("name", post.name.clone())
            .text("subject", post.subject.clone())
            .text("message", post.message.clone());

        for attachment in &post.attachments {
            let part = Part::bytes(attachment.bytes.clone())
                .file_name(attachment.filename.clone())
                .mime_str(&attachment.content_type)
                .map_err(|e| {
                    ReporterError::Publish(format!(
                        "Bad content type {} for {}: {}",
                        attachment.content_type, attachment.filename, e
                    ))
                })?;
            form = form.part("file", part);
        }

        Ok(form)
    }
}

impl Publisher for BoardPublisher {
    fn publish(&self, post: &Post) -> ReporterResult<()> {
        let form = Self::build_form(post)?;

        let response = self
            .client
            .post(self.post_url())
            .header(REFERER, self.referer())
            .multipart(form)
            .send()
            .map_err(|e| ReporterError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ReporterError::Publish(format!(
                "Unable to create thread: {}",
                response.status()
            )));
        }

        debug!("Created thread on /{}/: {}", self.board, post.subject);
        Ok(())
    }
}

/// Logs posts instead of sending them.
#[derive(Debug, Default)]
pub struct DryRunPublisher;

impl Publisher for DryRunPublisher {
    fn publish(&self, post: &Post) -> ReporterResult<()> {
        let fields = serde_json::to_string(post).map_err(|e| ReporterError::Publish(e.to_string()))?;
        let files: Vec<&str> = post.attachments.iter().map(|a| a.filename.as_str()).collect();

        info!("[DRY RUN] Creating thread with subject: {}", post.subject);
        info!("[DRY RUN] {} files={:?}", fields, files);
        Ok(())
    }
}
