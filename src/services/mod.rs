pub mod attachment_service;
pub mod publish_service;
pub mod selection_service;

pub use attachment_service::{AttachmentFetcher, HttpAttachmentFetcher};
pub use publish_service::{BoardPublisher, DryRunPublisher, Publisher};
pub use selection_service::{Selection, SelectionService};
