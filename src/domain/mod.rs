pub mod candidate;
pub mod item;
pub mod post;

pub use candidate::{Candidate, DedupField};
pub use item::{Attachment, FullItem};
pub use post::{truncate_with_ellipsis, Post, PostLimits};
