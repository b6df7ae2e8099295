use crate::domain::{Candidate, FullItem};
use crate::errors::ReporterResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedSource: Send + Sync {
    /// Fetch the current feed snapshot. An empty feed is not an error.
    fn list_candidates(&self) -> ReporterResult<Vec<Candidate>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait Enricher: Send + Sync {
    /// Resolve a candidate into a publishable item.
    fn enrich(&self, candidate: &Candidate) -> ReporterResult<FullItem>;
}
