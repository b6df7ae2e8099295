pub mod entry;
pub mod gnews;
pub mod opengraph;
pub mod rss_atom;
pub mod traits;

pub use entry::EntryEnricher;
pub use gnews::GNewsEnricher;
pub use rss_atom::RssFeedSource;
pub use traits::{Enricher, FeedSource};

use reqwest::blocking::Client;

use crate::config::{Config, Provider};
use crate::errors::ReporterResult;

pub(crate) const HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

pub(crate) fn http_client(user_agent: &str) -> ReporterResult<Client> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .timeout(HTTP_TIMEOUT)
        .build()?)
}

/// Feed source and enricher for the configured provider.
pub fn build(config: &Config) -> ReporterResult<(Box<dyn FeedSource>, Box<dyn Enricher>)> {
    let user_agent = &config.general.user_agent;
    let source = RssFeedSource::new(&config.source.url, user_agent, config.source.dedup_key)?;

    let enricher: Box<dyn Enricher> = match config.source.provider {
        Provider::Rss => Box::new(EntryEnricher::new()),
        Provider::Gnews => Box::new(GNewsEnricher::new(user_agent)?),
    };

    Ok((Box::new(source), enricher))
}
