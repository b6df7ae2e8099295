use log::info;
use reqwest::blocking::Client;
use scraper::{Html, Selector};

use crate::domain::{Candidate, FullItem};
use crate::errors::{ReporterError, ReporterResult};
use crate::sources::opengraph;
use crate::sources::traits::Enricher;

pub const TOPIC_URL_PREFIX: &str = "https://news.google.com/rss/topics/";
pub const ARTICLE_URL_PREFIX: &str = "https://news.google.com/rss/articles/";

const CONSENT_URL: &str = "https://consent.google.com/save";
const REJECT_BUTTON_LABEL: &str = "Reject all";

fn selector(css: &str) -> ReporterResult<Selector> {
    Selector::parse(css).map_err(|e| ReporterError::Enrichment(format!("Bad selector {}: {}", css, e)))
}

/// Resolves Google News article links to the publisher's page.
///
/// The news.google.com article URL is only an interstitial: depending on the
/// region it serves a cookie consent form, a JavaScript redirect page, or
/// both, before the real article. The client keeps cookies so that a rejected
/// consent sticks for the rest of the session.
pub struct GNewsEnricher {
    client: Client,
}

impl GNewsEnricher {
    pub fn new(user_agent: &str) -> ReporterResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .user_agent(user_agent)
            .timeout(super::HTTP_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    fn get_text(&self, url: &str, what: &str) -> ReporterResult<String> {
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(ReporterError::Enrichment(format!(
                "Unable to {}: {}",
                what,
                response.status()
            )));
        }
        Ok(response.text()?)
    }

    pub fn is_consent_page(html: &str) -> ReporterResult<bool> {
        let document = Html::parse_document(html);
        let forms = selector(&format!(r#"form[action="{}"]"#, CONSENT_URL))?;
        Ok(document.select(&forms).next().is_some())
    }

    /// Input fields of the consent form that carries the "Reject all" button.
    pub fn reject_form_data(html: &str) -> ReporterResult<Vec<(String, String)>> {
        let document = Html::parse_document(html);
        let forms = selector(&format!(r#"form[action="{}"]"#, CONSENT_URL))?;
        let reject = selector(&format!(r#"button[aria-label="{}"]"#, REJECT_BUTTON_LABEL))?;
        let inputs = selector("input")?;

        let form = document
            .select(&forms)
            .find(|form| form.select(&reject).next().is_some())
            .ok_or_else(|| {
                ReporterError::Enrichment("Unable to find the appropriate consent form".to_string())
            })?;

        let data = form
            .select(&inputs)
            .filter_map(|input| {
                let name = input.value().attr("name")?;
                let value = input.value().attr("value").unwrap_or_default();
                Some((name.to_string(), value.to_string()))
            })
            .collect::<Vec<_>>();

        if data.is_empty() {
            return Err(ReporterError::Enrichment(
                "Consent form has no fields".to_string(),
            ));
        }

        Ok(data)
    }

    fn handle_consent(&self, html: &str) -> ReporterResult<String> {
        let form_data = Self::reject_form_data(html)?;

        let response = self.client.post(CONSENT_URL).form(&form_data).send()?;
        if !response.status().is_success() {
            return Err(ReporterError::Enrichment(format!(
                "Unable to submit form: {}",
                response.status()
            )));
        }

        Ok(response.text()?)
    }

    // TODO: c-wiz also wraps some regular Google pages; check for the
    // redirect anchor's data attributes instead.
    pub fn is_redirect_page(html: &str) -> ReporterResult<bool> {
        let document = Html::parse_document(html);
        Ok(document.select(&selector("c-wiz")?).next().is_some())
    }

    pub fn redirect_target(html: &str) -> ReporterResult<String> {
        let document = Html::parse_document(html);
        document
            .select(&selector("a[href]")?)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .next()
            .ok_or_else(|| ReporterError::Enrichment("Unable to find redirect URL".to_string()))
    }

    fn handle_redirect(&self, html: &str) -> ReporterResult<String> {
        let target = Self::redirect_target(html)?;
        self.get_text(&target, "follow redirect")
    }

    /// Fetch an article page and extract it. Does not consult the history.
    pub fn get_article(&self, url: &str) -> ReporterResult<FullItem> {
        if !url.starts_with(ARTICLE_URL_PREFIX) {
            return Err(ReporterError::InvalidUrl(format!(
                "Not a Google News article URL: {}",
                url
            )));
        }

        let mut html = self.get_text(url, "get article")?;

        if Self::is_consent_page(&html)? {
            info!("Consent form found, rejecting cookies");
            html = self.handle_consent(&html)?;
        }

        if Self::is_redirect_page(&html)? {
            info!("Redirect page found, following redirect manually");
            html = self.handle_redirect(&html)?;
        }

        opengraph::parse_article(&html)
    }
}

impl Enricher for GNewsEnricher {
    fn enrich(&self, candidate: &Candidate) -> ReporterResult<FullItem> {
        self.get_article(&candidate.link)
    }
}
