use scraper::{Html, Selector};

use crate::domain::FullItem;
use crate::errors::{ReporterError, ReporterResult};

fn meta_content(document: &Html, property: &str) -> ReporterResult<Option<String>> {
    let selector = Selector::parse(&format!(r#"meta[property="{}"]"#, property))
        .map_err(|e| ReporterError::Enrichment(format!("Bad selector for {}: {}", property, e)))?;

    Ok(document
        .select(&selector)
        .filter_map(|element| element.value().attr("content"))
        .map(|content| content.trim().to_string())
        .find(|content| !content.is_empty()))
}

fn required(document: &Html, property: &str) -> ReporterResult<String> {
    meta_content(document, property)?
        .ok_or_else(|| ReporterError::Enrichment(format!("{} not found", property)))
}

/// Build an item from the Open Graph tags of an article page.
///
/// The page must declare `og:type` = `article` and carry `og:title`,
/// `og:url`, `og:description` and `og:image`.
pub fn parse_article(html: &str) -> ReporterResult<FullItem> {
    let document = Html::parse_document(html);

    match meta_content(&document, "og:type")?.as_deref() {
        Some("article") => {}
        Some(other) => {
            return Err(ReporterError::Enrichment(format!(
                "og:type must be article, found {}",
                other
            )))
        }
        None => return Err(ReporterError::Enrichment("og:type not found".to_string())),
    }

    let title = required(&document, "og:title")?;
    let url = required(&document, "og:url")?;
    let description = required(&document, "og:description")?;
    let image = required(&document, "og:image")?;

    Ok(FullItem::new(title, description, url).with_attachments(vec![image]))
}
