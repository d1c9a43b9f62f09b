//! Search result page parsing

use crate::error::{Result, StockyError};
use crate::types::NewsArticle;
use reqwest::Url;
use scraper::{Html, Selector};

const RESULT_CONTAINER: &str = "div.g";
const RESULT_TITLE: &str = "h3";
const RESULT_LINK: &str = "a[href]";
const REDIRECT_PREFIX: &str = "/url?q=";

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| StockyError::Parse(format!("invalid selector {}: {:?}", css, e)))
}

/// Extract up to `max_results` articles from a search result page.
///
/// The limit applies to result containers; a container without both a
/// title and a link is skipped.
pub fn parse_search_results(html: &str, max_results: usize) -> Result<Vec<NewsArticle>> {
    let container = selector(RESULT_CONTAINER)?;
    let title = selector(RESULT_TITLE)?;
    let link = selector(RESULT_LINK)?;

    let document = Html::parse_document(html);
    let mut articles = Vec::new();

    for result in document.select(&container).take(max_results) {
        let title_elem = result.select(&title).next();
        let href = result
            .select(&link)
            .next()
            .and_then(|a| a.value().attr("href"));

        if let (Some(title_elem), Some(href)) = (title_elem, href) {
            articles.push(NewsArticle {
                title: title_elem.text().collect::<String>(),
                url: unwrap_redirect(href),
            });
        }
    }

    Ok(articles)
}

/// Turn a `/url?q=<target>&sa=...` redirect wrapper into its target.
/// Any other link is returned unchanged.
pub fn unwrap_redirect(link: &str) -> String {
    let Some(rest) = link.strip_prefix(REDIRECT_PREFIX) else {
        return link.to_string();
    };

    let decoded = Url::parse("https://redirect.invalid")
        .and_then(|base| base.join(link))
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "q")
                .map(|(_, value)| value.into_owned())
        });

    match decoded {
        Some(target) if !target.is_empty() => target,
        _ => rest.split("&sa=").next().unwrap_or(rest).to_string(),
    }
}
