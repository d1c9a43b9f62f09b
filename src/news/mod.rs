//! News fetcher
//!
//! Queries a search engine's news vertical once per stock and extracts
//! headline/link pairs from the first result page. No retry, no paging.

mod parser;
#[cfg(test)]
mod tests;

pub use parser::{parse_search_results, unwrap_redirect};
pub(crate) use parser::selector;

use crate::config::NewsConfig;
use crate::error::{Result, StockyError};
use crate::types::{NewsArticle, NewsDigest};
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

/// Search-engine backed news fetcher
pub struct NewsFetcher {
    http: Client,
    search_url: String,
}

/// Query issued for a stock
pub fn search_query(stock_name: &str) -> String {
    format!("{} stock news", stock_name)
}

impl NewsFetcher {
    /// Create a fetcher that identifies itself with the configured User-Agent
    pub fn new(config: &NewsConfig) -> Result<Self> {
        if config.search_url.is_empty() {
            return Err(StockyError::Config("news.search_url must not be empty".into()));
        }

        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            search_url: config.search_url.clone(),
        })
    }

    /// Fetch up to `max_results` articles for one stock.
    ///
    /// Any status other than 200 is reported as [`StockyError::Http`].
    pub async fn fetch_stock_news(&self, stock_name: &str, max_results: usize) -> Result<Vec<NewsArticle>> {
        let query = search_query(stock_name);
        let resp = self
            .http
            .get(&self.search_url)
            .header(header::ACCEPT, "text/html")
            .query(&[("q", query.as_str()), ("tbm", "nws")])
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(StockyError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        parse_search_results(&body, max_results)
    }

    /// Fetch news for every stock name, one request each, in order.
    ///
    /// Each name gets an entry; a refused or failed fetch leaves it empty and
    /// the remaining names are still processed.
    pub async fn find_top_news(&self, stock_names: &[String], max_results: usize) -> NewsDigest {
        let mut news = NewsDigest::new();

        for stock_name in stock_names {
            news.insert(stock_name.clone(), Vec::new());

            match self.fetch_stock_news(stock_name, max_results).await {
                Ok(articles) => {
                    tracing::debug!("Fetched {} articles for {}", articles.len(), stock_name);
                    news.insert(stock_name.clone(), articles);
                }
                Err(StockyError::Http { status }) => {
                    tracing::warn!("Search for {} returned HTTP {}", stock_name, status);
                }
                Err(e) => {
                    tracing::error!("Error fetching news for {}: {}", stock_name, e);
                }
            }
        }

        news
    }
}
