//! Reference table updater
//!
//! Scrapes the top rows of a stock screener's ranking table and writes them
//! as the reference table the resolver reads.


use crate::config::ReferenceConfig;
use crate::error::{Result, StockyError};
use crate::news::selector;
use crate::types::StockReference;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;

/// Rows read from the top of the table
pub const TABLE_ROWS: usize = 10;

/// Ranking page tried when the configured source yields nothing
pub const DEFAULT_FALLBACK_URL: &str = "https://stockanalysis.com/stocks/market-cap/";

const UNKNOWN: &str = "Unknown";

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Text of the first link in the cell, or of the cell itself
fn linked_text(cell: ElementRef, link: &Selector) -> String {
    cell_text(cell.select(link).next().unwrap_or(cell))
}

/// Column positions found in the header row
#[derive(Debug, Default, PartialEq, Eq)]
struct Columns {
    symbol: Option<usize>,
    name: Option<usize>,
    price: Option<usize>,
    market_cap: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &[String]) -> Self {
        let find = |keys: &[&str]| headers.iter().position(|h| keys.iter().any(|k| h.contains(k)));

        Self {
            symbol: find(&["symbol", "ticker"]),
            name: find(&["name", "company"]),
            price: find(&["price", "last"]),
            market_cap: find(&["market cap", "marketcap", "mkt cap"]),
        }
    }

    /// Cells a row needs for every found column to be present
    fn width(&self) -> usize {
        [self.symbol, self.name, self.price, self.market_cap]
            .into_iter()
            .flatten()
            .max()
            .map_or(0, |last| last + 1)
    }
}

/// Extract up to [`TABLE_ROWS`] stocks from the first table mentioning a
/// symbol or ticker.
///
/// Rows too short for the found columns are skipped but keep their rank.
/// Columns missing from the header get placeholder values.
pub fn extract_stock_table(html: &str) -> Result<Vec<StockReference>> {
    let table_sel = selector("table")?;
    let header_sel = selector("thead tr")?;
    let th = selector("th")?;
    let row_sel = selector("tbody tr")?;
    let td = selector("td")?;
    let link = selector("a")?;

    let document = Html::parse_document(html);
    let table = document.select(&table_sel).find(|table| {
        let text = table.text().collect::<String>().to_lowercase();
        text.contains("symbol") || text.contains("ticker")
    });
    let Some(table) = table else {
        return Ok(Vec::new());
    };
    let Some(header) = table.select(&header_sel).next() else {
        return Ok(Vec::new());
    };

    let headers: Vec<String> = header.select(&th).map(|h| cell_text(h).to_lowercase()).collect();
    let columns = Columns::from_headers(&headers);
    let width = columns.width();

    let mut stocks = Vec::new();
    for (rank, row) in (1u32..).zip(table.select(&row_sel).take(TABLE_ROWS)) {
        let cells: Vec<ElementRef> = row.select(&td).collect();
        if cells.len() < width {
            continue;
        }

        let plain = |index: Option<usize>| index.map(|i| cell_text(cells[i]));
        stocks.push(StockReference {
            tag: columns
                .symbol
                .map(|i| linked_text(cells[i], &link))
                .unwrap_or_else(|| format!("Unknown-{}", rank)),
            name: columns
                .name
                .map(|i| linked_text(cells[i], &link))
                .unwrap_or_else(|| format!("Unknown Company {}", rank)),
            rank: Some(rank),
            stock_price: Some(plain(columns.price).unwrap_or_else(|| UNKNOWN.to_string())),
            market_cap: Some(plain(columns.market_cap).unwrap_or_else(|| UNKNOWN.to_string())),
        });
    }

    Ok(stocks)
}

/// Read the source page URL from a text file holding just that URL
pub fn read_source_url<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        StockyError::Config(format!("cannot read source URL from {}: {}", path.display(), e))
    })?;

    let url = raw.trim();
    if url.is_empty() {
        return Err(StockyError::Config(format!("no source URL in {}", path.display())));
    }
    Ok(url.to_string())
}

/// Write the table as pretty JSON, creating parent directories as needed
pub fn write_reference<P: AsRef<Path>>(path: P, stocks: &[StockReference]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, serde_json::to_string_pretty(stocks)?)?;
    Ok(())
}

/// Fetches ranking pages and turns them into reference entries
pub struct ReferenceUpdater {
    http: Client,
    fallback_url: String,
}

impl ReferenceUpdater {
    pub fn new(config: &ReferenceConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            fallback_url: config.fallback_url.clone(),
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let resp = self.http.get(url).send().await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(StockyError::Http {
                status: status.as_u16(),
            });
        }

        Ok(resp.text().await?)
    }

    async fn scrape(&self, url: &str) -> Result<Vec<StockReference>> {
        let html = self.fetch_page(url).await?;
        extract_stock_table(&html)
    }

    /// Scrape `source_url`, then the fallback page if the source gave no rows.
    ///
    /// An error status from the source counts as an empty page; anything
    /// else that fails is returned as is.
    pub async fn fetch_top_stocks(&self, source_url: &str) -> Result<Vec<StockReference>> {
        tracing::info!("Accessing website: {}", source_url);

        let stocks = match self.scrape(source_url).await {
            Ok(stocks) => stocks,
            Err(StockyError::Http { status }) => {
                tracing::warn!("{} returned HTTP {}", source_url, status);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        if !stocks.is_empty() {
            return Ok(stocks);
        }

        if !self.fallback_url.is_empty() {
            tracing::warn!("No stock table at {}, trying {}", source_url, self.fallback_url);
            let stocks = self.scrape(&self.fallback_url).await?;
            if !stocks.is_empty() {
                return Ok(stocks);
            }
        }

        Err(StockyError::Parse("No stock data could be scraped from the website".into()))
    }
}

/// Refresh the reference table at `config.path`.
///
/// The source page is `source_url` if given, then `config.source_url`, then
/// the contents of `config.source_file`.
pub async fn update_reference(config: &ReferenceConfig, source_url: Option<&str>) -> Result<Vec<StockReference>> {
    let url = match source_url.or(config.source_url.as_deref()) {
        Some(url) => url.to_string(),
        None => read_source_url(config.resolved_source_file())?,
    };

    let stocks = ReferenceUpdater::new(config)?.fetch_top_stocks(&url).await?;

    let path = config.resolved_path();
    write_reference(&path, &stocks)?;
    tracing::info!("Saved {} stocks to {}", stocks.len(), path.display());

    Ok(stocks)
}
