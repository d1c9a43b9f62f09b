//! End-to-end run: resolve -> fetch -> describe -> score

use crate::config::Config;
use crate::describer::SentimentDescriber;
use crate::error::Result;
use crate::model::{LlmModel, TextGenerator};
use crate::news::NewsFetcher;
use crate::resolver::match_stock_names;
use crate::scorer::assign_sentiment_weights;
use crate::types::{Block, MoodAnalysis, NewsDigest, SentimentWeights, StockNameMapping};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Everything one run produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub stock_names: StockNameMapping,
    pub news: NewsDigest,
    pub moods: MoodAnalysis,
    pub weights: SentimentWeights,
}

impl PipelineReport {
    /// Write the report as pretty-printed JSON
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// One line per resolved tag: tag, name, headline count, weight
    pub fn summary_lines(&self) -> Vec<String> {
        self.stock_names
            .iter()
            .map(|(tag, name)| {
                let headlines = self.news.get(name).map(Vec::len).unwrap_or(0);
                let weight = self
                    .weights
                    .get(name)
                    .map(|w| format!("{} ({})", w, w.label()))
                    .unwrap_or_else(|| "-".to_string());
                format!("{:<8} {:<40} {:>9} {}", tag, name, headlines, weight)
            })
            .collect()
    }
}

/// The four stages wired together for a run
pub struct Pipeline {
    config: Config,
    fetcher: NewsFetcher,
    describer: std::result::Result<SentimentDescriber, String>,
}

impl Pipeline {
    /// Build with an explicit generator; `None` means no model is available
    pub fn new(config: Config, generator: Option<Box<dyn TextGenerator>>) -> Result<Self> {
        let fetcher = NewsFetcher::new(&config.news)?;
        let params = config.llm.generation_params();
        let describer = generator
            .map(|g| SentimentDescriber::new(g, params))
            .ok_or_else(|| "no language model configured".to_string());

        Ok(Self {
            config,
            fetcher,
            describer,
        })
    }

    /// Build the fetcher and the configured LLM.
    ///
    /// A model that cannot be constructed is not fatal: the run falls back to
    /// neutral moods and records why.
    pub fn from_config(config: Config) -> Result<Self> {
        let model = LlmModel::from_config(&config.llm);
        let mut pipeline = Self::new(config, None)?;

        pipeline.describer = match model {
            Ok(model) => {
                tracing::info!("Using language model {}", model.name());
                let params = pipeline.config.llm.generation_params();
                Ok(SentimentDescriber::new(Box::new(model), params))
            }
            Err(e) => {
                tracing::error!("Error loading language model: {}", e);
                Err(e.to_string())
            }
        };

        Ok(pipeline)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &NewsFetcher {
        &self.fetcher
    }

    /// Mood analysis with the configured model, or the fallback if there is none
    pub async fn describe(&self, news: &NewsDigest) -> MoodAnalysis {
        match &self.describer {
            Ok(describer) => describer.describe(news).await,
            Err(reason) => SentimentDescriber::unavailable(news, reason.clone()),
        }
    }

    /// Run every stage in order for `blocks`
    pub async fn run(&self, blocks: &[Block]) -> PipelineReport {
        let reference = self.config.reference.resolved_path();
        let stock_names = match_stock_names(blocks, &reference);

        let mut names: Vec<String> = stock_names.values().cloned().collect();
        names.sort();
        names.dedup();
        tracing::info!("Fetching news for {} stocks", names.len());

        let news = self
            .fetcher
            .find_top_news(&names, self.config.news.max_results)
            .await;

        let moods = self.describe(&news).await;
        if moods.is_fallback() {
            tracing::warn!("Mood analysis used the neutral fallback");
        }

        let weights = assign_sentiment_weights(&moods.moods);

        PipelineReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            stock_names,
            news,
            moods,
            weights,
        }
    }
}

/// Read blocks from a JSON array of objects with an optional `tag`
pub fn load_blocks<P: AsRef<Path>>(path: P) -> Result<Vec<Block>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
