//! Sentiment describer
//!
//! Turns each stock's headlines into a single prompt and records the model's
//! free-text answer. One failed generation discards the whole batch in favour
//! of the neutral fallback, so callers never see a half-described run.


use crate::model::{GenerationParams, TextGenerator};
use crate::types::{MoodAnalysis, NewsArticle, NewsDigest};
use std::collections::BTreeMap;

/// Prompt asking for the sentiment behind a stock's headlines
pub fn build_prompt(stock_name: &str, articles: &[NewsArticle]) -> String {
    let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
    format!(
        "Analyze the following news headlines about {} and determine the overall sentiment regarding its stock price potential: {}",
        stock_name,
        titles.join(" ")
    )
}

/// Describer holding the one model instance used for a run
pub struct SentimentDescriber {
    generator: Box<dyn TextGenerator>,
    params: GenerationParams,
}

impl SentimentDescriber {
    pub fn new(generator: Box<dyn TextGenerator>, params: GenerationParams) -> Self {
        Self { generator, params }
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Describe the mood of every stock in `news`, in key order.
    pub async fn describe(&self, news: &NewsDigest) -> MoodAnalysis {
        let mut moods = BTreeMap::new();

        for (stock_name, articles) in news {
            let prompt = build_prompt(stock_name, articles);
            match self.generator.generate(&prompt, &self.params).await {
                Ok(text) => {
                    tracing::debug!("Mood for {} ({} headlines) generated", stock_name, articles.len());
                    moods.insert(stock_name.clone(), text);
                }
                Err(e) => {
                    tracing::error!("Error using language model for {}: {}", stock_name, e);
                    return Self::unavailable(news, e.to_string());
                }
            }
        }

        MoodAnalysis::generated(moods)
    }

    /// Fallback analysis for when no model could be used at all
    pub fn unavailable(news: &NewsDigest, reason: impl Into<String>) -> MoodAnalysis {
        let reason = reason.into();
        tracing::warn!(
            "Falling back to neutral mood for {} stocks: {}",
            news.len(),
            reason
        );
        MoodAnalysis::fallback(news.keys(), reason)
    }
}
