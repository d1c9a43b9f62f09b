//! Sentiment scorer
//!
//! Maps a free-text mood description onto a 1-5 weight with a fixed,
//! ordered table of patterns.


use crate::types::{SentimentWeight, SentimentWeights};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Pattern classes in scan order, from most negative to most positive
static SENTIMENT_PATTERNS: LazyLock<Vec<(Regex, SentimentWeight)>> = LazyLock::new(|| {
    [
        (
            r"very\s+(?:negative|bearish|pessimistic|unfavorable)",
            SentimentWeight::STRONGLY_NEGATIVE,
        ),
        (
            r"(?:negative|bearish|pessimistic|unfavorable|decline|drop)",
            SentimentWeight::NEGATIVE,
        ),
        (r"(?:neutral|balanced|stable|steady)", SentimentWeight::NEUTRAL),
        (
            r"(?:positive|bullish|optimistic|favorable|growth|increase)",
            SentimentWeight::POSITIVE,
        ),
        (
            r"very\s+(?:positive|bullish|optimistic|favorable|strong)",
            SentimentWeight::STRONGLY_POSITIVE,
        ),
    ]
    .into_iter()
    .map(|(pattern, weight)| (Regex::new(pattern).unwrap(), weight))
    .collect()
});

/// Weight for one mood description.
///
/// Every matching class overwrites the weight, so the last match in scan
/// order wins; an extreme class ends the scan as soon as it matches.
pub fn score_mood(analysis: &str) -> SentimentWeight {
    let text = analysis.to_lowercase();
    let mut weight = SentimentWeight::NEUTRAL;
    let mut matched = Vec::new();

    for (pattern, value) in SENTIMENT_PATTERNS.iter() {
        if pattern.is_match(&text) {
            weight = *value;
            matched.push(value.value());
            if value.is_extreme() {
                break;
            }
        }
    }

    // Mixed cues resolve to the most positive non-extreme class
    if matched.len() > 1 && !weight.is_extreme() {
        tracing::debug!("Conflicting sentiment cues {:?}, keeping {}", matched, weight);
    }

    weight
}

/// One weight per stock in `mood_analysis`
pub fn assign_sentiment_weights(mood_analysis: &BTreeMap<String, String>) -> SentimentWeights {
    mood_analysis
        .iter()
        .map(|(stock_name, analysis)| (stock_name.clone(), score_mood(analysis)))
        .collect()
}
