//! Core types shared across pipeline stages

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Input unit correlated to a stock through its tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub tag: Option<String>,
}

impl Block {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
        }
    }

    /// Tag of this block, empty when the block carries none
    pub fn tag(&self) -> &str {
        self.tag.as_deref().unwrap_or("")
    }
}

/// Entry of the stock reference table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockReference {
    pub tag: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_price: Option<String>,
    #[serde(rename = "marketCap", skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<String>,
}

/// Strings as-is, numbers and booleans in their JSON spelling
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl StockReference {
    /// Read one table entry, tolerating whatever else the object carries.
    ///
    /// `tag` is preferred over `symbol`; a missing or non-string name is empty.
    /// Non-objects yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_string);

        let tag = match entry.get("tag") {
            Some(tag) => tag.as_str().map(str::to_string).unwrap_or_default(),
            None => text("symbol").unwrap_or_default(),
        };
        let rank = entry.get("rank").and_then(|rank| match rank {
            Value::Number(n) => n.as_u64().and_then(|r| u32::try_from(r).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Some(Self {
            tag,
            name: text("name").unwrap_or_default(),
            rank,
            stock_price: entry.get("stock_price").and_then(scalar_text),
            market_cap: entry
                .get("market_cap")
                .or_else(|| entry.get("marketCap"))
                .and_then(scalar_text),
        })
    }
}

/// A single search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
}

/// tag -> stock name
pub type StockNameMapping = BTreeMap<String, String>;

/// stock name -> articles found for it
pub type NewsDigest = BTreeMap<String, Vec<NewsArticle>>;

/// stock name -> sentiment weight
pub type SentimentWeights = BTreeMap<String, SentimentWeight>;

/// Text recorded for every stock when no model output is available
pub const FALLBACK_MOOD: &str = "Neutral sentiment, insufficient data for analysis.";

/// Where the mood texts came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MoodSource {
    Generated,
    Fallback { reason: String },
}

/// Free-text sentiment per stock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub moods: BTreeMap<String, String>,
    pub source: MoodSource,
}

impl MoodAnalysis {
    pub fn generated(moods: BTreeMap<String, String>) -> Self {
        Self {
            moods,
            source: MoodSource::Generated,
        }
    }

    /// Every stock mapped to [`FALLBACK_MOOD`]
    pub fn fallback<'a, I>(stocks: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let moods = stocks
            .into_iter()
            .map(|name| (name.clone(), FALLBACK_MOOD.to_string()))
            .collect();

        Self {
            moods,
            source: MoodSource::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.source, MoodSource::Fallback { .. })
    }
}

/// Discrete sentiment score, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SentimentWeight(u8);

impl SentimentWeight {
    pub const STRONGLY_NEGATIVE: Self = Self(1);
    pub const NEGATIVE: Self = Self(2);
    pub const NEUTRAL: Self = Self(3);
    pub const POSITIVE: Self = Self(4);
    pub const STRONGLY_POSITIVE: Self = Self(5);

    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// True for the two extreme classes
    pub fn is_extreme(self) -> bool {
        self == Self::STRONGLY_NEGATIVE || self == Self::STRONGLY_POSITIVE
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "strongly negative",
            2 => "negative",
            3 => "neutral",
            4 => "positive",
            _ => "strongly positive",
        }
    }
}

impl Default for SentimentWeight {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl TryFrom<u8> for SentimentWeight {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("sentiment weight out of range: {}", value))
    }
}

impl From<SentimentWeight> for u8 {
    fn from(weight: SentimentWeight) -> u8 {
        weight.0
    }
}

impl fmt::Display for SentimentWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
