//! Configuration management

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::model::GenerationParams;
use crate::reference::DEFAULT_FALLBACK_URL;
use crate::resolver::DEFAULT_REFERENCE_PATH;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceConfig {
    /// Stock reference table (JSON array of `{tag, name}` objects)
    #[serde(default = "default_reference_path")]
    pub path: String,
    /// Page holding the top stocks table; read from `source_file` when unset
    #[serde(default)]
    pub source_url: Option<String>,
    /// Text file whose contents are the source page URL
    #[serde(default = "default_source_file")]
    pub source_file: String,
    /// Page tried when the source has no usable table; empty disables it
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_scrape_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewsConfig {
    /// Search endpoint queried once per stock
    #[serde(default = "default_search_url")]
    pub search_url: String,
    /// Browser-like User-Agent sent with every search
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum result containers read per stock
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Request timeout; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// LLM provider (huggingface, openai, deepseek, anthropic, ollama, compatible)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Model name
    #[serde(default)]
    pub model: Option<String>,
    /// Override for the provider's API base URL
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,
    /// Request timeout; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_reference_path() -> String {
    DEFAULT_REFERENCE_PATH.to_string()
}

fn default_source_file() -> String {
    "../Links/requirements.txt".to_string()
}

fn default_fallback_url() -> String {
    DEFAULT_FALLBACK_URL.to_string()
}

fn default_scrape_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_scrape_timeout() -> u64 {
    60
}

fn default_search_url() -> String {
    "https://www.google.com/search".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_provider() -> String {
    "huggingface".to_string()
}

fn default_max_length() -> u32 {
    512
}

fn default_temperature() -> f64 {
    0.7
}

fn default_top_p() -> f64 {
    0.9
}

fn default_do_sample() -> bool {
    true
}

impl Config {
    /// Load configuration from file, with `STOCKY__*` environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(
                config::Environment::with_prefix("STOCKY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations, falling back to built-in defaults
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["stocky.toml", "config.toml", "~/.config/stocky/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }
}

impl ReferenceConfig {
    /// Reference path with a leading `~` expanded
    pub fn resolved_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).as_ref())
    }

    pub fn resolved_source_file(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.source_file).as_ref())
    }
}

impl LlmConfig {
    /// Sampling parameters passed to every generation call
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            max_length: self.max_length,
            temperature: self.temperature,
            top_p: self.top_p,
            do_sample: self.do_sample,
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            path: default_reference_path(),
            source_url: None,
            source_file: default_source_file(),
            fallback_url: default_fallback_url(),
            user_agent: default_scrape_user_agent(),
            timeout_secs: default_scrape_timeout(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            search_url: default_search_url(),
            user_agent: default_user_agent(),
            max_results: default_max_results(),
            timeout_secs: None,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            model: None,
            base_url: None,
            max_length: default_max_length(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            do_sample: default_do_sample(),
            timeout_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_generation_contract() {
        let config = Config::default();
        assert_eq!(config.reference.path, "../Json/top_stocks.json");
        assert_eq!(config.news.max_results, 10);
        assert!(config.news.timeout_secs.is_none());

        let params = config.llm.generation_params();
        assert_eq!(params.max_length, 512);
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.top_p, 0.9);
        assert!(params.do_sample);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            provider = "openai"
            api_key = "sk-test"
            temperature = 0.2

            [news]
            max_results = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.llm.top_p, 0.9);
        assert_eq!(config.news.max_results, 3);
        assert_eq!(config.news.search_url, "https://www.google.com/search");
        assert_eq!(config.reference.path, DEFAULT_REFERENCE_PATH);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[reference]\npath = \"data/stocks.json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.reference.path, "data/stocks.json");
        assert_eq!(config.llm.provider, "huggingface");
    }

    #[test]
    fn test_reference_scrape_defaults() {
        let config: Config = toml::from_str(
            r#"
            [reference]
            source_url = "https://screener.example.com/top"
            fallback_url = ""
            "#,
        )
        .unwrap();

        assert_eq!(config.reference.source_url.as_deref(), Some("https://screener.example.com/top"));
        assert!(config.reference.fallback_url.is_empty());
        assert_eq!(config.reference.source_file, "../Links/requirements.txt");
        assert_eq!(config.reference.timeout_secs, 60);
        assert!(config.reference.user_agent.contains("Chrome/120"));
        assert_eq!(
            ReferenceConfig::default().fallback_url,
            "https://stockanalysis.com/stocks/market-cap/"
        );
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = Config::load("does/not/exist.toml").unwrap();
        assert_eq!(config.news.max_results, 10);
    }

    #[test]
    fn test_resolved_path_plain() {
        let reference = ReferenceConfig {
            path: "Json/top_stocks.json".to_string(),
            ..ReferenceConfig::default()
        };
        assert_eq!(reference.resolved_path(), PathBuf::from("Json/top_stocks.json"));
    }
}
