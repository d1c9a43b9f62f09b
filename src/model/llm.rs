//! Hosted LLM text generation
//!
//! Supports Hugging Face text-generation inference (the default, serving
//! Llama 2 chat), DeepSeek, Anthropic, OpenAI, and OpenAI-compatible APIs.

use super::{GenerationParams, TextGenerator};
use crate::config::LlmConfig;
use crate::error::{Result, StockyError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const HUGGINGFACE_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_HUGGINGFACE_MODEL: &str = "meta-llama/Llama-2-7b-chat-hf";

/// LLM used to describe stock sentiment
pub struct LlmModel {
    http: Client,
    provider: LlmProvider,
}

#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Text-generation inference; `endpoint` is the full generate URL
    HuggingFace {
        api_key: Option<String>,
        model: String,
        endpoint: String,
    },
    DeepSeek {
        api_key: String,
        model: String,
    },
    Anthropic {
        api_key: String,
        model: String,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: String,
    },
    /// OpenAI-compatible API (Ollama, vLLM, etc.)
    Compatible {
        api_key: Option<String>,
        model: String,
        base_url: String,
    },
}

// ============ Request/Response types ============

#[derive(Debug, Serialize)]
struct HuggingFaceRequest {
    inputs: String,
    parameters: HuggingFaceParameters,
}

#[derive(Debug, Serialize)]
struct HuggingFaceParameters {
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct HuggingFaceGeneration {
    generated_text: String,
}

/// Inference API answers with a list, a bare TGI server with one object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HuggingFaceResponse {
    Batch(Vec<HuggingFaceGeneration>),
    Single(HuggingFaceGeneration),
}

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: String,
}

/// At most `max` characters of `text`, for log and error messages
fn snippet(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

fn user_message(prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage {
        role: "user".to_string(),
        content: prompt.to_string(),
    }]
}

/// Greedy decoding for chat APIs is temperature 0 without nucleus sampling
fn chat_sampling(params: &GenerationParams) -> (f64, Option<f64>) {
    if params.do_sample {
        (params.temperature, Some(params.top_p))
    } else {
        (0.0, None)
    }
}

impl LlmModel {
    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = || {
            if config.api_key.is_empty() {
                None
            } else {
                Some(config.api_key.clone())
            }
        };
        let required_key = || {
            api_key().ok_or_else(|| {
                StockyError::Config(format!("api_key required for {} provider", config.provider))
            })
        };

        let provider = match config.provider.to_lowercase().as_str() {
            "huggingface" | "hf" | "llama" => {
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HUGGINGFACE_MODEL.to_string());
                let endpoint = config
                    .base_url
                    .as_ref()
                    .map(|url| format!("{}/generate", url.trim_end_matches('/')))
                    .unwrap_or_else(|| format!("{}/{}", HUGGINGFACE_INFERENCE_URL, model));
                LlmProvider::HuggingFace {
                    api_key: api_key(),
                    model,
                    endpoint,
                }
            }
            "deepseek" => LlmProvider::DeepSeek {
                api_key: required_key()?,
                model: config.model.clone().unwrap_or_else(|| "deepseek-chat".to_string()),
            },
            "anthropic" | "claude" => LlmProvider::Anthropic {
                api_key: required_key()?,
                model: config.model.clone().unwrap_or_else(|| "claude-sonnet-4-20250514".to_string()),
            },
            "openai" | "gpt" => LlmProvider::OpenAI {
                api_key: required_key()?,
                model: config.model.clone().unwrap_or_else(|| "gpt-4o-mini".to_string()),
                base_url: config.base_url.clone().unwrap_or_else(|| "https://api.openai.com".to_string()),
            },
            "ollama" => LlmProvider::Compatible {
                api_key: None,
                model: config.model.clone().unwrap_or_else(|| "llama2:7b-chat".to_string()),
                base_url: config.base_url.clone().unwrap_or_else(|| "http://localhost:11434".to_string()),
            },
            "compatible" | "custom" => LlmProvider::Compatible {
                api_key: api_key(),
                model: config.model.clone().ok_or_else(|| StockyError::Config("model required for compatible provider".into()))?,
                base_url: config.base_url.clone().ok_or_else(|| StockyError::Config("base_url required for compatible provider".into()))?,
            },
            _ => return Err(StockyError::Config(format!("Unknown LLM provider: {}", config.provider))),
        };

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            provider,
        })
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    pub fn name(&self) -> &str {
        match &self.provider {
            LlmProvider::HuggingFace { model, .. } => model,
            LlmProvider::DeepSeek { .. } => "DeepSeek",
            LlmProvider::Anthropic { .. } => "Claude",
            LlmProvider::OpenAI { .. } => "GPT",
            LlmProvider::Compatible { model, .. } => model,
        }
    }

    async fn call_huggingface(
        &self,
        endpoint: &str,
        api_key: Option<&str>,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let request = HuggingFaceRequest {
            inputs: prompt.to_string(),
            parameters: HuggingFaceParameters {
                max_new_tokens: params.max_length,
                temperature: params.do_sample.then_some(params.temperature),
                top_p: params.do_sample.then_some(params.top_p),
                do_sample: params.do_sample,
                // Decoder-only output echoes the prompt, as a local decode would
                return_full_text: true,
            },
        };

        let mut req = self.http.post(endpoint).json(&request);
        if let Some(key) = api_key {
            req = req.bearer_auth(key);
        }

        let text = Self::read_body(req.send().await?).await?;
        let response: HuggingFaceResponse = serde_json::from_str(&text).map_err(|e| {
            StockyError::Model(format!("JSON parse error: {} - response: {}", e, snippet(&text, 200)))
        })?;

        match response {
            HuggingFaceResponse::Single(generation) => Ok(generation.generated_text),
            HuggingFaceResponse::Batch(generations) => generations
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| StockyError::Model("Empty response from text-generation endpoint".into())),
        }
    }

    async fn call_openai_compatible(
        &self,
        base_url: &str,
        api_key: Option<&str>,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let (temperature, top_p) = chat_sampling(params);
        let request = OpenAIRequest {
            model: model.to_string(),
            messages: user_message(prompt),
            max_tokens: params.max_length,
            temperature,
            top_p,
        };

        let mut req = self
            .http
            .post(format!("{}/v1/chat/completions", base_url.trim_end_matches('/')))
            .json(&request);

        if let Some(key) = api_key {
            req = req.bearer_auth(key);
        }

        let text = Self::read_body(req.send().await?).await?;
        let response: OpenAIResponse = serde_json::from_str(&text).map_err(|e| {
            StockyError::Model(format!("JSON parse error: {} - response: {}", e, snippet(&text, 200)))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| StockyError::Model("Empty response from LLM".into()))
    }

    async fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String> {
        let (temperature, top_p) = chat_sampling(params);
        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: params.max_length,
            temperature,
            top_p,
            messages: user_message(prompt),
        };

        let resp = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request)
            .send()
            .await?;

        let text = Self::read_body(resp).await?;
        let response: AnthropicResponse = serde_json::from_str(&text)?;

        response
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| StockyError::Model("Empty response from Anthropic".into()))
    }

    /// Body of a successful response; anything else becomes a model error
    async fn read_body(resp: reqwest::Response) -> Result<String> {
        let status = resp.status();
        let text = resp.text().await?;
        tracing::debug!("LLM raw response ({}): {}", status, snippet(&text, 500));

        if !status.is_success() {
            return Err(StockyError::Model(format!(
                "HTTP {} from LLM endpoint: {}",
                status,
                snippet(&text, 200)
            )));
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for LlmModel {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        match &self.provider {
            LlmProvider::HuggingFace { api_key, endpoint, .. } => {
                self.call_huggingface(endpoint, api_key.as_deref(), prompt, params)
                    .await
            }
            LlmProvider::DeepSeek { api_key, model } => {
                self.call_openai_compatible("https://api.deepseek.com", Some(api_key), model, prompt, params)
                    .await
            }
            LlmProvider::Anthropic { api_key, model } => {
                self.call_anthropic(api_key, model, prompt, params).await
            }
            LlmProvider::OpenAI { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, Some(api_key), model, prompt, params)
                    .await
            }
            LlmProvider::Compatible { api_key, model, base_url } => {
                self.call_openai_compatible(base_url, api_key.as_deref(), model, prompt, params)
                    .await
            }
        }
    }
}
