//! Generative language model boundary
//!
//! The describer only sees [`TextGenerator`]; [`LlmModel`] is the hosted
//! implementation, built once from configuration and injected.

pub mod llm;

pub use llm::{LlmModel, LlmProvider};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Sampling parameters for a generation call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Upper bound on generated tokens
    pub max_length: u32,
    pub temperature: f64,
    /// Nucleus-sampling threshold
    pub top_p: f64,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 512,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
        }
    }
}

/// Anything that can continue a prompt with free text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}
