use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Published per-million-token rates for the configured chat model. The
/// cached-input rate is listed but not yet billed; vendors do not report
/// `cached_tokens` consistently.
pub const INPUT_PRICE_PER_MILLION: f64 = 0.25;
pub const CACHED_INPUT_PRICE_PER_MILLION: f64 = 0.025;
pub const OUTPUT_PRICE_PER_MILLION: f64 = 2.00;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens_details: Option<PromptTokensDetails>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptTokensDetails {
    #[serde(default)]
    pub cached_tokens: u64,
}

/// Dollar cost of one completion. Every prompt token is billed at the
/// input rate, whether or not the vendor reports a cached share.
pub fn completion_cost(usage: &TokenUsage) -> f64 {
    (usage.prompt_tokens as f64 * INPUT_PRICE_PER_MILLION
        + usage.completion_tokens as f64 * OUTPUT_PRICE_PER_MILLION)
        / 1_000_000.0
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

/// Port over the chat-completions vendor.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Completion, anyhow::Error>;
}
