use crate::domain::text_generator::{Completion, TextGenerator, TokenUsage};
use anyhow::Context;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Chat-completions client. One user message per request; the editor builds
/// the full prompt itself.
#[derive(Debug, Clone)]
pub struct OpenAiTextGenerator {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
    model: String,
}

impl OpenAiTextGenerator {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        model: String,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the AI HTTP client");
        Self {
            http_client,
            base_url,
            api_key,
            model,
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    #[tracing::instrument(name = "Requesting chat completion", skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<Completion, anyhow::Error> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .context("Failed to reach the chat-completions API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("chat-completions API returned {}: {}", status, body);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to deserialize the chat-completions response")?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(Completion {
            text,
            usage: body.usage,
        })
    }
}
