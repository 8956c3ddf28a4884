use crate::content::html::sanitize_for_store;
use crate::domain::newsletter::{Newsletter, NewsletterPatch, RichTextElement};
use crate::domain::newsletter_repository::{NewsletterRepository, RepositoryError};
use anyhow::Context;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde_json::{json, Map, Value};

const NOTION_VERSION: &str = "2022-06-28";
/// Notion caps each rich-text object at 2000 characters; longer content is
/// written as consecutive chunks.
const NOTION_TEXT_CHUNK: usize = 2000;

// Property names of the legacy Notion database.
const PROP_TEMPLATE_KEY: &str = "Magnet 模板键";
const PROP_TITLE: &str = "Newsletter 标题";
const PROP_AUTHOR: &str = "作者";
const PROP_CONTENT: &str = "Newsletter 内容";
const PROP_TIME: &str = "时间";
const PROP_ANNUAL_PRICE: &str = "年订阅费用";
const PROP_MONTHLY_PRICE: &str = "月订阅费用";
const PROP_CTA: &str = "CTA 文案";
const PROP_BENEFITS: &str = "You will get";
const PROP_CONSUME: &str = "consume";
const PROP_TTS_URL: &str = "TTS 语音";
const PROP_TTS_FILE: &str = "TTS 源文件";

/// Legacy document store. Kept for databases that have not migrated to
/// Supabase; the AI prompt fields do not exist in this schema.
#[derive(Debug, Clone)]
pub struct NotionNewsletterRepository {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Secret<String>,
    database_id: String,
    /// Used to absolutise relative TTS URLs before writing them back.
    app_base_url: String,
}

impl NotionNewsletterRepository {
    pub fn new(
        base_url: String,
        api_token: Secret<String>,
        database_id: String,
        app_base_url: String,
        timeout: std::time::Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the Notion HTTP client");
        Self {
            http_client,
            base_url,
            api_token,
            database_id,
            app_base_url,
        }
    }

    fn page_from(&self, page: &Value) -> Newsletter {
        let props = &page["properties"];

        let content = concat_plain_text(&props[PROP_CONTENT]["rich_text"]);
        let content_rich_text: Vec<RichTextElement> =
            serde_json::from_value(props[PROP_CONTENT]["rich_text"].clone()).unwrap_or_default();

        let benefits = concat_plain_text(&props[PROP_BENEFITS]["rich_text"])
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(strip_list_marker)
            .collect();

        // The TTS property has existed as both a URL property and a plain
        // text property across database versions.
        let tts_url = props[PROP_TTS_URL]["url"]
            .as_str()
            .map(str::to_string)
            .or_else(|| {
                let text = concat_plain_text(&props[PROP_TTS_URL]["rich_text"]);
                (!text.is_empty()).then_some(text)
            });

        Newsletter {
            id: page["id"].as_str().unwrap_or_default().to_string(),
            template_key: concat_plain_text(&props[PROP_TEMPLATE_KEY]["title"]),
            title: concat_plain_text(&props[PROP_TITLE]["rich_text"]),
            author: concat_plain_text(&props[PROP_AUTHOR]["rich_text"]),
            content,
            content_rich_text,
            time: concat_plain_text(&props[PROP_TIME]["rich_text"]),
            annual_price: concat_plain_text(&props[PROP_ANNUAL_PRICE]["rich_text"]),
            monthly_price: concat_plain_text(&props[PROP_MONTHLY_PRICE]["rich_text"]),
            cta_text: concat_plain_text(&props[PROP_CTA]["rich_text"]),
            benefits,
            consume: concat_plain_text(&props[PROP_CONSUME]["rich_text"]),
            tts_url,
            benefits_prompt: None,
            consume_prompt: None,
        }
    }

    fn properties_from(&self, patch: &NewsletterPatch) -> Map<String, Value> {
        let mut properties = Map::new();

        if let Some(title) = &patch.title {
            properties.insert(PROP_TITLE.into(), text_property(title));
        }
        if let Some(author) = &patch.author {
            properties.insert(PROP_AUTHOR.into(), text_property(author));
        }
        if let Some(content) = &patch.content {
            let sanitized = sanitize_for_store(content);
            let runs: Vec<Value> = chunk_chars(&sanitized, NOTION_TEXT_CHUNK)
                .into_iter()
                .map(|chunk| json!({ "text": { "content": chunk } }))
                .collect();
            properties.insert(PROP_CONTENT.into(), json!({ "rich_text": runs }));
        }
        if let Some(time) = &patch.time {
            properties.insert(PROP_TIME.into(), text_property(time));
        }
        if let Some(annual_price) = &patch.annual_price {
            properties.insert(PROP_ANNUAL_PRICE.into(), text_property(annual_price));
        }
        if let Some(monthly_price) = &patch.monthly_price {
            properties.insert(PROP_MONTHLY_PRICE.into(), text_property(monthly_price));
        }
        if let Some(cta_text) = &patch.cta_text {
            properties.insert(PROP_CTA.into(), text_property(cta_text));
        }
        if let Some(benefits) = &patch.benefits {
            properties.insert(PROP_BENEFITS.into(), text_property(&benefits.join("\n")));
        }
        if let Some(consume) = &patch.consume {
            properties.insert(PROP_CONSUME.into(), text_property(consume));
        }
        if let Some(tts_url) = &patch.tts_url {
            let absolute = if tts_url.starts_with('/') {
                format!("{}{}", self.app_base_url, tts_url)
            } else {
                tts_url.clone()
            };
            if absolute.is_empty() {
                properties.insert(PROP_TTS_URL.into(), json!({ "url": null }));
                properties.insert(PROP_TTS_FILE.into(), json!({ "files": [] }));
            } else {
                properties.insert(PROP_TTS_URL.into(), json!({ "url": absolute }));
                properties.insert(
                    PROP_TTS_FILE.into(),
                    json!({
                        "files": [{
                            "name": format!("tts_{}.wav", chrono::Utc::now().format("%Y-%m-%d")),
                            "type": "external",
                            "external": { "url": absolute }
                        }]
                    }),
                );
            }
        }
        // benefits_prompt / consume_prompt have no columns in the legacy
        // schema and are silently dropped.

        properties
    }
}

#[async_trait]
impl NewsletterRepository for NotionNewsletterRepository {
    #[tracing::instrument(name = "Fetching newsletter from Notion", skip(self))]
    async fn fetch_by_template_key(
        &self,
        template_key: &str,
    ) -> Result<Newsletter, RepositoryError> {
        let response = self
            .http_client
            .post(format!(
                "{}/v1/databases/{}/query",
                self.base_url, self.database_id
            ))
            .bearer_auth(self.api_token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({
                "filter": {
                    "property": PROP_TEMPLATE_KEY,
                    "title": { "equals": template_key }
                }
            }))
            .send()
            .await
            .context("Failed to query the Notion database")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Notion API returned {}: {}", status, body).into());
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to deserialize the Notion query response")?;

        match body["results"].as_array().and_then(|pages| pages.first()) {
            Some(page) => Ok(self.page_from(page)),
            None => Err(RepositoryError::NotFound),
        }
    }

    #[tracing::instrument(name = "Updating newsletter in Notion", skip(self, patch))]
    async fn update(&self, page_id: &str, patch: &NewsletterPatch) -> Result<(), RepositoryError> {
        let properties = self.properties_from(patch);

        let response = self
            .http_client
            .patch(format!("{}/v1/pages/{}", self.base_url, page_id))
            .bearer_auth(self.api_token.expose_secret())
            .header("Notion-Version", NOTION_VERSION)
            .json(&json!({ "properties": properties }))
            .send()
            .await
            .context("Failed to send the Notion page update")?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Notion API returned {}: {}", status, body).into());
        }
        Ok(())
    }
}

/// Notion splits long values into multiple rich-text fragments; concatenate
/// every `plain_text` to recover the full value.
fn concat_plain_text(fragments: &Value) -> String {
    fragments
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["plain_text"].as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn text_property(content: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": content } }] })
}

/// Remove a leading `- ` / `• ` / `* ` / `1. ` marker from a benefits line.
fn strip_list_marker(line: &str) -> String {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('•'))
        .or_else(|| trimmed.strip_prefix('*'))
    {
        return rest.trim_start().to_string();
    }
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        if let Some(rest) = trimmed[digits.len()..].strip_prefix('.') {
            return rest.trim_start().to_string();
        }
    }
    trimmed.to_string()
}

fn chunk_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
