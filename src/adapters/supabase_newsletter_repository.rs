use crate::domain::newsletter::{Newsletter, NewsletterPatch, RichTextElement};
use crate::domain::newsletter_repository::{NewsletterRepository, RepositoryError};
use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// PostgREST client for the `newsletters` table.
#[derive(Debug, Clone)]
pub struct SupabaseNewsletterRepository {
    http_client: reqwest::Client,
    base_url: String,
    service_key: Secret<String>,
}

impl SupabaseNewsletterRepository {
    pub fn new(base_url: String, service_key: Secret<String>, timeout: std::time::Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the Supabase HTTP client");
        Self {
            http_client,
            base_url,
            service_key,
        }
    }

    fn rest_url(&self) -> String {
        format!("{}/rest/v1/newsletters", self.base_url)
    }

    /// The snake_case column map for a partial update. Only patched fields
    /// appear; `updated_at` is always stamped.
    fn column_updates(patch: &NewsletterPatch) -> Map<String, Value> {
        let mut columns = Map::new();
        if let Some(title) = &patch.title {
            columns.insert("title".into(), json!(title));
        }
        if let Some(author) = &patch.author {
            columns.insert("author".into(), json!(author));
        }
        if let Some(content) = &patch.content {
            columns.insert("content".into(), json!(content));
        }
        if let Some(time) = &patch.time {
            columns.insert("time".into(), json!(time));
        }
        if let Some(annual_price) = &patch.annual_price {
            columns.insert("annual_price".into(), json!(annual_price));
        }
        if let Some(monthly_price) = &patch.monthly_price {
            columns.insert("monthly_price".into(), json!(monthly_price));
        }
        if let Some(cta_text) = &patch.cta_text {
            columns.insert("cta_text".into(), json!(cta_text));
        }
        if let Some(benefits) = &patch.benefits {
            columns.insert("benefits".into(), json!(benefits));
        }
        if let Some(consume) = &patch.consume {
            columns.insert("consume".into(), json!(consume));
        }
        if let Some(tts_url) = &patch.tts_url {
            columns.insert("tts_url".into(), json!(tts_url));
        }
        if let Some(benefits_prompt) = &patch.benefits_prompt {
            columns.insert("benefits_prompt".into(), json!(benefits_prompt));
        }
        if let Some(consume_prompt) = &patch.consume_prompt {
            columns.insert("consume_prompt".into(), json!(consume_prompt));
        }
        columns.insert("updated_at".into(), json!(Utc::now().to_rfc3339()));
        columns
    }
}

/// Raw `newsletters` row; nullable columns surface as `Option`.
#[derive(Deserialize)]
struct NewsletterRow {
    id: String,
    template_key: String,
    title: Option<String>,
    author: Option<String>,
    content: Option<String>,
    time: Option<String>,
    annual_price: Option<String>,
    monthly_price: Option<String>,
    cta_text: Option<String>,
    benefits: Option<Vec<String>>,
    consume: Option<String>,
    tts_url: Option<String>,
    benefits_prompt: Option<String>,
    consume_prompt: Option<String>,
}

impl From<NewsletterRow> for Newsletter {
    fn from(row: NewsletterRow) -> Self {
        let content = row.content.unwrap_or_default();
        Newsletter {
            id: row.id,
            template_key: row.template_key,
            title: row.title.unwrap_or_default(),
            author: row.author.unwrap_or_default(),
            // The renderer detects HTML in the rich-text wrapper and renders
            // it directly, so the stored HTML rides along as a single run.
            content_rich_text: vec![RichTextElement::plain(content.clone())],
            content,
            time: row.time.unwrap_or_default(),
            annual_price: row.annual_price.unwrap_or_default(),
            monthly_price: row.monthly_price.unwrap_or_default(),
            cta_text: row.cta_text.unwrap_or_default(),
            benefits: row.benefits.unwrap_or_default(),
            consume: row.consume.unwrap_or_default(),
            tts_url: row.tts_url.filter(|url| !url.is_empty()),
            benefits_prompt: row.benefits_prompt.filter(|p| !p.is_empty()),
            consume_prompt: row.consume_prompt.filter(|p| !p.is_empty()),
        }
    }
}

#[async_trait]
impl NewsletterRepository for SupabaseNewsletterRepository {
    #[tracing::instrument(name = "Fetching newsletter from Supabase", skip(self))]
    async fn fetch_by_template_key(
        &self,
        template_key: &str,
    ) -> Result<Newsletter, RepositoryError> {
        let response = self
            .http_client
            .get(self.rest_url())
            .query(&[
                ("template_key", format!("eq.{}", template_key)),
                ("select", "*".to_string()),
            ])
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
            .send()
            .await
            .context("Failed to query the newsletters table")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Supabase returned {}: {}", status, body).into());
        }

        let rows: Vec<NewsletterRow> = response
            .json()
            .await
            .context("Failed to deserialize the newsletters response")?;

        rows.into_iter()
            .next()
            .map(Newsletter::from)
            .ok_or(RepositoryError::NotFound)
    }

    #[tracing::instrument(name = "Updating newsletter in Supabase", skip(self, patch))]
    async fn update(&self, page_id: &str, patch: &NewsletterPatch) -> Result<(), RepositoryError> {
        let columns = Self::column_updates(patch);

        let response = self
            .http_client
            .patch(self.rest_url())
            .query(&[("id", format!("eq.{}", page_id))])
            .header("apikey", self.service_key.expose_secret())
            .bearer_auth(self.service_key.expose_secret())
            // Ask for the updated rows back so a missing id is detectable.
            .header("Prefer", "return=representation")
            .json(&columns)
            .send()
            .await
            .context("Failed to send the newsletter update")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Supabase returned {}: {}", status, body).into());
        }

        let updated: Vec<Value> = response
            .json()
            .await
            .context("Failed to deserialize the update response")?;

        if updated.is_empty() {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
