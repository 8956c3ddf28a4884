use crate::domain::newsletter::{Newsletter, NewsletterPatch, RichTextElement};
use crate::domain::newsletter_repository::{NewsletterRepository, RepositoryError};
use crate::utils::{error_chain_fmt, json_error};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error)]
pub enum NewsletterApiError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Newsletter not found")]
    NotFound,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for NewsletterApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for NewsletterApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            NewsletterApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            NewsletterApiError::NotFound => StatusCode::NOT_FOUND,
            NewsletterApiError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            NewsletterApiError::ValidationError(message) => message.clone(),
            NewsletterApiError::NotFound => "Newsletter not found".to_string(),
            NewsletterApiError::UnexpectedError(_) => "Internal server error".to_string(),
        };
        json_error(self.status_code(), &message)
    }
}

impl From<RepositoryError> for NewsletterApiError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => NewsletterApiError::NotFound,
            RepositoryError::UnexpectedError(error) => NewsletterApiError::UnexpectedError(error),
        }
    }
}

#[derive(Deserialize)]
pub struct ProjectionQuery {
    basic: Option<String>,
    #[serde(rename = "excludePrompts")]
    exclude_prompts: Option<String>,
}

/// Flag parameters count as set when present, even with an empty value;
/// `false`/`0` opt back out.
fn flag(value: &Option<String>) -> bool {
    match value {
        Some(v) => !matches!(v.as_str(), "false" | "0"),
        None => false,
    }
}

/// Wire form of a newsletter, with the heavy and sensitive fields
/// removable per request.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsletterView {
    id: String,
    template_key: String,
    title: String,
    author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content_rich_text: Option<Vec<RichTextElement>>,
    time: String,
    annual_price: String,
    monthly_price: String,
    cta_text: String,
    benefits: Vec<String>,
    consume: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tts_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    benefits_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consume_prompt: Option<String>,
}

impl NewsletterView {
    fn project(newsletter: Newsletter, basic: bool, exclude_prompts: bool) -> Self {
        Self {
            id: newsletter.id,
            template_key: newsletter.template_key,
            title: newsletter.title,
            author: newsletter.author,
            content: (!basic).then_some(newsletter.content),
            content_rich_text: (!basic).then_some(newsletter.content_rich_text),
            time: newsletter.time,
            annual_price: newsletter.annual_price,
            monthly_price: newsletter.monthly_price,
            cta_text: newsletter.cta_text,
            benefits: newsletter.benefits,
            consume: newsletter.consume,
            tts_url: newsletter.tts_url,
            benefits_prompt: if exclude_prompts {
                None
            } else {
                newsletter.benefits_prompt
            },
            consume_prompt: if exclude_prompts {
                None
            } else {
                newsletter.consume_prompt
            },
        }
    }
}

#[tracing::instrument(
    name = "Fetching a newsletter",
    skip(query, repository),
    fields(template_key = %template_key)
)]
pub async fn get_newsletter(
    template_key: web::Path<String>,
    query: web::Query<ProjectionQuery>,
    repository: web::Data<dyn NewsletterRepository>,
) -> Result<HttpResponse, NewsletterApiError> {
    let template_key = template_key.into_inner();
    if template_key.trim().is_empty() {
        return Err(NewsletterApiError::ValidationError(
            "Newsletter ID is required".to_string(),
        ));
    }

    let newsletter = repository.fetch_by_template_key(&template_key).await?;

    let view = NewsletterView::project(
        newsletter,
        flag(&query.basic),
        flag(&query.exclude_prompts),
    );
    Ok(HttpResponse::Ok().json(view))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    page_id: Option<String>,
    data: Option<NewsletterPatch>,
}

#[tracing::instrument(name = "Updating a newsletter", skip(body, repository))]
pub async fn update_newsletter(
    body: web::Json<UpdateRequest>,
    repository: web::Data<dyn NewsletterRepository>,
) -> Result<HttpResponse, NewsletterApiError> {
    let body = body.into_inner();

    let page_id = body
        .page_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| NewsletterApiError::ValidationError("Page ID is required".to_string()))?;

    let patch = body
        .data
        .filter(|patch| !patch.is_empty())
        .ok_or_else(|| {
            NewsletterApiError::ValidationError("Update data is required".to_string())
        })?;

    repository.update(&page_id, &patch).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
}
