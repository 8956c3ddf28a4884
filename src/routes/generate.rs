use crate::content::html::clean_html_content;
use crate::domain::text_generator::{completion_cost, TextGenerator};
use crate::utils::{error_chain_fmt, json_error};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use serde::Deserialize;

#[derive(thiserror::Error)]
pub enum GenerateError {
    #[error("{0}")]
    ValidationError(String),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for GenerateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GenerateError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenerateError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GenerateError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            GenerateError::ValidationError(message) => message.clone(),
            GenerateError::UnexpectedError(_) => "Failed to generate content".to_string(),
        };
        json_error(self.status_code(), &message)
    }
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    prompt: Option<String>,
    content: Option<String>,
}

/// AI-assisted text generation for the editor. The editor's HTML content is
/// stripped to plain text and substituted for the `{content}` placeholder
/// in the stored prompt before the vendor call.
#[tracing::instrument(name = "Generating editor text", skip(body, generator))]
pub async fn generate_text(
    body: web::Json<GenerateRequest>,
    generator: web::Data<dyn TextGenerator>,
) -> Result<HttpResponse, GenerateError> {
    let body = body.into_inner();

    let (prompt, content) = match (
        body.prompt.filter(|p| !p.is_empty()),
        body.content.filter(|c| !c.is_empty()),
    ) {
        (Some(prompt), Some(content)) => (prompt, content),
        _ => {
            return Err(GenerateError::ValidationError(
                "Prompt and content are required".to_string(),
            ))
        }
    };

    let cleaned_content = clean_html_content(&content);
    // Only the first placeholder is substituted; later occurrences stay
    // literal.
    let final_prompt = prompt.replacen("{content}", &cleaned_content, 1);

    let started = std::time::Instant::now();

    let completion = generator
        .generate(&final_prompt)
        .await
        .context("Failure requesting a completion from the AI vendor")?;

    let cost = completion
        .usage
        .map(|usage| completion_cost(&usage))
        .unwrap_or(0.0);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "generatedText": completion.text,
        "usage": completion.usage,
        "cost": cost,
        "duration": started.elapsed().as_millis() as u64,
    })))
}
