use crate::domain::speech::{
    AudioStore, SpeechError, SpeechSynthesizer, SynthesisRequest, VoiceSelection,
};
use crate::utils::{error_chain_fmt, json_error};
use actix_multipart::{Field, Multipart};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use futures_util::TryStreamExt;
use uuid::Uuid;

/// Fallback defaults and limits for speech synthesis, registered as app
/// data at startup.
#[derive(Clone)]
pub struct TtsDefaults {
    pub model: String,
    pub voice: String,
    pub max_reference_audio_bytes: usize,
}

#[derive(thiserror::Error)]
pub enum GenerateSpeechError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("API Limit Reached: {0}")]
    QuotaExceeded(String),
    #[error("API Error: {status} {body}")]
    VendorError { status: u16, body: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for GenerateSpeechError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for GenerateSpeechError {
    fn status_code(&self) -> StatusCode {
        match self {
            GenerateSpeechError::ValidationError(_) => StatusCode::BAD_REQUEST,
            GenerateSpeechError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GenerateSpeechError::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            GenerateSpeechError::VendorError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GenerateSpeechError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            GenerateSpeechError::UnexpectedError(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };
        json_error(self.status_code(), &message)
    }
}

impl From<SpeechError> for GenerateSpeechError {
    fn from(error: SpeechError) -> Self {
        match error {
            SpeechError::QuotaExceeded(body) => GenerateSpeechError::QuotaExceeded(body),
            SpeechError::Vendor { status, body } => {
                GenerateSpeechError::VendorError { status, body }
            }
            SpeechError::UnexpectedError(error) => GenerateSpeechError::UnexpectedError(error),
        }
    }
}

#[derive(Default)]
struct SpeechForm {
    text: Option<String>,
    voice: Option<String>,
    model: Option<String>,
    speed: Option<f32>,
    emotion_prompt: Option<String>,
    reference_audio: Option<(Vec<u8>, String)>,
    reference_text: Option<String>,
}

/// Synthesize the submitted text and host the resulting WAV on the audio
/// bucket. A failed store call after a successful synthesis is surfaced as
/// the store failure; the synthesis is not compensated.
#[tracing::instrument(name = "Generating speech", skip(payload, defaults, synthesizer, audio_store))]
pub async fn generate_speech(
    payload: Multipart,
    defaults: web::Data<TtsDefaults>,
    synthesizer: web::Data<dyn SpeechSynthesizer>,
    audio_store: web::Data<dyn AudioStore>,
) -> Result<HttpResponse, GenerateSpeechError> {
    let form = read_speech_form(payload, defaults.max_reference_audio_bytes).await?;

    let text = form
        .text
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| GenerateSpeechError::ValidationError("Text is required".to_string()))?;

    let request = match form.reference_audio {
        Some((audio, mime_type)) => SynthesisRequest {
            text,
            // Cloning keeps the caller's model choice; a selected system
            // voice does not apply here.
            model: form.model.unwrap_or_else(|| defaults.model.clone()),
            voice: VoiceSelection::Reference {
                audio,
                mime_type,
                text: form.reference_text,
            },
            speed: form.speed,
            emotion_prompt: form.emotion_prompt,
        },
        None => {
            let voice = form.voice.unwrap_or_else(|| defaults.voice.clone());
            // Prefixed voices ("model:voice") pin the model themselves.
            let model = match voice.split_once(':') {
                Some((prefix, _)) => prefix.to_string(),
                None => form.model.unwrap_or_else(|| defaults.model.clone()),
            };
            SynthesisRequest {
                text,
                model,
                voice: VoiceSelection::System(voice),
                speed: form.speed,
                emotion_prompt: form.emotion_prompt,
            }
        }
    };

    let audio = synthesizer.synthesize(&request).await?;

    let key = format!("audio/{}.wav", Uuid::new_v4());
    let url = audio_store
        .store_audio(&key, "audio/wav", audio)
        .await
        .context("Failure storing the synthesized audio")?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "url": url })))
}

async fn read_speech_form(
    mut payload: Multipart,
    max_reference_audio_bytes: usize,
) -> Result<SpeechForm, GenerateSpeechError> {
    let mut form = SpeechForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(bad_payload)? {
        let name = field.name().to_string();
        match name.as_str() {
            "text" => form.text = Some(read_string(&mut field).await?),
            "voice" => form.voice = Some(read_string(&mut field).await?).filter(|v| !v.is_empty()),
            "model" => form.model = Some(read_string(&mut field).await?).filter(|m| !m.is_empty()),
            "speed" => {
                let raw = read_string(&mut field).await?;
                if !raw.is_empty() {
                    form.speed = Some(raw.parse().map_err(|_| {
                        GenerateSpeechError::ValidationError(format!(
                            "Invalid speed value: {}",
                            raw
                        ))
                    })?);
                }
            }
            "emotion_prompt" => {
                form.emotion_prompt =
                    Some(read_string(&mut field).await?).filter(|p| !p.is_empty())
            }
            "referenceText" => {
                form.reference_text =
                    Some(read_string(&mut field).await?).filter(|t| !t.is_empty())
            }
            "referenceAudio" => {
                let mime_type = field
                    .content_type()
                    .map(|mime| mime.to_string())
                    .unwrap_or_else(|| "audio/wav".to_string());
                let bytes = read_bytes(&mut field, Some(max_reference_audio_bytes)).await?;
                if !bytes.is_empty() {
                    form.reference_audio = Some((bytes, mime_type));
                }
            }
            _ => {
                // Unknown fields are drained and ignored.
                read_bytes(&mut field, None).await?;
            }
        }
    }

    Ok(form)
}

async fn read_string(field: &mut Field) -> Result<String, GenerateSpeechError> {
    let bytes = read_bytes(field, None).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn read_bytes(
    field: &mut Field,
    cap: Option<usize>,
) -> Result<Vec<u8>, GenerateSpeechError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_payload)? {
        if let Some(cap) = cap {
            if data.len() + chunk.len() > cap {
                return Err(GenerateSpeechError::PayloadTooLarge(format!(
                    "Reference audio exceeds the {} byte limit",
                    cap
                )));
            }
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

fn bad_payload(error: actix_multipart::MultipartError) -> GenerateSpeechError {
    GenerateSpeechError::ValidationError(format!("Invalid multipart payload: {}", error))
}
