use crate::domain::speech::{SpeechError, SpeechSynthesizer, SynthesisRequest, VoiceSelection};
use anyhow::Context;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Body substring the vendor uses to signal an exhausted quota.
const QUOTA_ERROR_MARKER: &str = "\"code\":30011";

#[derive(Debug, Clone)]
pub struct SiliconFlowSpeechSynthesizer {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(Serialize)]
struct SpeechRequestBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra_body: Option<Value>,
}

#[derive(Deserialize)]
struct VoiceUploadResponse {
    uri: String,
}

impl SiliconFlowSpeechSynthesizer {
    pub fn new(base_url: String, api_key: Secret<String>, timeout: std::time::Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the TTS HTTP client");
        Self {
            http_client,
            base_url,
            api_key,
        }
    }

    /// Upload a reference recording and obtain a voice URI for cloning.
    #[tracing::instrument(name = "Uploading reference voice", skip(self, audio, text))]
    async fn upload_reference_voice(
        &self,
        model: &str,
        audio: &[u8],
        mime_type: &str,
        text: Option<&str>,
    ) -> Result<String, SpeechError> {
        let data_uri = format!("data:{};base64,{}", mime_type, BASE64.encode(audio));

        let response = self
            .http_client
            .post(format!("{}/uploads/audio/voice", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "model": model,
                "customName": format!("reference-{}", uuid::Uuid::new_v4()),
                "audio": data_uri,
                "text": text.unwrap_or("Reference recording"),
            }))
            .send()
            .await
            .context("Failed to upload the reference voice")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_vendor_error(status.as_u16(), body));
        }

        let body: VoiceUploadResponse = response
            .json()
            .await
            .context("Failed to deserialize the voice upload response")?;
        Ok(body.uri)
    }
}

#[async_trait]
impl SpeechSynthesizer for SiliconFlowSpeechSynthesizer {
    #[tracing::instrument(name = "Synthesizing speech", skip(self, request), fields(model = %request.model))]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError> {
        let voice = match &request.voice {
            VoiceSelection::System(name) => name.clone(),
            VoiceSelection::Reference {
                audio,
                mime_type,
                text,
            } => {
                self.upload_reference_voice(&request.model, audio, mime_type, text.as_deref())
                    .await?
            }
        };

        let extra_body = request
            .emotion_prompt
            .as_ref()
            .map(|prompt| json!({ "emotion_prompt": prompt }));

        let body = SpeechRequestBody {
            model: &request.model,
            input: &request.text,
            voice: &voice,
            response_format: "wav",
            speed: request.speed,
            extra_body,
        };

        let response = self
            .http_client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("Failed to reach the speech API")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "speech vendor error");
            return Err(classify_vendor_error(status.as_u16(), body));
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read the synthesized audio body")?;
        Ok(bytes.to_vec())
    }
}

fn classify_vendor_error(status: u16, body: String) -> SpeechError {
    if body.contains(QUOTA_ERROR_MARKER) {
        SpeechError::QuotaExceeded(body)
    } else {
        SpeechError::Vendor { status, body }
    }
}
