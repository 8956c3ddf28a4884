use crate::utils::error_chain_fmt;
use async_trait::async_trait;

/// What to speak with, either a named system voice or a caller-supplied
/// reference recording for cloning.
#[derive(Debug, Clone)]
pub enum VoiceSelection {
    System(String),
    Reference {
        audio: Vec<u8>,
        mime_type: String,
        text: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub model: String,
    pub voice: VoiceSelection,
    pub speed: Option<f32>,
    pub emotion_prompt: Option<String>,
}

#[derive(thiserror::Error)]
pub enum SpeechError {
    #[error("speech vendor quota exhausted: {0}")]
    QuotaExceeded(String),
    #[error("speech vendor returned {status}: {body}")]
    Vendor { status: u16, body: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SpeechError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Port over the text-to-speech vendor. Returns raw WAV bytes.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SpeechError>;
}

/// Port over the object store hosting synthesized audio. Returns the public
/// URL of the stored object.
#[async_trait]
pub trait AudioStore: Send + Sync {
    async fn store_audio(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, anyhow::Error>;
}
