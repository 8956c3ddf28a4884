pub mod catalog;
pub mod newsletter;
pub mod newsletter_repository;
pub mod speech;
pub mod text_generator;

pub use newsletter::{Newsletter, NewsletterPatch, RichTextAnnotations, RichTextElement};
pub use newsletter_repository::{NewsletterRepository, RepositoryError};
pub use speech::{AudioStore, SpeechError, SpeechSynthesizer, SynthesisRequest, VoiceSelection};
pub use text_generator::{Completion, TextGenerator, TokenUsage};
