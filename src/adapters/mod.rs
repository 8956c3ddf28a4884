pub mod notion_newsletter_repository;
pub mod openai_text_generator;
pub mod s3_audio_store;
pub mod siliconflow_speech_synthesizer;
pub mod supabase_newsletter_repository;

pub use notion_newsletter_repository::NotionNewsletterRepository;
pub use openai_text_generator::OpenAiTextGenerator;
pub use s3_audio_store::S3AudioStore;
pub use siliconflow_speech_synthesizer::SiliconFlowSpeechSynthesizer;
pub use supabase_newsletter_repository::SupabaseNewsletterRepository;
