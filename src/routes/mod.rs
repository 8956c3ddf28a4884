mod catalog;
mod generate;
mod health_check;
mod newsletter;
mod tts;

pub use catalog::list_channels;
pub use generate::generate_text;
pub use health_check::health_check;
pub use newsletter::{get_newsletter, update_newsletter};
pub use tts::{generate_speech, TtsDefaults};
