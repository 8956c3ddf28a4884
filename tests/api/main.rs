mod channels;
mod generate;
mod health_check;
mod helpers;
mod newsletter;
mod tts;
