use crate::adapters::{
    NotionNewsletterRepository, OpenAiTextGenerator, S3AudioStore, SiliconFlowSpeechSynthesizer,
    SupabaseNewsletterRepository,
};
use crate::configuration::{DocumentBackend, Settings};
use crate::domain::{AudioStore, NewsletterRepository, SpeechSynthesizer, TextGenerator};
use crate::routes::{
    generate_speech, generate_text, get_newsletter, health_check, list_channels,
    update_newsletter, TtsDefaults,
};
use crate::telemetry::CustomLevelRootSpanBuilder;
use crate::utils::json_error;
use actix_web::dev::{Server, Service};
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::StatusCode;
use actix_web::web::{self, Data};
use actix_web::{App, HttpMessage, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::{RequestId, TracingLogger};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let listener = TcpListener::bind(format!(
            "{}:{}",
            configuration.application.host_name, configuration.application.application_port
        ))?;

        let port = listener.local_addr()?.port();
        let server = run(listener, configuration)?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

fn run(listener: TcpListener, configuration: Settings) -> Result<Server, anyhow::Error> {
    let store_settings = &configuration.document_store;
    let repository: Arc<dyn NewsletterRepository> = match store_settings.backend {
        DocumentBackend::Supabase => Arc::new(SupabaseNewsletterRepository::new(
            store_settings.supabase_url.clone(),
            store_settings.supabase_service_key.clone(),
            store_settings.timeout(),
        )),
        DocumentBackend::Notion => Arc::new(NotionNewsletterRepository::new(
            store_settings.notion_base_url.clone(),
            store_settings.notion_api_token.clone(),
            store_settings.notion_database_id.clone(),
            configuration.application.base_url.clone(),
            store_settings.timeout(),
        )),
    };
    let repository_data: Data<dyn NewsletterRepository> = Data::from(repository);

    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAiTextGenerator::new(
        configuration.ai.base_url.clone(),
        configuration.ai.api_key.clone(),
        configuration.ai.model.clone(),
        configuration.ai.timeout(),
    ));
    let generator_data: Data<dyn TextGenerator> = Data::from(generator);

    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(SiliconFlowSpeechSynthesizer::new(
        configuration.tts.base_url.clone(),
        configuration.tts.api_key.clone(),
        configuration.tts.timeout(),
    ));
    let synthesizer_data: Data<dyn SpeechSynthesizer> = Data::from(synthesizer);

    let audio_store: Arc<dyn AudioStore> = Arc::new(S3AudioStore::new(&configuration.audio_store));
    let audio_store_data: Data<dyn AudioStore> = Data::from(audio_store);

    let tts_defaults = Data::new(TtsDefaults {
        model: configuration.tts.default_model.clone(),
        voice: configuration.tts.default_voice.clone(),
        max_reference_audio_bytes: configuration.tts.max_reference_audio_bytes,
    });

    let json_config = web::JsonConfig::default()
        .limit(configuration.application.max_json_payload_bytes)
        // Keep rejection bodies on the same `{"error": ...}` shape as the
        // handlers' own errors.
        .error_handler(|error, _req| {
            let (status, message) = match &error {
                JsonPayloadError::Overflow { .. }
                | JsonPayloadError::OverflowKnownLength { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large")
                }
                _ => (StatusCode::BAD_REQUEST, "Invalid JSON payload"),
            };
            InternalError::from_response(error, json_error(status, message)).into()
        });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::<CustomLevelRootSpanBuilder>::new())
            .wrap_fn(|req, srv| {
                let request_id = req.extensions().get::<RequestId>().copied();
                let res = srv.call(req);
                async move {
                    let mut res = res.await?;
                    if let Some(request_id) = request_id {
                        res.headers_mut().insert(
                            HeaderName::from_static("x-request-id"),
                            // this unwrap never fails, since UUIDs are valid ASCII strings
                            HeaderValue::from_str(&request_id.to_string()).unwrap(),
                        );
                    }
                    Ok(res)
                }
            })
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/newsletter/update", web::post().to(update_newsletter))
                    .route("/newsletter/{id}", web::get().to(get_newsletter))
                    .route("/ai/generate", web::post().to(generate_text))
                    .route("/tts/generate", web::post().to(generate_speech))
                    .route("/channels", web::get().to(list_channels)),
            )
            .app_data(json_config.clone())
            .app_data(repository_data.clone())
            .app_data(generator_data.clone())
            .app_data(synthesizer_data.clone())
            .app_data(audio_store_data.clone())
            .app_data(tts_defaults.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
