use magnet_studio::configuration::get_configuration;
use magnet_studio::startup::Application;
use magnet_studio::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub port: u16,
    /// Stands in for the Supabase REST endpoint.
    pub document_server: MockServer,
    /// Stands in for the chat completions vendor.
    pub ai_server: MockServer,
    /// Stands in for the speech synthesis vendor.
    pub tts_server: MockServer,
    /// Stands in for the S3 endpoint.
    pub storage_server: MockServer,
}

impl TestApp {
    pub async fn get_newsletter(&self, path_and_query: &str) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/api/newsletter/{}", &self.address, path_and_query))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_newsletter_update(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/newsletter/update", &self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_generate(&self, body: serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/ai/generate", &self.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_tts(&self, form: reqwest::multipart::Form) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/tts/generate", &self.address))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let document_server = MockServer::start().await;
    let ai_server = MockServer::start().await;
    let tts_server = MockServer::start().await;
    let storage_server = MockServer::start().await;

    // Randomise configuration to ensure test isolation
    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        // Use a random OS port
        c.application.application_port = 0;
        // Point every outbound adapter at a mock server
        c.document_store.supabase_url = document_server.uri();
        c.ai.base_url = ai_server.uri();
        c.tts.base_url = tts_server.uri();
        c.audio_store.endpoint = Some(storage_server.uri());
        // Small caps keep the oversized-payload cases cheap
        c.tts.max_reference_audio_bytes = 1024;
        c.application.max_json_payload_bytes = 4096;
        c
    };

    // Launch the application as a background task
    let application = Application::build(configuration)
        .await
        .expect("Failed to build application.");
    let application_port = application.port();
    let _ = tokio::spawn(application.run_until_stopped());

    TestApp {
        address: format!("http://localhost:{}", application_port),
        port: application_port,
        document_server,
        ai_server,
        tts_server,
        storage_server,
    }
}

/// A full `newsletters` row as the REST endpoint returns it.
pub fn newsletter_row(template_key: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "page-1",
        "template_key": template_key,
        "title": "The Operator's Notebook",
        "author": "Dana Reeve",
        "content": "<p>Welcome aboard.</p>",
        "time": "5 min",
        "annual_price": "$96",
        "monthly_price": "$12",
        "cta_text": "Subscribe now",
        "benefits": ["Weekly deep dives", "Private archive"],
        "consume": "Read in the morning.",
        "tts_url": "https://magnet-audio.s3.us-east-1.amazonaws.com/audio/existing.wav",
        "benefits_prompt": "List the benefits of {content}",
        "consume_prompt": "Describe how to consume {content}",
        "updated_at": "2024-05-01T00:00:00Z"
    })
}
