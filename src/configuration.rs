use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub document_store: DocumentStoreSettings,
    pub ai: AiSettings,
    pub tts: TtsSettings,
    pub audio_store: AudioStoreSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    pub application_port: u16,
    pub host_name: String,
    pub base_url: String,
    /// JSON bodies above this size are rejected with 413.
    pub max_json_payload_bytes: usize,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentBackend {
    Supabase,
    Notion,
}

#[derive(Deserialize, Clone)]
pub struct DocumentStoreSettings {
    pub backend: DocumentBackend,
    pub supabase_url: String,
    pub supabase_service_key: Secret<String>,
    pub notion_base_url: String,
    pub notion_api_token: Secret<String>,
    pub notion_database_id: String,
    pub timeout_milliseconds: u64,
}

impl DocumentStoreSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct AiSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub model: String,
    pub timeout_milliseconds: u64,
}

impl AiSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct TtsSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    pub default_model: String,
    pub default_voice: String,
    /// Reference audio uploads above this size are rejected with 413.
    pub max_reference_audio_bytes: usize,
    pub timeout_milliseconds: u64,
}

impl TtsSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone)]
pub struct AudioStoreSettings {
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: Secret<String>,
    pub secret_access_key: Secret<String>,
    /// Endpoint override for local development and tests; public URLs are
    /// always composed from bucket + region.
    pub endpoint: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    pub service_name: String,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");

    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");
    let environment_filename = format!("{}.yaml", environment.as_str());

    // Init configuration reader
    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // Add in settings from environment variables (with a prefix of APP and '__' as separator)
        // E.g. `APP_APPLICATION__APPLICATION_PORT=5001 would set `Settings.application.application_port`
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either local or production",
                other
            )),
        }
    }
}
