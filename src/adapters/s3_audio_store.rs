use crate::configuration::AudioStoreSettings;
use crate::domain::speech::AudioStore;
use anyhow::Context;
use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use secrecy::ExposeSecret;

#[derive(Debug, Clone)]
pub struct S3AudioStore {
    s3_client: Client,
    bucket_name: String,
    region: String,
}

impl S3AudioStore {
    pub fn new(settings: &AudioStoreSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.expose_secret(),
            settings.secret_access_key.expose_secret(),
            None,
            None,
            "configuration",
        );

        let mut conf_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::v2023_11_09())
            .credentials_provider(credentials)
            .region(Region::new(settings.region.clone()));

        if let Some(endpoint) = &settings.endpoint {
            conf_builder = conf_builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            s3_client: Client::from_conf(conf_builder.build()),
            bucket_name: settings.bucket_name.clone(),
            region: settings.region.clone(),
        }
    }

    /// Standard S3 URL pattern; the bucket is publicly readable.
    fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket_name, self.region, key
        )
    }
}

#[async_trait]
impl AudioStore for S3AudioStore {
    #[tracing::instrument(name = "Storing audio object in S3", skip(self, bytes))]
    async fn store_audio(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, anyhow::Error> {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .context(format!(
                "Failure uploading audio object to bucket {}",
                &self.bucket_name
            ))?;

        Ok(self.public_url(key))
    }
}
