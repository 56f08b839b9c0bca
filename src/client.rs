use aws_config::{BehaviorVersion, Region, meta::region::RegionProviderChain};
use aws_sdk_kinesis::Client;

use crate::{Error, Result};

pub const KINESIS_DEFAULT_REGION: &str = "us-west-2";

/// Configuration for creating a Kinesis client.
#[derive(Debug, Clone, PartialEq)]
pub struct KinesisClientConfig {
    /// AWS region where the Kinesis stream is located
    pub region: String,
    /// Custom endpoint URL, e.g. for localstack
    pub endpoint_url: Option<String>,
    /// Static credentials; falls back to the default provider chain when unset
    pub auth: Option<AwsCredentials>,
}

impl Default for KinesisClientConfig {
    fn default() -> Self {
        KinesisClientConfig {
            region: KINESIS_DEFAULT_REGION.to_string(),
            endpoint_url: None,
            auth: None,
        }
    }
}

impl KinesisClientConfig {
    fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(Error::InvalidConfig("region must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AwsCredentials {{ access_key_id: {}, secret_access_key: **** }}",
            self.access_key_id
        )
    }
}

/// Creates and configures a Kinesis client based on the provided configuration.
pub async fn create_kinesis_client(config: KinesisClientConfig) -> Result<Client> {
    config.validate()?;

    tracing::info!(
        region = config.region.clone(),
        "Creating Kinesis client in region"
    );

    let region_provider = RegionProviderChain::first_try(Region::new(config.region.clone()))
        .or_default_provider()
        .or_else(Region::new(KINESIS_DEFAULT_REGION));

    let mut config_builder =
        aws_config::defaults(BehaviorVersion::v2024_03_28()).region(region_provider);

    if let Some(endpoint_url) = config.endpoint_url {
        config_builder = config_builder.endpoint_url(endpoint_url);
    }

    if let Some(credentials) = config.auth {
        config_builder =
            config_builder.credentials_provider(aws_sdk_kinesis::config::Credentials::new(
                credentials.access_key_id,
                credentials.secret_access_key,
                None,
                None,
                "kinesis-sink",
            ));
    }

    let shared_config = config_builder.load().await;

    Ok(Client::new(&shared_config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation_with_defaults() {
        let config = KinesisClientConfig::default();
        assert_eq!(config.region, KINESIS_DEFAULT_REGION);

        let result = create_kinesis_client(config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_client_creation_with_custom_endpoint() {
        let mut config = KinesisClientConfig {
            region: "us-west-2".to_string(),
            endpoint_url: Some("http://localhost:4566".to_string()),
            auth: Some(AwsCredentials {
                access_key_id: "test-key".to_string(),
                secret_access_key: "test-secret".to_string(),
            }),
        };

        let result = create_kinesis_client(config.clone()).await;
        assert!(result.is_ok());

        // The URL is validated when making requests, not during client creation
        config.endpoint_url = Some("invalid-url".to_string());
        let result = create_kinesis_client(config).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_client_creation_with_empty_region() {
        let config = KinesisClientConfig {
            region: "".to_string(),
            endpoint_url: None,
            auth: None,
        };

        let result = create_kinesis_client(config).await;
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let credentials = AwsCredentials {
            access_key_id: "AKIATESTKEY".to_string(),
            secret_access_key: "super-secret".to_string(),
        };
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("AKIATESTKEY"));
        assert!(!rendered.contains("super-secret"));
    }
}
