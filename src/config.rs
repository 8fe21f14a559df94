use std::path::{Path, PathBuf};
use std::sync::Arc;

use aws_config::provider_config::ProviderConfig as AwsProviderConfig;
use aws_config::web_identity_token::{StaticConfiguration, WebIdentityTokenCredentialsProvider};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use serde::Deserialize;

use crate::error::TfSyncError;
use crate::sources::tfe::{DEFAULT_TFE_ADDRESS, TfeClient};
use crate::stores::s3::S3Store;
use crate::sync::Synchronizer;

const DEFAULT_SESSION_NAME: &str = "tfsync";

/// Provider-wide settings, established once and read-only afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub assume_role_with_web_identity: Option<WebIdentityConfig>,
    #[serde(default)]
    pub soft_delete: bool,
    #[serde(default)]
    pub tfe: TfeConfig,
}

/// STS AssumeRoleWithWebIdentity settings for the S3 client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebIdentityConfig {
    pub role_arn: String,
    pub web_identity_token_file: PathBuf,
    #[serde(default)]
    pub session_name: Option<String>,
}

#[derive(Clone, Deserialize)]
pub struct TfeConfig {
    #[serde(default = "default_tfe_address")]
    pub address: String,
    #[serde(default)]
    pub token: Option<String>,
}

fn default_tfe_address() -> String {
    DEFAULT_TFE_ADDRESS.to_string()
}

impl Default for TfeConfig {
    fn default() -> Self {
        Self {
            address: default_tfe_address(),
            token: None,
        }
    }
}

impl std::fmt::Debug for TfeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfeConfig")
            .field("address", &self.address)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ProviderConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TfSyncError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn validate(&self) -> Result<(), TfSyncError> {
        if let Some(web) = &self.assume_role_with_web_identity {
            if web.role_arn.is_empty() {
                return Err(TfSyncError::Config(
                    "assume_role_with_web_identity.role_arn must not be empty".to_string(),
                ));
            }
            if web.web_identity_token_file.as_os_str().is_empty() {
                return Err(TfSyncError::Config(
                    "assume_role_with_web_identity.web_identity_token_file must not be empty"
                        .to_string(),
                ));
            }
        }

        if self.tfe.address.is_empty() {
            return Err(TfSyncError::Config("tfe address must not be empty".to_string()));
        }

        Ok(())
    }

    /// Builds the TFE client.
    pub fn tfe_client(&self) -> Result<TfeClient, TfSyncError> {
        let token = self
            .tfe
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                TfSyncError::Config(
                    "No TFE API token provided. Set TFE_TOKEN or use --tfe-token flag".to_string(),
                )
            })?;

        TfeClient::with_address(token, self.tfe.address.clone())
            .map_err(|e| TfSyncError::Config(format!("failed to create tfe client: {}", e)))
    }

    /// Loads the AWS configuration from the default chain, honouring `region` and the optional
    /// web identity block.
    pub async fn load_aws_config(&self) -> SdkConfig {
        let region = self
            .region
            .clone()
            .filter(|r| !r.is_empty())
            .map(Region::new);

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region.clone() {
            loader = loader.region(region);
        }

        if let Some(web) = &self.assume_role_with_web_identity {
            tracing::info!(role_arn = %web.role_arn, "using assume-role-with-web-identity");

            let provider_config = AwsProviderConfig::default().with_region(region);
            let provider = WebIdentityTokenCredentialsProvider::builder()
                .configure(&provider_config)
                .static_configuration(StaticConfiguration {
                    web_identity_token_file: web.web_identity_token_file.clone(),
                    role_arn: web.role_arn.clone(),
                    session_name: web
                        .session_name
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SESSION_NAME.to_string()),
                })
                .build();
            loader = loader.credentials_provider(provider);
        }

        loader.load().await
    }

    /// Wires both adapters into a [`Synchronizer`].
    pub async fn configure(&self) -> Result<Synchronizer, TfSyncError> {
        tracing::info!("Configuring tfsync provider");

        self.validate()?;
        let tfe = self.tfe_client()?;

        let sdk_config = self.load_aws_config().await;
        let store = S3Store::from_sdk_config(&sdk_config);

        tracing::info!(
            aws_region = store.region().as_deref().unwrap_or("unset"),
            tfe_address = %self.tfe.address,
            soft_delete = self.soft_delete,
            "Configured tfsync client"
        );

        Ok(Synchronizer::new(Arc::new(tfe), Arc::new(store)).with_soft_delete(self.soft_delete))
    }
}
