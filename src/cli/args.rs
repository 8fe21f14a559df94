use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tfsync::{ProviderConfig, SyncRecord, TfSyncError, WebIdentityConfig};

/// Runs one tfsync lifecycle operation, standing in for the Terraform host.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub provider: ProviderArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: LifecycleCommand,
}

#[derive(Subcommand, Debug)]
pub enum LifecycleCommand {
    /// Fetch the current state and write it to the bucket
    Create(RecordArgs),
    /// Digest the current state and the stored object
    Read(RecordArgs),
    /// Re-sync a planned record
    Update(RecordArgs),
    /// Delete the stored object (unless soft delete is in effect)
    Delete(RecordArgs),
    /// Turn an identifier into a record without calling any service
    Import(ImportArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(clap::Args, Debug)]
pub struct ProviderArgs {
    /// JSON provider configuration; flags below override it
    #[arg(long, env = "TFSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    #[arg(long, env = "TFSYNC_ROLE_ARN", requires = "web_identity_token_file", global = true)]
    pub role_arn: Option<String>,

    #[arg(long, env = "TFSYNC_WEB_IDENTITY_TOKEN_FILE", requires = "role_arn", global = true)]
    pub web_identity_token_file: Option<PathBuf>,

    #[arg(long, env = "TFSYNC_SOFT_DELETE", global = true)]
    pub soft_delete: bool,

    #[arg(long, env = "TFE_ADDRESS", global = true)]
    pub tfe_address: Option<String>,

    #[arg(long, env = "TFE_TOKEN", hide_env_values = true, global = true)]
    pub tfe_token: Option<String>,
}

impl ProviderArgs {
    pub fn to_config(&self) -> Result<ProviderConfig, TfSyncError> {
        let mut config = match &self.config {
            Some(path) => ProviderConfig::from_json_file(path)?,
            None => ProviderConfig::default(),
        };

        if let Some(region) = &self.region {
            config.region = Some(region.clone());
        }
        if let (Some(role_arn), Some(token_file)) = (&self.role_arn, &self.web_identity_token_file)
        {
            config.assume_role_with_web_identity = Some(WebIdentityConfig {
                role_arn: role_arn.clone(),
                web_identity_token_file: token_file.clone(),
                session_name: None,
            });
        }
        if self.soft_delete {
            config.soft_delete = true;
        }
        if let Some(address) = &self.tfe_address {
            config.tfe.address = address.clone();
        }
        if let Some(token) = &self.tfe_token {
            config.tfe.token = Some(token.clone());
        }

        Ok(config)
    }
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// Record JSON file, `-` for stdin
    #[arg(long, default_value = "-")]
    pub record: PathBuf,
}

impl RecordArgs {
    pub fn load(&self) -> Result<SyncRecord, TfSyncError> {
        let contents = if self.record.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(&self.record)?
        };
        Ok(serde_json::from_str(&contents)?)
    }
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// `workspace_id/bucket/key`
    pub id: String,
}
