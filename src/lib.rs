//! tfsync - Terraform state to object storage sync
//!
//! A library that mirrors Terraform Cloud/Enterprise workspace state into S3 objects and keeps a
//! SHA-256 digest of both sides so drift can be observed on read.

pub mod config;
pub mod diagnostics;
pub mod digest;
pub mod record;
pub mod sources;
pub mod stores;
pub mod sync;
pub mod tags;

mod error;

pub use config::{ProviderConfig, TfeConfig, WebIdentityConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Outcome, Severity};
pub use digest::sha256_hex;
pub use error::TfSyncError;
pub use record::{SyncRecord, build_id, parse_id};
pub use sources::tfe::{StateVersion, TfeClient, TfeError};
pub use sources::{SourceError, StateSource};
pub use stores::s3::S3Store;
pub use stores::{ObjectStore, PutObjectRequest, StoreError};
pub use sync::Synchronizer;
pub use tags::encode_tags;
