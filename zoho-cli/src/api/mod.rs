//! Zoho CRM REST API module
//!
//! Token exchange, custom view listing, field metadata and chunked bulk
//! updates, all running through one retry policy.

pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod metadata;
pub mod models;
pub mod operations;
pub mod query;
pub mod resilience;

pub use client::ZohoClient;
pub use error::ApiError;
pub use metadata::{FieldMetadata, FieldType, find_field};
pub use models::{AuthSession, CredentialSet, PartialCredentials};
pub use operations::{
    BulkUpdater, ChunkObserver, ChunkProgress, UpdateResult, UpdateRow, UpdateTarget,
};
pub use query::{ViewFetchOptions, record_ids};
pub use resilience::ResilienceConfig;
