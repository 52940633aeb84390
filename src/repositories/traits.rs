use crate::client::ServiceQuery;
use crate::domain::{Identity, ImageFile, ServiceId};
use crate::error::BackendResult;
use crate::models::{NewServiceRequest, Service, ServiceChanges};
use async_trait::async_trait;

/// Repository for service listings.
///
/// Provides abstraction over listing storage and retrieval, enabling
/// different implementations (backend client, in-memory mock).
/// Ownership rules are enforced by the implementation, not the caller.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Fetch listings matching `query`, newest first.
    async fn find(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<Vec<Service>>;

    /// Insert a listing and return the stored row.
    async fn insert(
        &self,
        identity: &Identity,
        request: &NewServiceRequest,
    ) -> BackendResult<Service>;

    /// Apply a partial update and return the stored row.
    async fn update(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> BackendResult<Service>;

    /// Permanently delete a listing.
    async fn delete(&self, identity: &Identity, id: &ServiceId) -> BackendResult<()>;
}

/// Blob storage for listing images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `file` under `key` and return its public URL.
    async fn upload(&self, identity: &Identity, key: &str, file: &ImageFile)
        -> BackendResult<String>;
}
