//! Async wrapper around the synchronous BackendClient.
//!
//! Each call runs on tokio's blocking pool so slow backend responses never
//! stall the async runtime.

use crate::client::{BackendClient, ServiceQuery};
use crate::domain::{Identity, ImageFile, ServiceId};
use crate::error::{BackendError, BackendResult};
use crate::models::{NewServiceRequest, Service, ServiceChanges};
use async_trait::async_trait;
use std::sync::Arc;

/// Async interface to the backend.
#[async_trait]
pub trait AsyncBackendClient: Send + Sync {
    async fn select_services(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<Vec<Service>>;

    async fn insert_service(
        &self,
        identity: &Identity,
        request: &NewServiceRequest,
    ) -> BackendResult<Service>;
    async fn update_service(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> BackendResult<Service>;
    async fn delete_service(&self, identity: &Identity, id: &ServiceId) -> BackendResult<()>;

    async fn upload_object(
        &self,
        identity: &Identity,
        key: &str,
        file: &ImageFile,
    ) -> BackendResult<String>;
}

/// Async wrapper around synchronous BackendClient.
#[derive(Clone)]
pub struct AsyncBackendClientImpl {
    client: Arc<BackendClient>,
}

impl AsyncBackendClientImpl {
    pub fn new(client: BackendClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn inner(&self) -> &BackendClient {
        &self.client
    }
}

fn join_error(e: tokio::task::JoinError) -> BackendError {
    BackendError::HttpError(format!("Task join error: {}", e))
}

#[async_trait]
impl AsyncBackendClient for AsyncBackendClientImpl {
    async fn select_services(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<Vec<Service>> {
        let client = self.client.clone();
        let query = query.clone();
        let identity = identity.cloned();

        tokio::task::spawn_blocking(move || client.select_services(&query, identity.as_ref()))
            .await
            .map_err(join_error)?
    }

    async fn insert_service(
        &self,
        identity: &Identity,
        request: &NewServiceRequest,
    ) -> BackendResult<Service> {
        let client = self.client.clone();
        let identity = identity.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || client.insert_service(&identity, &request))
            .await
            .map_err(join_error)?
    }

    async fn update_service(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> BackendResult<Service> {
        let client = self.client.clone();
        let identity = identity.clone();
        let id = id.clone();
        let changes = changes.clone();

        tokio::task::spawn_blocking(move || client.update_service(&identity, &id, &changes))
            .await
            .map_err(join_error)?
    }

    async fn delete_service(&self, identity: &Identity, id: &ServiceId) -> BackendResult<()> {
        let client = self.client.clone();
        let identity = identity.clone();
        let id = id.clone();

        tokio::task::spawn_blocking(move || client.delete_service(&identity, &id))
            .await
            .map_err(join_error)?
    }

    async fn upload_object(
        &self,
        identity: &Identity,
        key: &str,
        file: &ImageFile,
    ) -> BackendResult<String> {
        let client = self.client.clone();
        let identity = identity.clone();
        let key = key.to_string();
        let file = file.clone();

        tokio::task::spawn_blocking(move || client.upload_object(&identity, &key, &file))
            .await
            .map_err(join_error)?
    }
}
