use crate::client::{AsyncBackendClient, ServiceQuery};
use crate::domain::{Identity, ServiceId};
use crate::error::BackendResult;
use crate::models::{NewServiceRequest, Service, ServiceChanges};
use crate::repositories::traits::ServiceRepository;
use async_trait::async_trait;
use std::sync::Arc;

/// Listing repository backed by the hosted table API.
///
/// Delegates every operation to the AsyncBackendClient; row-level policies on
/// the backend decide whether the identity may write a given row.
pub struct BackendServiceRepository {
    client: Arc<dyn AsyncBackendClient>,
}

impl BackendServiceRepository {
    pub fn new(client: Arc<dyn AsyncBackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceRepository for BackendServiceRepository {
    async fn find(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<Vec<Service>> {
        self.client.select_services(query, identity).await
    }

    async fn insert(
        &self,
        identity: &Identity,
        request: &NewServiceRequest,
    ) -> BackendResult<Service> {
        self.client.insert_service(identity, request).await
    }

    async fn update(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> BackendResult<Service> {
        self.client.update_service(identity, id, changes).await
    }

    async fn delete(&self, identity: &Identity, id: &ServiceId) -> BackendResult<()> {
        self.client.delete_service(identity, id).await
    }
}
