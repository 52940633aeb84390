use crate::client::AsyncBackendClient;
use crate::domain::{Identity, ImageFile};
use crate::error::BackendResult;
use crate::repositories::traits::ImageStore;
use async_trait::async_trait;
use std::sync::Arc;

/// Image store backed by the hosted object storage bucket.
pub struct BackendImageStore {
    client: Arc<dyn AsyncBackendClient>,
}

impl BackendImageStore {
    pub fn new(client: Arc<dyn AsyncBackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageStore for BackendImageStore {
    async fn upload(
        &self,
        identity: &Identity,
        key: &str,
        file: &ImageFile,
    ) -> BackendResult<String> {
        self.client.upload_object(identity, key, file).await
    }
}
