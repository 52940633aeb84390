//! Catalog service layer.
//!
//! The single entry point for reading and writing service listings. Reads go
//! through the shared query cache; writes go through the mutation tracker and
//! invalidate every cached read they could have changed.

use crate::cache::{MutationTracker, QueryCache, QueryKey, QueryScope};
use crate::client::{AsyncBackendClient, AsyncBackendClientImpl, BackendClient, ServiceQuery};
use crate::config::Config;
use crate::domain::{Category, Identity, ImageFile, ProviderId, ServiceId, ValidationError};
use crate::error::{PersistAction, ServiceError, ServiceResult};
use crate::metrics::Metrics;
use crate::models::{NewServiceRequest, Service, ServiceChanges, ServiceDraft};
use crate::notifications::{
    Notification, Notifier, MSG_CREATED, MSG_DELETED, MSG_UPDATED,
};
use crate::repositories::{
    BackendImageStore, BackendServiceRepository, ImageStore, ServiceRepository,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Landing feed size when none is configured.
pub const DEFAULT_FEED_LIMIT: usize = 6;

/// Catalog service trait for business operations.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Newest available listings, at most `limit`.
    async fn list_available_services(&self, limit: usize) -> ServiceResult<Vec<Service>>;

    /// The landing feed: newest available listings, configured size.
    async fn featured_services(&self) -> ServiceResult<Vec<Service>>;

    /// Available listings filtered by category and free-text search, with
    /// provider display fields joined in. Blank search text is ignored.
    async fn browse_services(
        &self,
        category: Option<Category>,
        search: Option<&str>,
    ) -> ServiceResult<Vec<Service>>;

    /// Every listing of `provider_id`, any status, newest first.
    async fn list_provider_services(
        &self,
        identity: &Identity,
        provider_id: &ProviderId,
    ) -> ServiceResult<Vec<Service>>;

    /// Create a listing owned by the caller.
    async fn create_service(
        &self,
        identity: &Identity,
        draft: ServiceDraft,
    ) -> ServiceResult<Service>;

    /// Apply a partial update to one listing.
    async fn update_service(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: ServiceChanges,
    ) -> ServiceResult<Service>;

    /// Permanently delete one listing. Its image stays in storage.
    async fn delete_service(&self, identity: &Identity, id: &ServiceId) -> ServiceResult<()>;

    /// Store an image under the caller's prefix and return its public URL.
    async fn upload_image(&self, identity: &Identity, file: &ImageFile) -> ServiceResult<String>;
}

/// Default implementation of CatalogService.
pub struct CatalogServiceImpl {
    services: Arc<dyn ServiceRepository>,
    images: Arc<dyn ImageStore>,
    cache: QueryCache<Vec<Service>>,
    mutations: MutationTracker,
    notifier: Arc<dyn Notifier>,
    feed_limit: usize,
}

impl CatalogServiceImpl {
    /// Create a catalog service over the given repositories.
    ///
    /// Cached reads stay fresh until invalidated.
    pub fn new(
        services: Arc<dyn ServiceRepository>,
        images: Arc<dyn ImageStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            services,
            images,
            cache: QueryCache::new(None),
            mutations: MutationTracker::new(),
            notifier,
            feed_limit: DEFAULT_FEED_LIMIT,
        }
    }

    /// Build the full backend stack from configuration.
    ///
    /// Client, cache and mutation tracker all report into one `Metrics`.
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let metrics = Metrics::new();
        let client = BackendClient::with_metrics(config, metrics.clone());
        let client: Arc<dyn AsyncBackendClient> = Arc::new(AsyncBackendClientImpl::new(client));

        Self {
            services: Arc::new(BackendServiceRepository::new(client.clone())),
            images: Arc::new(BackendImageStore::new(client)),
            cache: QueryCache::with_metrics(config.query_stale_after(), metrics.clone()),
            mutations: MutationTracker::with_metrics(metrics),
            notifier,
            feed_limit: config.feed_limit,
        }
    }

    /// Replace the query cache, e.g. to share one between services.
    pub fn with_cache(mut self, cache: QueryCache<Vec<Service>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_mutation_tracker(mut self, mutations: MutationTracker) -> Self {
        self.mutations = mutations;
        self
    }

    pub fn with_feed_limit(mut self, feed_limit: usize) -> Self {
        self.feed_limit = feed_limit.max(1);
        self
    }

    pub fn cache(&self) -> &QueryCache<Vec<Service>> {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationTracker {
        &self.mutations
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn feed_limit(&self) -> usize {
        self.feed_limit
    }

    // ========================= Cache keys =========================

    pub fn all_services_key(limit: usize) -> QueryKey {
        QueryKey::new(QueryScope::AllServices, [limit.to_string()])
    }

    pub fn browse_services_key(category: Option<Category>, search: Option<&str>) -> QueryKey {
        QueryKey::new(
            QueryScope::BrowseServices,
            [
                category.map(|c| c.as_str()).unwrap_or_default(),
                search.unwrap_or_default(),
            ],
        )
    }

    /// Listings of `provider_id` as seen by `viewer`. The backend decides what
    /// each caller may read, so results are never shared between callers.
    pub fn provider_services_key(provider_id: &ProviderId, viewer: &ProviderId) -> QueryKey {
        QueryKey::new(
            QueryScope::ProviderServices,
            [provider_id.as_str(), viewer.as_str()],
        )
    }

    /// Mark every read a write by `provider_id` could have changed as stale.
    pub fn invalidate_after_write(&self, provider_id: &ProviderId) {
        let own = QueryKey::new(QueryScope::ProviderServices, [provider_id.as_str()]);
        let marked = self.cache.invalidate(&own)
            + self.cache.invalidate(&QueryKey::scope(QueryScope::AllServices))
            + self.cache.invalidate(&QueryKey::scope(QueryScope::BrowseServices));
        tracing::debug!(provider = %provider_id, marked, "Invalidated listing queries");
    }

    /// Tell the user a write failed. Raw errors are logged, never shown.
    pub fn notify_failure(&self, err: &ServiceError) {
        if err.is_validation() {
            tracing::debug!(error = %err, "Rejected invalid input");
        } else {
            tracing::error!(error = %err, "Catalog operation failed");
        }
        let notification = match err {
            ServiceError::Validation(ValidationError::InvalidFileType(_)) => {
                Notification::invalid_file()
            }
            other => Notification::error(other.user_message()),
        };
        self.notifier.notify(notification);
    }

    pub fn notify_success(&self, message: &str) {
        self.notifier.notify(Notification::success(message));
    }

    // ===================== Untracked building blocks =====================
    //
    // Used by the public operations and by the form workflow, which wraps a
    // whole upload-then-persist run in a single tracked mutation.

    pub(crate) async fn store_image(
        &self,
        identity: &Identity,
        file: &ImageFile,
    ) -> ServiceResult<String> {
        file.validate()?;
        let key = file.object_key(&identity.user_id, chrono::Utc::now().timestamp_millis());
        tracing::debug!(key = %key, size = file.bytes.len(), "Uploading image");
        self.images
            .upload(identity, &key, file)
            .await
            .map_err(ServiceError::Upload)
    }

    pub(crate) async fn persist_new(
        &self,
        identity: &Identity,
        draft: ServiceDraft,
    ) -> ServiceResult<Service> {
        draft.validate()?;
        let request = NewServiceRequest::new(identity.user_id.clone(), draft);
        self.services
            .insert(identity, &request)
            .await
            .map_err(|source| ServiceError::Persistence {
                action: PersistAction::Create,
                source,
            })
    }

    pub(crate) async fn persist_changes(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> ServiceResult<Service> {
        changes.validate()?;
        self.services
            .update(identity, id, changes)
            .await
            .map_err(|source| ServiceError::Persistence {
                action: PersistAction::Update,
                source,
            })
    }

    async fn cached_find(
        &self,
        key: QueryKey,
        query: ServiceQuery,
        identity: Option<Identity>,
    ) -> ServiceResult<Vec<Service>> {
        let repo = self.services.clone();
        self.cache
            .query(key, move || async move { repo.find(&query, identity.as_ref()).await })
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "Failed to load services");
                let err = ServiceError::Fetch(err);
                self.notifier.notify(Notification::error(err.user_message()));
                err
            })
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    async fn list_available_services(&self, limit: usize) -> ServiceResult<Vec<Service>> {
        let query = ServiceQuery::new().available().limit(limit);
        self.cached_find(Self::all_services_key(limit), query, None)
            .await
    }

    async fn featured_services(&self) -> ServiceResult<Vec<Service>> {
        self.list_available_services(self.feed_limit).await
    }

    async fn browse_services(
        &self,
        category: Option<Category>,
        search: Option<&str>,
    ) -> ServiceResult<Vec<Service>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());

        let mut query = ServiceQuery::new().available().with_provider();
        if let Some(category) = category {
            query = query.in_category(category);
        }
        if let Some(term) = search {
            query = query.matching(term);
        }

        self.cached_find(Self::browse_services_key(category, search), query, None)
            .await
    }

    async fn list_provider_services(
        &self,
        identity: &Identity,
        provider_id: &ProviderId,
    ) -> ServiceResult<Vec<Service>> {
        let query = ServiceQuery::new().owned_by(provider_id.clone());
        self.cached_find(
            Self::provider_services_key(provider_id, &identity.user_id),
            query,
            Some(identity.clone()),
        )
        .await
    }

    async fn create_service(
        &self,
        identity: &Identity,
        draft: ServiceDraft,
    ) -> ServiceResult<Service> {
        self.mutations
            .mutate(
                self.persist_new(identity, draft),
                |created| {
                    tracing::info!(id = %created.id, provider = %identity.user_id, "Service created");
                    self.invalidate_after_write(&identity.user_id);
                    self.notify_success(MSG_CREATED);
                },
                |err| self.notify_failure(err),
            )
            .await
    }

    async fn update_service(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: ServiceChanges,
    ) -> ServiceResult<Service> {
        self.mutations
            .mutate(
                self.persist_changes(identity, id, &changes),
                |updated| {
                    tracing::info!(id = %updated.id, "Service updated");
                    self.invalidate_after_write(&identity.user_id);
                    self.notify_success(MSG_UPDATED);
                },
                |err| self.notify_failure(err),
            )
            .await
    }

    async fn delete_service(&self, identity: &Identity, id: &ServiceId) -> ServiceResult<()> {
        let operation = async {
            self.services
                .delete(identity, id)
                .await
                .map_err(|source| ServiceError::Persistence {
                    action: PersistAction::Delete,
                    source,
                })
        };

        self.mutations
            .mutate(
                operation,
                |_| {
                    tracing::info!(id = %id, "Service deleted");
                    self.invalidate_after_write(&identity.user_id);
                    self.notify_success(MSG_DELETED);
                },
                |err| self.notify_failure(err),
            )
            .await
    }

    async fn upload_image(&self, identity: &Identity, file: &ImageFile) -> ServiceResult<String> {
        self.mutations
            .mutate(
                self.store_image(identity, file),
                |url| {
                    tracing::info!(url = %url, "Image uploaded");
                    self.invalidate_after_write(&identity.user_id);
                },
                |err| self.notify_failure(err),
            )
            .await
    }
}
