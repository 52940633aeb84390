//! HTTP client for the hosted backend.
//!
//! Table reads and writes go through the PostgREST endpoint under
//! `/rest/v1`, image bytes through the storage endpoint under `/storage/v1`.
//! The client is synchronous (`ureq`); async callers use [`AsyncBackendClientImpl`],
//! which moves each call onto `tokio::task::spawn_blocking`.

mod async_wrapper;
mod query;

pub use async_wrapper::{AsyncBackendClient, AsyncBackendClientImpl};
pub use query::ServiceQuery;

use crate::config::Config;
use crate::domain::{Identity, ImageFile, ServiceId};
use crate::error::{BackendError, BackendResult};
use crate::metrics::{HttpTimer, Metrics};
use crate::models::{NewServiceRequest, Service, ServiceChanges};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const SERVICES_PATH: &str = "/rest/v1/services";

/// Request body variants the client sends.
enum Body<'a> {
    Empty,
    Json(serde_json::Value),
    Bytes { content_type: &'a str, bytes: &'a [u8] },
}

/// HTTP client for the backend's table and storage APIs.
#[derive(Clone)]
pub struct BackendClient {
    /// Project base URL
    base_url: String,

    /// Anonymous (publishable) API key
    anon_key: String,

    /// Storage bucket for listing images
    bucket: String,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl BackendClient {
    /// Create a new BackendClient from configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_metrics(config, Metrics::new())
    }

    pub fn with_metrics(config: &Config, metrics: Metrics) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.backend_url.clone(),
            anon_key: config.anon_key.clone(),
            bucket: config.image_bucket.clone(),
            agent: Arc::new(agent),
            metrics,
        }
    }

    /// Create a BackendClient with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, anon_key: String) -> Self {
        let config = Config {
            backend_url: base_url,
            anon_key,
            ..Config::default()
        };
        Self::new(&config)
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Publicly resolvable URL of an object in the image bucket.
    pub fn public_url(&self, key: &str) -> String {
        self.build_url(&format!(
            "/storage/v1/object/public/{}/{}",
            self.bucket,
            encode_key(key)
        ))
    }

    /// Send one authenticated request.
    ///
    /// Signed-in calls carry the session token; anonymous ones reuse the anon
    /// key as bearer, which is what the backend expects for public reads.
    fn send(
        &self,
        method: &str,
        path: &str,
        identity: Option<&Identity>,
        prefer: Option<&str>,
        body: Body<'_>,
    ) -> BackendResult<ureq::Response> {
        let timer = HttpTimer::new(self.metrics.clone());
        let url = self.build_url(path);
        let bearer = identity
            .and_then(|identity| identity.access_token.as_deref())
            .unwrap_or(&self.anon_key);

        tracing::debug!("{} {}", method, url);

        let mut request = self
            .agent
            .request(method, &url)
            .set("apikey", &self.anon_key)
            .set("Authorization", &format!("Bearer {}", bearer));
        if let Some(prefer) = prefer {
            request = request.set("Prefer", prefer);
        }

        let result = match body {
            Body::Empty => request.call(),
            Body::Json(value) => request
                .set("Content-Type", "application/json")
                .send_json(value),
            Body::Bytes {
                content_type,
                bytes,
            } => request.set("Content-Type", content_type).send_bytes(bytes),
        }
        .map_err(|e| self.map_error(e));

        match &result {
            Ok(response) => {
                tracing::debug!("{} {} - Success (status: {})", method, url, response.status());
                timer.complete();
            }
            Err(e) => {
                tracing::error!("{} {} - Error: {:?}", method, url, e);
                timer.complete_with_error();
            }
        }

        result
    }

    /// Map a ureq error to a BackendError.
    fn map_error(&self, error: ureq::Error) -> BackendError {
        match error {
            ureq::Error::Status(code, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());

                match code {
                    401 => BackendError::Unauthorized,
                    403 => BackendError::Forbidden(message),
                    404 => BackendError::NotFound(message),
                    429 => BackendError::RateLimitExceeded,
                    _ => BackendError::ApiError {
                        status: code,
                        message,
                    },
                }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    BackendError::HttpError("Connection failed".to_string())
                } else if transport.kind() == ureq::ErrorKind::Io {
                    BackendError::Timeout
                } else {
                    BackendError::HttpError(transport.to_string())
                }
            }
        }
    }

    fn read_rows(response: ureq::Response) -> BackendResult<Vec<Service>> {
        let body = response
            .into_string()
            .map_err(|e| BackendError::HttpError(e.to_string()))?;
        serde_json::from_str(&body).map_err(BackendError::JsonError)
    }

    /// Like `read_rows`, but a row that does not parse (e.g. a category this
    /// client does not know) is logged and skipped instead of failing the read.
    fn read_listing_rows(response: ureq::Response) -> BackendResult<Vec<Service>> {
        let body = response
            .into_string()
            .map_err(|e| BackendError::HttpError(e.to_string()))?;
        let rows: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(BackendError::JsonError)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<Service>(row) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable service row");
                    None
                }
            })
            .collect())
    }

    fn to_json<T: Serialize>(value: &T) -> BackendResult<serde_json::Value> {
        serde_json::to_value(value).map_err(BackendError::JsonError)
    }

    // ========================= Table Operations =========================

    /// Read services matching `query`, newest first.
    pub fn select_services(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<Vec<Service>> {
        let path = format!("{}?{}", SERVICES_PATH, query.to_query_string());
        let response = self.send("GET", &path, identity, None, Body::Empty)?;
        let services = Self::read_listing_rows(response)?;

        self.metrics.record_services_fetched(services.len());
        Ok(services)
    }

    /// Insert one listing and return the stored row.
    pub fn insert_service(
        &self,
        identity: &Identity,
        request: &NewServiceRequest,
    ) -> BackendResult<Service> {
        tracing::info!("Creating service for provider: {}", request.provider_id);

        let body = Self::to_json(&[request])?;
        let response = self.send(
            "POST",
            SERVICES_PATH,
            Some(identity),
            Some("return=representation"),
            Body::Json(body),
        )?;

        let service = Self::read_rows(response)?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Other("Insert returned no rows".to_string()))?;

        tracing::info!("Service created successfully with id: {}", service.id);
        Ok(service)
    }

    /// Apply `changes` to one listing and return the updated row.
    ///
    /// An empty result means the row doesn't exist or the access policy hid it.
    pub fn update_service(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> BackendResult<Service> {
        let body = Self::to_json(changes)?;
        let path = format!(
            "{}?id=eq.{}",
            SERVICES_PATH,
            urlencoding::encode(id.as_str())
        );
        let response = self.send(
            "PATCH",
            &path,
            Some(identity),
            Some("return=representation"),
            Body::Json(body),
        )?;

        Self::read_rows(response)?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("Service {} not found", id)))
    }

    /// Permanently delete one listing. Its image stays in storage.
    pub fn delete_service(&self, identity: &Identity, id: &ServiceId) -> BackendResult<()> {
        let path = format!(
            "{}?id=eq.{}",
            SERVICES_PATH,
            urlencoding::encode(id.as_str())
        );
        self.send("DELETE", &path, Some(identity), None, Body::Empty)?;
        Ok(())
    }

    // ========================= Storage Operations =========================

    /// Store `file` under `key` in the image bucket and return its public URL.
    pub fn upload_object(
        &self,
        identity: &Identity,
        key: &str,
        file: &ImageFile,
    ) -> BackendResult<String> {
        let path = format!("/storage/v1/object/{}/{}", self.bucket, encode_key(key));
        self.send(
            "POST",
            &path,
            Some(identity),
            None,
            Body::Bytes {
                content_type: &file.content_type,
                bytes: &file.bytes,
            },
        )?;

        self.metrics.record_image_uploaded();
        Ok(self.public_url(key))
    }
}

/// Percent-encode each path segment of an object key, keeping the slashes.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
