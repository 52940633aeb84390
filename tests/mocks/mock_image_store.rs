use super::CallLog;
use async_trait::async_trait;
use servicehub_client::error::{BackendError, BackendResult};
use servicehub_client::repositories::ImageStore;
use servicehub_client::{Identity, ImageFile};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const PUBLIC_BASE: &str = "https://storage.test/object/public/service-images";

/// In-memory image bucket for testing.
///
/// Objects are never removed, matching the backend where deleting a listing
/// leaves its image in place.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockImageStore {
    objects: Arc<Mutex<HashMap<String, ImageFile>>>,
    uploads: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<bool>>,
    call_log: Option<CallLog>,
}

#[allow(dead_code)]
impl MockImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    /// Keys of every upload attempt, in order.
    pub fn upload_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    /// The stored object behind a public URL, if any.
    pub fn resolve(&self, url: &str) -> Option<ImageFile> {
        let key = url.strip_prefix(PUBLIC_BASE)?.trim_start_matches('/');
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl ImageStore for MockImageStore {
    async fn upload(
        &self,
        _identity: &Identity,
        key: &str,
        file: &ImageFile,
    ) -> BackendResult<String> {
        self.uploads.lock().unwrap().push(key.to_string());
        if let Some(log) = &self.call_log {
            log.lock().unwrap().push("images.upload".to_string());
        }

        if *self.failing.lock().unwrap() {
            return Err(BackendError::ApiError {
                status: 413,
                message: "Payload too large".to_string(),
            });
        }

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), file.clone());
        Ok(format!("{}/{}", PUBLIC_BASE, key))
    }
}
