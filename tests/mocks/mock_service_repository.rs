use super::CallLog;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use servicehub_client::client::ServiceQuery;
use servicehub_client::error::{BackendError, BackendResult};
use servicehub_client::models::{NewServiceRequest, ProviderProfile, Service, ServiceChanges};
use servicehub_client::repositories::ServiceRepository;
use servicehub_client::{Identity, ServiceId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory service repository for testing.
///
/// Behaves like the backend's row-level policies: only the owner can write a
/// row, and inserts must carry the caller's id. With owner-only reads enabled,
/// reading a provider's listings as anyone else is refused too. Records every call and every
/// write payload for verification.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockServiceRepository {
    rows: Arc<Mutex<Vec<Service>>>,
    next_seq: Arc<Mutex<i64>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
    inserts: Arc<Mutex<Vec<NewServiceRequest>>>,
    updates: Arc<Mutex<Vec<(ServiceId, ServiceChanges)>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    find_delay: Arc<Mutex<Option<Duration>>>,
    owner_only_reads: Arc<Mutex<bool>>,
    call_log: Option<CallLog>,
}

#[allow(dead_code)]
impl MockServiceRepository {
    /// Create a new empty MockServiceRepository.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            next_seq: Arc::new(Mutex::new(1)),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
            inserts: Arc::new(Mutex::new(Vec::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            failing: Arc::new(Mutex::new(HashSet::new())),
            find_delay: Arc::new(Mutex::new(None)),
            owner_only_reads: Arc::new(Mutex::new(false)),
            call_log: None,
        }
    }

    /// Append every call to a log shared with other mocks.
    pub fn with_call_log(mut self, log: CallLog) -> Self {
        self.call_log = Some(log);
        self
    }

    /// Seed a row as-is.
    pub fn add_service(&self, service: Service) {
        self.rows.lock().unwrap().push(service);
    }

    /// Build and seed a row; each seeded row is newer than the last.
    pub fn seed(
        &self,
        id: &str,
        provider: &str,
        title: &str,
        category: &str,
        status: &str,
    ) -> Service {
        let created_at = self.next_timestamp();
        let service: Service = serde_json::from_value(serde_json::json!({
            "id": id,
            "provider_id": provider,
            "title": title,
            "description": format!("{} by {}", title, provider),
            "category": category,
            "availability_status": status,
            "created_at": created_at,
        }))
        .expect("seed row should deserialize");
        self.add_service(service.clone());
        service
    }

    /// Overwrite the stored row that has the same id.
    pub fn replace(&self, service: Service) {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|s| s.id == service.id) {
            *row = service;
        }
    }

    pub fn get(&self, id: &str) -> Option<Service> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id.as_str() == id)
            .cloned()
    }

    pub fn all(&self) -> Vec<Service> {
        self.rows.lock().unwrap().clone()
    }

    /// Make every call to `method` fail until cleared.
    pub fn fail_on(&self, method: &str) {
        self.failing.lock().unwrap().insert(method.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Answer every `find` only after `delay`, with the rows as they were
    /// when the call started.
    pub fn set_find_delay(&self, delay: Duration) {
        *self.find_delay.lock().unwrap() = Some(delay);
    }

    /// Refuse provider-scoped reads unless the caller is that provider.
    pub fn set_owner_only_reads(&self, enabled: bool) {
        *self.owner_only_reads.lock().unwrap() = enabled;
    }

    /// Get the number of times a method was called.
    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    /// Calls that could have written to the table.
    pub fn write_count(&self) -> usize {
        self.get_call_count("insert") + self.get_call_count("update") + self.get_call_count("delete")
    }

    pub fn inserted_payloads(&self) -> Vec<NewServiceRequest> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn update_payloads(&self) -> Vec<(ServiceId, ServiceChanges)> {
        self.updates.lock().unwrap().clone()
    }

    /// Reset all call counts.
    pub fn reset_call_counts(&self) {
        self.call_counts.lock().unwrap().clear();
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
        if let Some(log) = &self.call_log {
            log.lock().unwrap().push(format!("repo.{}", method));
        }
    }

    fn check_failure(&self, method: &str) -> BackendResult<()> {
        if self.failing.lock().unwrap().contains(method) {
            return Err(BackendError::ApiError {
                status: 500,
                message: format!("injected {} failure", method),
            });
        }
        Ok(())
    }

    fn next_timestamp(&self) -> String {
        let mut seq = self.next_seq.lock().unwrap();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ts = base + ChronoDuration::seconds(*seq);
        *seq += 1;
        ts.to_rfc3339()
    }

    fn check_read_policy(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<()> {
        if !*self.owner_only_reads.lock().unwrap() {
            return Ok(());
        }
        match (&query.provider_id, identity) {
            (Some(provider), Some(identity)) if provider == &identity.user_id => Ok(()),
            (Some(_), _) => Err(BackendError::Forbidden(
                "row-level security policy violation".to_string(),
            )),
            (None, _) => Ok(()),
        }
    }

    fn owned_row_index(&self, identity: &Identity, id: &ServiceId) -> BackendResult<usize> {
        let rows = self.rows.lock().unwrap();
        let index = rows
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("Service {} not found", id)))?;
        if rows[index].provider_id != identity.user_id {
            return Err(BackendError::Forbidden(
                "row-level security policy violation".to_string(),
            ));
        }
        Ok(index)
    }
}

/// In-memory rendition of the filters `ServiceQuery` sends to the backend.
fn passes_filters(query: &ServiceQuery, service: &Service) -> bool {
    if let Some(status) = query.availability {
        if service.availability_status != status {
            return false;
        }
    }
    if let Some(provider_id) = &query.provider_id {
        if &service.provider_id != provider_id {
            return false;
        }
    }
    if let Some(category) = query.category {
        if service.category != category {
            return false;
        }
    }
    if let Some(term) = &query.search {
        let term = term.to_lowercase();
        if !service.title.to_lowercase().contains(&term)
            && !service.description.to_lowercase().contains(&term)
        {
            return false;
        }
    }
    true
}

impl Default for MockServiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRepository for MockServiceRepository {
    async fn find(
        &self,
        query: &ServiceQuery,
        identity: Option<&Identity>,
    ) -> BackendResult<Vec<Service>> {
        self.track_call("find");
        self.check_failure("find")?;
        self.check_read_policy(query, identity)?;

        let mut result: Vec<Service> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|s| passes_filters(query, s))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = query.limit {
            result.truncate(limit);
        }
        if query.with_provider {
            for service in &mut result {
                service.provider = Some(ProviderProfile {
                    full_name: Some(format!("Provider {}", service.provider_id)),
                    email: None,
                });
            }
        }

        // Rows are read when the request starts; the answer arrives later
        let delay = *self.find_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(result)
    }

    async fn insert(
        &self,
        identity: &Identity,
        request: &NewServiceRequest,
    ) -> BackendResult<Service> {
        self.track_call("insert");
        let attempt = {
            let mut inserts = self.inserts.lock().unwrap();
            inserts.push(request.clone());
            inserts.len()
        };
        self.check_failure("insert")?;

        if request.provider_id != identity.user_id {
            return Err(BackendError::Forbidden(
                "row-level security policy violation".to_string(),
            ));
        }

        let created_at = self.next_timestamp();
        let mut rows = self.rows.lock().unwrap();
        let service = Service {
            id: ServiceId::new(format!("svc-new-{}", attempt)).unwrap(),
            provider_id: request.provider_id.clone(),
            title: request.title.clone(),
            description: request.description.clone(),
            detailed_description: request.detailed_description.clone(),
            category: request.category,
            hourly_rate: request.hourly_rate,
            location: request.location.clone(),
            availability_status: request.availability_status,
            image_url: request.image_url.clone(),
            created_at,
            provider: None,
        };
        rows.push(service.clone());
        Ok(service)
    }

    async fn update(
        &self,
        identity: &Identity,
        id: &ServiceId,
        changes: &ServiceChanges,
    ) -> BackendResult<Service> {
        self.track_call("update");
        self.updates
            .lock()
            .unwrap()
            .push((id.clone(), changes.clone()));
        self.check_failure("update")?;

        let index = self.owned_row_index(identity, id)?;
        let mut rows = self.rows.lock().unwrap();
        changes.apply_to(&mut rows[index]);
        Ok(rows[index].clone())
    }

    async fn delete(&self, identity: &Identity, id: &ServiceId) -> BackendResult<()> {
        self.track_call("delete");
        self.check_failure("delete")?;

        let index = self.owned_row_index(identity, id)?;
        self.rows.lock().unwrap().remove(index);
        Ok(())
    }
}
