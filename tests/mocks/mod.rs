#![allow(dead_code)]

pub mod mock_image_store;
pub mod mock_service_repository;

pub use mock_image_store::MockImageStore;
pub use mock_service_repository::MockServiceRepository;

use std::sync::{Arc, Mutex};

/// Ordered record of calls, shared between mocks to check sequencing.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}
