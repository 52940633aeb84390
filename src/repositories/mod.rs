//! Repository layer.
//!
//! Traits the catalog service depends on, plus the implementations that
//! delegate to the backend client.

mod backend_image_store;
mod backend_service_repository;
mod traits;

pub use backend_image_store::BackendImageStore;
pub use backend_service_repository::BackendServiceRepository;
pub use traits::{ImageStore, ServiceRepository};
