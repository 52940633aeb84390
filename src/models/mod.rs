//! Data models for ServiceHub entities.
//!
//! Records as the backend returns them, plus the payloads sent on insert and
//! update.

pub mod service;

pub use service::{NewServiceRequest, ProviderProfile, Service, ServiceChanges, ServiceDraft};
