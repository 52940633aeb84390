//! ServiceHub client - the data layer of a service marketplace.
//!
//! Providers list services (plumbing, electrical, HVAC, ...) and everyone can
//! browse the available ones. This crate is everything between the screens
//! and the hosted backend.
//!
//! # Architecture
//!
//! - **domain**: Identifiers, categories, caller identity, image files
//! - **models**: Listing records and their insert/update payloads
//! - **error**: Backend, configuration and service error types
//! - **config**: Configuration management from environment variables
//! - **client**: HTTP client for the backend's table and storage APIs
//! - **repositories**: Storage traits and their backend implementations
//! - **cache**: De-duplicating query cache and mutation tracker
//! - **services**: Catalog facade and the create/edit form workflow
//! - **notifications**: Fixed user-facing outcome messages
//! - **metrics**: Request, cache and mutation counters

pub mod cache;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use cache::{MutationTracker, QueryCache, QueryError, QueryKey, QueryScope, QueryState, QueryStatus};
pub use client::BackendClient;
pub use config::Config;
pub use domain::{AvailabilityStatus, Category, Identity, ImageFile, ProviderId, ServiceId, ValidationError};
pub use error::{BackendError, ConfigError, PersistAction, ServiceError};
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use models::{NewServiceRequest, ProviderProfile, Service, ServiceChanges, ServiceDraft};
pub use notifications::{Notification, NotificationLevel, Notifier};
pub use services::{CatalogService, CatalogServiceImpl, ServiceForm, ServiceFormWorkflow, SubmitOutcome};
