//! Application service layer.
//!
//! Services contain the business logic: they validate input, go through the
//! query cache for reads and the mutation tracker for writes, and talk to the
//! backend only through the repository traits.

mod catalog_service;
mod form_workflow;

pub use catalog_service::{CatalogService, CatalogServiceImpl, DEFAULT_FEED_LIMIT};
pub use form_workflow::{ServiceForm, ServiceFormWorkflow, SubmitOutcome};
