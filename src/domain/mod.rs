//! Domain value objects and types.
//!
//! Identifiers, closed vocabularies, the caller identity and uploaded image
//! files. These validate at construction time so invalid input is rejected
//! before anything is sent to the backend.

pub mod category;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod image;
pub mod rate;

pub use category::{AvailabilityStatus, Category};
pub use errors::ValidationError;
pub use identity::Identity;
pub use ids::{ProviderId, ServiceId};
pub use image::ImageFile;
pub use rate::{parse_hourly_rate, validate_hourly_rate};
