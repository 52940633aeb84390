//! Service listing model and its write payloads.

use crate::domain::{
    validate_hourly_rate, AvailabilityStatus, Category, ProviderId, ServiceId, ValidationError,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Treat blank strings from the backend the same as null.
///
/// Older rows store `""` for "no image" and "no location".
fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Display fields of the provider joined onto browse results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ProviderProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
}

/// A service listing owned by exactly one provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    /// Assigned by the backend at creation
    pub id: ServiceId,

    /// Owner; set once at creation from the caller identity
    pub provider_id: ProviderId,

    pub title: String,

    /// Short description shown on cards
    pub description: String,

    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub detailed_description: Option<String>,

    pub category: Category,

    #[serde(default)]
    pub hourly_rate: Option<f64>,

    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub availability_status: AvailabilityStatus,

    /// Public URL of the listing image
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub image_url: Option<String>,

    /// ISO 8601 timestamp assigned by the backend
    #[serde(default)]
    pub created_at: String,

    /// Provider display fields (API field: profiles), only present on browse results
    #[serde(
        default,
        alias = "profiles",
        skip_serializing_if = "Option::is_none"
    )]
    pub provider: Option<ProviderProfile>,
}

impl Service {
    pub fn is_available(&self) -> bool {
        self.availability_status == AvailabilityStatus::Available
    }
}

/// Field values for a new listing, before the owner is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub title: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub category: Category,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    pub availability_status: AvailabilityStatus,
    pub image_url: Option<String>,
}

impl ServiceDraft {
    /// Create a draft with the required fields; everything else is empty.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Category,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            detailed_description: None,
            category,
            hourly_rate: None,
            location: None,
            availability_status: AvailabilityStatus::default(),
            image_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if let Some(rate) = self.hourly_rate {
            validate_hourly_rate(rate)?;
        }
        Ok(())
    }
}

/// Insert payload: a draft plus its owner.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewServiceRequest {
    pub provider_id: ProviderId,
    pub title: String,
    pub description: String,
    pub detailed_description: Option<String>,
    pub category: Category,
    pub hourly_rate: Option<f64>,
    pub location: Option<String>,
    pub availability_status: AvailabilityStatus,
    pub image_url: Option<String>,
}

impl NewServiceRequest {
    pub fn new(provider_id: ProviderId, draft: ServiceDraft) -> Self {
        Self {
            provider_id,
            title: draft.title,
            description: draft.description,
            detailed_description: draft.detailed_description,
            category: draft.category,
            hourly_rate: draft.hourly_rate,
            location: draft.location,
            availability_status: draft.availability_status,
            image_url: draft.image_url,
        }
    }
}

/// Partial update payload.
///
/// `id` and `provider_id` are deliberately not representable. For nullable
/// columns the outer `Option` means "leave unchanged" and `Some(None)` clears
/// the column.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ServiceChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_status: Option<AvailabilityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
}

impl ServiceChanges {
    /// Overwrite every editable field with the draft's values.
    ///
    /// Empty optional fields in the draft clear the stored column.
    pub fn from_draft(draft: ServiceDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            detailed_description: Some(draft.detailed_description),
            category: Some(draft.category),
            hourly_rate: Some(draft.hourly_rate),
            location: Some(draft.location),
            availability_status: Some(draft.availability_status),
            image_url: Some(draft.image_url),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if matches!(&self.title, Some(title) if title.trim().is_empty()) {
            return Err(ValidationError::MissingField("title"));
        }
        if matches!(&self.description, Some(desc) if desc.trim().is_empty()) {
            return Err(ValidationError::MissingField("description"));
        }
        if let Some(Some(rate)) = self.hourly_rate {
            validate_hourly_rate(rate)?;
        }
        Ok(())
    }

    /// Apply the changes to a local copy of a listing.
    pub fn apply_to(&self, service: &mut Service) {
        if let Some(title) = &self.title {
            service.title = title.clone();
        }
        if let Some(description) = &self.description {
            service.description = description.clone();
        }
        if let Some(detailed) = &self.detailed_description {
            service.detailed_description = detailed.clone();
        }
        if let Some(category) = self.category {
            service.category = category;
        }
        if let Some(rate) = self.hourly_rate {
            service.hourly_rate = rate;
        }
        if let Some(location) = &self.location {
            service.location = location.clone();
        }
        if let Some(status) = self.availability_status {
            service.availability_status = status;
        }
        if let Some(image_url) = &self.image_url {
            service.image_url = image_url.clone();
        }
    }
}
