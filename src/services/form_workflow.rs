//! Create/edit form submission.
//!
//! A submission validates the raw form, optionally uploads a new image, then
//! inserts or updates exactly one listing. The whole run is one tracked
//! mutation, and the image URL that gets persisted is always the one the
//! upload in the same run returned.

use crate::domain::{
    parse_hourly_rate, AvailabilityStatus, Category, Identity, ImageFile, ValidationError,
};
use crate::error::ServiceResult;
use crate::models::{Service, ServiceChanges, ServiceDraft};
use crate::notifications::{MSG_CREATED, MSG_UPDATED};
use crate::services::catalog_service::CatalogServiceImpl;
use std::sync::Arc;

/// Raw text fields of the create/edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceForm {
    pub title: String,
    pub description: String,
    pub detailed_description: String,
    pub category: String,
    pub hourly_rate: String,
    pub location: String,
    pub availability_status: String,
}

impl Default for ServiceForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            detailed_description: String::new(),
            category: String::new(),
            hourly_rate: String::new(),
            location: String::new(),
            availability_status: "available".to_string(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ServiceForm {
    /// Pre-fill the form for editing an existing listing.
    pub fn from_service(service: &Service) -> Self {
        Self {
            title: service.title.clone(),
            description: service.description.clone(),
            detailed_description: service.detailed_description.clone().unwrap_or_default(),
            category: service.category.as_str().to_string(),
            hourly_rate: service
                .hourly_rate
                .map(|rate| rate.to_string())
                .unwrap_or_default(),
            location: service.location.clone().unwrap_or_default(),
            availability_status: service.availability_status.as_str().to_string(),
        }
    }

    /// Parse and validate every field. The image URL is left empty.
    pub fn to_draft(&self) -> Result<ServiceDraft, ValidationError> {
        let title = non_blank(&self.title).ok_or(ValidationError::MissingField("title"))?;
        let description =
            non_blank(&self.description).ok_or(ValidationError::MissingField("description"))?;

        let category = match self.category.trim() {
            "" => return Err(ValidationError::MissingField("category")),
            raw => raw.parse::<Category>()?,
        };
        let availability_status = match self.availability_status.trim() {
            "" => AvailabilityStatus::default(),
            raw => raw.parse::<AvailabilityStatus>()?,
        };

        let draft = ServiceDraft {
            title,
            description,
            detailed_description: non_blank(&self.detailed_description),
            category,
            hourly_rate: parse_hourly_rate(&self.hourly_rate)?,
            location: non_blank(&self.location),
            availability_status,
            image_url: None,
        };
        draft.validate()?;
        Ok(draft)
    }
}

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Service),
    Updated(Service),
}

impl SubmitOutcome {
    pub fn service(&self) -> &Service {
        match self {
            Self::Created(service) | Self::Updated(service) => service,
        }
    }

    pub fn into_service(self) -> Service {
        match self {
            Self::Created(service) | Self::Updated(service) => service,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Runs form submissions against a catalog service.
#[derive(Clone)]
pub struct ServiceFormWorkflow {
    catalog: Arc<CatalogServiceImpl>,
}

impl ServiceFormWorkflow {
    pub fn new(catalog: Arc<CatalogServiceImpl>) -> Self {
        Self { catalog }
    }

    /// True while any catalog write, including a submission, is running.
    pub fn is_submitting(&self) -> bool {
        self.catalog.mutations().is_pending()
    }

    /// Submit the form.
    ///
    /// With `existing` the listing is updated, otherwise a new one is created.
    /// Nothing is sent when validation fails, and nothing is persisted when
    /// the image upload fails. A failed persist leaves an uploaded image in
    /// storage.
    pub async fn submit(
        &self,
        identity: &Identity,
        form: &ServiceForm,
        image: Option<&ImageFile>,
        existing: Option<&Service>,
    ) -> ServiceResult<SubmitOutcome> {
        let catalog = &self.catalog;
        catalog
            .mutations()
            .mutate(
                self.run(identity, form, image, existing),
                |outcome| {
                    tracing::info!(
                        id = %outcome.service().id,
                        created = outcome.is_created(),
                        "Service form submitted"
                    );
                    catalog.invalidate_after_write(&identity.user_id);
                    catalog.notify_success(if outcome.is_created() {
                        MSG_CREATED
                    } else {
                        MSG_UPDATED
                    });
                },
                |err| catalog.notify_failure(err),
            )
            .await
    }

    async fn run(
        &self,
        identity: &Identity,
        form: &ServiceForm,
        image: Option<&ImageFile>,
        existing: Option<&Service>,
    ) -> ServiceResult<SubmitOutcome> {
        let mut draft = form.to_draft()?;
        if let Some(file) = image {
            file.validate()?;
        }

        let uploaded = match image {
            Some(file) => Some(self.catalog.store_image(identity, file).await?),
            None => None,
        };

        match existing {
            Some(service) => {
                draft.image_url = uploaded.or_else(|| service.image_url.clone());
                let changes = ServiceChanges::from_draft(draft);
                self.catalog
                    .persist_changes(identity, &service.id, &changes)
                    .await
                    .map(SubmitOutcome::Updated)
            }
            None => {
                draft.image_url = uploaded;
                self.catalog
                    .persist_new(identity, draft)
                    .await
                    .map(SubmitOutcome::Created)
            }
        }
    }
}
