//! Image files selected for upload.

use super::errors::ValidationError;
use super::ids::ProviderId;

/// An image file picked by the user, held in memory until upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Reject anything whose media type is not `image/*`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content_type.to_ascii_lowercase().starts_with("image/") {
            Ok(())
        } else {
            Err(ValidationError::InvalidFileType(self.content_type.clone()))
        }
    }

    /// Text after the last `.`, or the whole name when there is none.
    pub fn extension(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .unwrap_or(&self.file_name)
    }

    /// Storage key `{provider}/{timestamp_millis}.{extension}`.
    pub fn object_key(&self, provider: &ProviderId, timestamp_millis: i64) -> String {
        format!("{}/{}.{}", provider, timestamp_millis, self.extension())
    }
}
