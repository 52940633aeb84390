//! Domain validation errors.

use std::fmt;

/// Errors that can occur while validating user input.
///
/// All of these are detected locally, before any request reaches the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided ID is empty.
    EmptyId,

    /// A required form field is empty.
    MissingField(&'static str),

    /// The category is not one of the known categories.
    UnknownCategory(String),

    /// The availability status is not one of the known states.
    UnknownAvailability(String),

    /// The hourly rate could not be parsed as a number.
    InvalidHourlyRate(String),

    /// The hourly rate is below zero.
    NegativeHourlyRate(f64),

    /// The selected file is not an image.
    InvalidFileType(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "ID cannot be empty"),
            Self::MissingField(field) => {
                let mut chars = field.chars();
                match chars.next() {
                    Some(first) => write!(
                        f,
                        "{}{} is required",
                        first.to_uppercase(),
                        chars.as_str().replace('_', " ")
                    ),
                    None => write!(f, "A required field is missing"),
                }
            }
            Self::UnknownCategory(category) => write!(f, "Unknown category: {}", category),
            Self::UnknownAvailability(status) => {
                write!(f, "Unknown availability status: {}", status)
            }
            Self::InvalidHourlyRate(rate) => write!(f, "Invalid hourly rate: {}", rate),
            Self::NegativeHourlyRate(rate) => {
                write!(f, "Hourly rate cannot be negative: {}", rate)
            }
            Self::InvalidFileType(_) => write!(f, "Please select an image file"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        assert_eq!(
            ValidationError::MissingField("description").to_string(),
            "Description is required"
        );
    }

    #[test]
    fn test_file_type_message_is_user_facing() {
        let err = ValidationError::InvalidFileType("application/pdf".to_string());
        assert_eq!(err.to_string(), "Please select an image file");
    }
}
