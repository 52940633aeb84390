//! Hourly rate parsing.

use super::errors::ValidationError;

/// Parse the hourly rate text field.
///
/// Blank input means "no rate" rather than zero.
pub fn parse_hourly_rate(input: &str) -> Result<Option<f64>, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let rate: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidHourlyRate(input.to_string()))?;
    validate_hourly_rate(rate).map(Some)
}

/// Rates must be finite and non-negative.
pub fn validate_hourly_rate(rate: f64) -> Result<f64, ValidationError> {
    if !rate.is_finite() {
        return Err(ValidationError::InvalidHourlyRate(rate.to_string()));
    }
    if rate < 0.0 {
        return Err(ValidationError::NegativeHourlyRate(rate));
    }
    Ok(rate)
}
