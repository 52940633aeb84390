//! Closed vocabularies: listing category and availability status.

use super::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a service listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Plumbing,
    Electrical,
    Appliances,
    #[serde(rename = "HVAC")]
    Hvac,
    Carpentry,
    Painting,
    Cleaning,
    Gardening,
    #[serde(rename = "Computer Repair")]
    ComputerRepair,
    Other,
}

impl Category {
    /// All categories, in the order a category picker lists them.
    pub const ALL: [Category; 10] = [
        Category::Plumbing,
        Category::Electrical,
        Category::Appliances,
        Category::Hvac,
        Category::Carpentry,
        Category::Painting,
        Category::Cleaning,
        Category::Gardening,
        Category::ComputerRepair,
        Category::Other,
    ];

    /// The value stored in the backend's `category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plumbing => "Plumbing",
            Self::Electrical => "Electrical",
            Self::Appliances => "Appliances",
            Self::Hvac => "HVAC",
            Self::Carpentry => "Carpentry",
            Self::Painting => "Painting",
            Self::Cleaning => "Cleaning",
            Self::Gardening => "Gardening",
            Self::ComputerRepair => "Computer Repair",
            Self::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a listing shows up in public browse results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Busy,
    Offline,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Busy => "busy",
            Self::Offline => "offline",
        }
    }

    /// Label shown next to a listing.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available Now",
            Self::Busy => "Busy",
            Self::Offline => "Offline",
        }
    }
}

impl FromStr for AvailabilityStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "busy" => Ok(Self::Busy),
            "offline" => Ok(Self::Offline),
            other => Err(ValidationError::UnknownAvailability(other.to_string())),
        }
    }
}

impl fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
