//! Read filters for the services table.

use crate::domain::{AvailabilityStatus, Category, ProviderId};

/// Columns selected when the provider profile is joined in.
const SELECT_WITH_PROVIDER: &str = "*,profiles:provider_id(full_name,email)";

/// Filter, order and limit for one read of the services table.
///
/// Results are always ordered by `created_at` descending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceQuery {
    pub availability: Option<AvailabilityStatus>,
    pub provider_id: Option<ProviderId>,
    pub category: Option<Category>,
    /// Case-insensitive substring over title OR description
    pub search: Option<String>,
    pub limit: Option<usize>,
    /// Join the owner's display fields
    pub with_provider: bool,
}

impl ServiceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn available(mut self) -> Self {
        self.availability = Some(AvailabilityStatus::Available);
        self
    }

    pub fn owned_by(mut self, provider_id: ProviderId) -> Self {
        self.provider_id = Some(provider_id);
        self
    }

    pub fn in_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Empty search text means no search filter.
    pub fn matching(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search = if term.is_empty() { None } else { Some(term) };
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_provider(mut self) -> Self {
        self.with_provider = true;
        self
    }

    /// PostgREST query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let select = if self.with_provider {
            SELECT_WITH_PROVIDER
        } else {
            "*"
        };
        let mut params = vec![format!("select={}", urlencoding::encode(select))];

        if let Some(status) = self.availability {
            params.push(format!("availability_status=eq.{}", status.as_str()));
        }
        if let Some(provider_id) = &self.provider_id {
            params.push(format!(
                "provider_id=eq.{}",
                urlencoding::encode(provider_id.as_str())
            ));
        }
        if let Some(category) = self.category {
            params.push(format!("category=eq.{}", urlencoding::encode(category.as_str())));
        }
        if let Some(term) = &self.search {
            let pattern = ilike_pattern(term);
            let filter = format!(
                "(title.ilike.{pattern},description.ilike.{pattern})",
                pattern = pattern
            );
            params.push(format!("or={}", urlencoding::encode(&filter)));
        }

        params.push("order=created_at.desc".to_string());
        if let Some(limit) = self.limit {
            params.push(format!("limit={}", limit));
        }
        params.join("&")
    }
}

/// Quoted `*term*` pattern so commas and parentheses in the search text can't
/// break out of the `or=(...)` filter.
fn ilike_pattern(term: &str) -> String {
    let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"*{}*\"", escaped)
}
