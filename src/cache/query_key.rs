//! Structured cache keys.

use std::fmt;

/// Which read operation a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    /// Public landing feed of available listings
    AllServices,
    /// Filtered public browse results
    BrowseServices,
    /// Every listing owned by one provider
    ProviderServices,
}

impl QueryScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllServices => "all-services",
            Self::BrowseServices => "browse-services",
            Self::ProviderServices => "provider-services",
        }
    }
}

/// Cache key: an operation tag plus its parameter tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub scope: QueryScope,
    pub params: Vec<String>,
}

impl QueryKey {
    pub fn new<I, S>(scope: QueryScope, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scope,
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Key with no parameters; as a prefix it matches the whole scope.
    pub fn scope(scope: QueryScope) -> Self {
        Self {
            scope,
            params: Vec::new(),
        }
    }

    /// True when `prefix` has the same scope and its params lead ours.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.scope == prefix.scope && self.params.starts_with(&prefix.params)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope.as_str())?;
        for param in &self.params {
            write!(f, "/{}", param)?;
        }
        Ok(())
    }
}
