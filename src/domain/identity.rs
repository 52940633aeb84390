//! Caller identity.

use super::ids::ProviderId;

/// The signed-in user on whose behalf a request is made.
///
/// Supplied by whatever manages the session and passed explicitly into every
/// provider-scoped call. There is no process-wide "current user".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: ProviderId,
    pub email: Option<String>,
    /// Session access token; requests fall back to the anonymous key without one.
    pub access_token: Option<String>,
}

impl Identity {
    pub fn new(user_id: ProviderId) -> Self {
        Self {
            user_id,
            email: None,
            access_token: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }
}
