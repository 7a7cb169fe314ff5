//! Driving port the route guard uses to attempt a silent session refresh.

use async_trait::async_trait;

use crate::domain::{ApiError, SessionCredentials};

/// Result of a successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshedSession {
    /// `Set-Cookie` values issued by the backend, to be relayed to the browser.
    pub set_cookies: Vec<String>,
}

/// Port exchanging a refresh token for a fresh session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRefresher: Send + Sync {
    /// Call the refresh endpoint once with the navigation's credentials.
    async fn refresh(&self, credentials: &SessionCredentials) -> Result<RefreshedSession, ApiError>;
}
