//! OAuth entry points.
//!
//! These are not JSON calls: the browser is sent to the backend's provider
//! login URL with a full-page redirect, so nothing here goes through the
//! client core.

use std::str::FromStr;

use crate::client::API_SUFFIX;

/// Supported identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OAuthProvider {
    /// Google sign-in.
    Google,
    /// GitHub sign-in.
    Github,
}

impl OAuthProvider {
    /// Path segment used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
        }
    }
}

/// Raised for provider names other than `google` and `github`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported OAuth provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for OAuthProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::Github),
            _ => Err(UnknownProvider(s.to_owned())),
        }
    }
}

/// Builds provider login URLs and exposes the configured client ids.
#[derive(Debug, Clone, Default)]
pub struct OAuthGateway {
    api_root: String,
    google_client_id: Option<String>,
    github_client_id: Option<String>,
}

impl OAuthGateway {
    /// Gateway for the backend at `api_root`.
    pub fn new(api_root: impl AsRef<str>) -> Self {
        Self {
            api_root: api_root.as_ref().trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }

    /// Attach public client ids for display and configuration.
    #[must_use]
    pub fn with_client_ids(
        mut self,
        google_client_id: Option<String>,
        github_client_id: Option<String>,
    ) -> Self {
        self.google_client_id = google_client_id;
        self.github_client_id = github_client_id;
        self
    }

    /// `{api_root}/api/auth/{provider}/login`.
    ///
    /// # Examples
    /// ```
    /// use gateway::gateways::{OAuthGateway, OAuthProvider};
    ///
    /// let oauth = OAuthGateway::new("https://api.kaiflow.dev/");
    /// assert_eq!(
    ///     oauth.login_url(OAuthProvider::Github),
    ///     "https://api.kaiflow.dev/api/auth/github/login"
    /// );
    /// ```
    #[must_use]
    pub fn login_url(&self, provider: OAuthProvider) -> String {
        format!(
            "{}{API_SUFFIX}/auth/{}/login",
            self.api_root,
            provider.as_str()
        )
    }

    /// Public client id configured for `provider`.
    #[must_use]
    pub fn client_id(&self, provider: OAuthProvider) -> Option<&str> {
        match provider {
            OAuthProvider::Google => self.google_client_id.as_deref(),
            OAuthProvider::Github => self.github_client_id.as_deref(),
        }
    }
}
