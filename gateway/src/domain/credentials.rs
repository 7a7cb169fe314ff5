//! Session credentials carried in browser cookies.
//!
//! The backend issues both tokens through `Set-Cookie`; this layer only ever
//! reads them. Values are opaque and are wiped from memory on drop.

use zeroize::Zeroize;

/// Cookie holding the short-lived access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie holding the long-lived refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

macro_rules! define_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw cookie value. Blank values carry no credential.
            pub fn new(raw: impl Into<String>) -> Option<Self> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    None
                } else {
                    Some(Self(raw))
                }
            }

            /// Borrow the raw token value.
            #[must_use]
            pub fn expose(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(concat!(stringify!($name), "(<redacted>)"))
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                self.0.zeroize();
            }
        }
    };
}

define_token! {
    /// Short-lived bearer credential authorising API requests.
    AccessToken
}

define_token! {
    /// Long-lived credential exchanged for a fresh access token.
    RefreshToken
}

impl AccessToken {
    /// Render the `Authorization` header value for this token.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// The credential cookies present on one request.
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    /// Access token, if the cookie was present and non-blank.
    pub access_token: Option<AccessToken>,
    /// Refresh token, if the cookie was present and non-blank.
    pub refresh_token: Option<RefreshToken>,
}

impl SessionCredentials {
    /// Build credentials from raw cookie lookups.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        Self {
            access_token: lookup(ACCESS_TOKEN_COOKIE).and_then(AccessToken::new),
            refresh_token: lookup(REFRESH_TOKEN_COOKIE).and_then(RefreshToken::new),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for credential wrappers.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("abc.def", true)]
    fn blank_tokens_are_rejected(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(AccessToken::new(raw).is_some(), accepted);
        assert_eq!(RefreshToken::new(raw).is_some(), accepted);
    }

    #[rstest]
    fn debug_output_redacts_the_value() {
        let token = AccessToken::new("secret-value").expect("token");
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("secret-value"));
        assert_eq!(rendered, "AccessToken(<redacted>)");
    }

    #[rstest]
    fn bearer_header_uses_raw_value() {
        let token = AccessToken::new("tok123").expect("token");
        assert_eq!(token.bearer(), "Bearer tok123");
    }

    #[rstest]
    fn from_lookup_reads_both_cookies() {
        let credentials = SessionCredentials::from_lookup(|name| match name {
            ACCESS_TOKEN_COOKIE => Some("a".to_owned()),
            REFRESH_TOKEN_COOKIE => Some(String::new()),
            _ => None,
        });
        assert_eq!(
            credentials.access_token.as_ref().map(AccessToken::expose),
            Some("a")
        );
        assert!(credentials.refresh_token.is_none());
    }
}
