//! In-memory cookie jar backing credentialed client calls.
//!
//! A jar is seeded from the cookies a navigation arrived with (or built empty
//! for a long-lived client) and is then updated only from `Set-Cookie`
//! headers the backend returns. Each guard evaluation gets its own jar.

use std::sync::{PoisonError, RwLock};

use actix_web::cookie::Cookie;
use tracing::debug;

use crate::domain::ports::CookieStore;
use crate::domain::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, SessionCredentials};

/// Thread-safe cookie jar keyed by cookie name.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<Vec<(String, String)>>,
    issued: RwLock<Vec<String>>,
}

impl CookieJar {
    /// Empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Jar seeded from a raw `Cookie` request header. Malformed pairs are skipped.
    #[must_use]
    pub fn from_cookie_header(header: &str) -> Self {
        let jar = Self::new();
        for (name, value) in cookie_pairs(header) {
            jar.insert(&name, &value);
        }
        jar
    }

    /// Jar holding exactly the given session credentials.
    #[must_use]
    pub fn from_credentials(credentials: &SessionCredentials) -> Self {
        let jar = Self::new();
        if let Some(token) = &credentials.access_token {
            jar.insert(ACCESS_TOKEN_COOKIE, token.expose());
        }
        if let Some(token) = &credentials.refresh_token {
            jar.insert(REFRESH_TOKEN_COOKIE, token.expose());
        }
        jar
    }

    /// Insert or replace a cookie.
    pub fn insert(&self, name: &str, value: &str) {
        let mut cookies = self.cookies.write().unwrap_or_else(PoisonError::into_inner);
        match cookies.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => value.clone_into(&mut entry.1),
            None => cookies.push((name.to_owned(), value.to_owned())),
        }
    }

    /// Remove a cookie if present.
    pub fn remove(&self, name: &str) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(key, _)| key != name);
    }

    /// Every `Set-Cookie` value received since the jar was created, in order.
    #[must_use]
    pub fn issued_set_cookies(&self) -> Vec<String> {
        self.issued
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CookieStore for CookieJar {
    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        if cookies.is_empty() {
            return None;
        }
        let pairs: Vec<String> = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        Some(pairs.join("; "))
    }

    fn store_set_cookies(&self, set_cookie_headers: &[String]) {
        for raw in set_cookie_headers {
            let Ok(cookie) = Cookie::parse(raw.as_str()) else {
                debug!(header = %raw, "ignoring unparsable Set-Cookie header");
                continue;
            };
            let expired = cookie
                .max_age()
                .is_some_and(|age| age.is_zero() || age.is_negative());
            if expired || cookie.value().is_empty() {
                self.remove(cookie.name());
            } else {
                self.insert(cookie.name(), cookie.value());
            }
        }
        self.issued
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(set_cookie_headers.iter().cloned());
    }
}

/// Name/value pairs of a raw `Cookie` request header, in header order.
///
/// Malformed pairs are skipped.
pub(crate) fn cookie_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| Cookie::parse(pair).ok())
        .map(|cookie| (cookie.name().to_owned(), cookie.value().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessToken, RefreshToken};
    use rstest::rstest;

    #[rstest]
    fn parses_request_cookie_header() {
        let jar = CookieJar::from_cookie_header("access_token=abc; theme=dark; refresh_token=xyz");
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).as_deref(), Some("abc"));
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
        assert_eq!(
            jar.cookie_header().as_deref(),
            Some("access_token=abc; theme=dark; refresh_token=xyz")
        );
    }

    #[rstest]
    fn empty_jar_sends_no_cookie_header() {
        assert!(CookieJar::new().cookie_header().is_none());
    }

    #[rstest]
    fn seeds_from_credentials() {
        let credentials = SessionCredentials {
            access_token: None,
            refresh_token: RefreshToken::new("r1"),
        };
        let jar = CookieJar::from_credentials(&credentials);
        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
        assert_eq!(jar.cookie_header().as_deref(), Some("refresh_token=r1"));

        let with_access = SessionCredentials {
            access_token: AccessToken::new("a1"),
            refresh_token: None,
        };
        assert_eq!(
            CookieJar::from_credentials(&with_access)
                .get(ACCESS_TOKEN_COOKIE)
                .as_deref(),
            Some("a1")
        );
    }

    #[rstest]
    fn set_cookie_updates_and_records() {
        let jar = CookieJar::from_cookie_header("refresh_token=r1");
        let issued = vec!["access_token=fresh; HttpOnly; Path=/; Max-Age=900".to_owned()];
        jar.store_set_cookies(&issued);
        assert_eq!(jar.get(ACCESS_TOKEN_COOKIE).as_deref(), Some("fresh"));
        assert_eq!(jar.issued_set_cookies(), issued);
    }

    #[rstest]
    #[case("access_token=\"\"; Max-Age=0; Path=/")]
    #[case("access_token=; Path=/")]
    fn deleting_cookies_removes_them(#[case] header: &str) {
        let jar = CookieJar::from_cookie_header("access_token=old");
        jar.store_set_cookies(&[header.to_owned()]);
        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
    }

    #[rstest]
    fn unparsable_headers_are_skipped_but_recorded() {
        let jar = CookieJar::new();
        jar.store_set_cookies(&["no-equals-sign".to_owned()]);
        assert!(jar.cookie_header().is_none());
        assert_eq!(jar.issued_set_cookies().len(), 1);
    }
}
