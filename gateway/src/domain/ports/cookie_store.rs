//! Driven port over the cookie storage that holds session credentials.
//!
//! Reads happen on every request. Writes happen only when the backend answers
//! with `Set-Cookie`, mirroring a browser's credentialed fetch.

/// Cookie storage consulted by the request interceptor.
#[cfg_attr(test, mockall::automock)]
pub trait CookieStore: Send + Sync {
    /// Current value of cookie `name`.
    fn get(&self, name: &str) -> Option<String>;

    /// `Cookie` header value for every stored cookie, if any are stored.
    fn cookie_header(&self) -> Option<String>;

    /// Record `Set-Cookie` header values received from the backend.
    fn store_set_cookies(&self, set_cookie_headers: &[String]);
}
