//! Navigation classification and the route-guard decision table.
//!
//! Pure functions only: the inbound middleware reads cookies and performs the
//! refresh, this module decides what each navigation is allowed to do.

use crate::domain::SessionCredentials;

/// Path users are sent to when no session can be established.
pub const LOGIN_PATH: &str = "/login";

/// Path authenticated users are sent to when they hit an auth page.
pub const ROOT_PATH: &str = "/";

/// Pages that only make sense without a session.
pub const AUTH_PAGES: [&str; 3] = ["/login", "/signup", "/otp"];

const ASSET_PREFIXES: [&str; 4] = ["/_next/static", "/_next/image", "/_next/data", "/static/"];

const WELL_KNOWN_FILES: [&str; 4] = [
    "/favicon.ico",
    "/robots.txt",
    "/sitemap.xml",
    "/manifest.webmanifest",
];

/// How a navigation path is treated before any credential is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationClass {
    /// Static asset or excluded path; the guard never looks at cookies.
    PassThrough,
    /// Login, signup, or OTP verification page.
    AuthPage,
    /// Any other page; requires a session.
    Protected,
}

/// What the guard must do with a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Let the navigation through untouched.
    Proceed,
    /// Perform a full redirect to the given path.
    Redirect(&'static str),
    /// Only a refresh token is present; try exactly one refresh.
    AttemptRefresh,
}

/// Classify a request path.
///
/// # Examples
/// ```
/// use gateway::domain::navigation::{classify_path, NavigationClass};
///
/// assert_eq!(classify_path("/favicon.ico"), NavigationClass::PassThrough);
/// assert_eq!(classify_path("/login"), NavigationClass::AuthPage);
/// assert_eq!(classify_path("/c/42"), NavigationClass::Protected);
/// ```
#[must_use]
pub fn classify_path(path: &str) -> NavigationClass {
    if is_pass_through(path) {
        NavigationClass::PassThrough
    } else if is_auth_page(path) {
        NavigationClass::AuthPage
    } else {
        NavigationClass::Protected
    }
}

/// Decide the guard transition for a classified navigation.
#[must_use]
pub fn decide(class: NavigationClass, credentials: &SessionCredentials) -> GuardDecision {
    let has_access = credentials.access_token.is_some();
    match class {
        NavigationClass::PassThrough => GuardDecision::Proceed,
        NavigationClass::AuthPage if has_access => GuardDecision::Redirect(ROOT_PATH),
        NavigationClass::AuthPage => GuardDecision::Proceed,
        NavigationClass::Protected if has_access => GuardDecision::Proceed,
        NavigationClass::Protected if credentials.refresh_token.is_some() => {
            GuardDecision::AttemptRefresh
        }
        NavigationClass::Protected => GuardDecision::Redirect(LOGIN_PATH),
    }
}

/// Resolve the decision that follows a refresh attempt.
#[must_use]
pub fn after_refresh(refreshed: bool) -> GuardDecision {
    if refreshed {
        GuardDecision::Proceed
    } else {
        GuardDecision::Redirect(LOGIN_PATH)
    }
}

fn is_pass_through(path: &str) -> bool {
    ASSET_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || WELL_KNOWN_FILES.contains(&path)
        || has_file_extension(path)
}

fn has_file_extension(path: &str) -> bool {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((stem, extension)) => !stem.is_empty() && !extension.is_empty(),
        None => false,
    }
}

fn is_auth_page(path: &str) -> bool {
    AUTH_PAGES.iter().any(|page| {
        path.strip_prefix(page)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}
