//! Domain primitives for the authenticated gateway.
//!
//! Purpose: hold the transport-agnostic pieces: session credentials, the
//! normalised error shape, navigation classification, and the ports adapters
//! implement. Nothing here depends on actix or reqwest.
//!
//! Public surface:
//! - `ApiError` / `ApiOutcome` — the single failure shape and its
//!   pattern-matchable view.
//! - `SessionCredentials` — access and refresh tokens read from cookies.
//! - `navigation` — route-guard classification and decision table.

pub mod credentials;
pub mod error;
pub mod navigation;
pub mod ports;
pub mod trace_id;

pub use self::credentials::{
    ACCESS_TOKEN_COOKIE, AccessToken, REFRESH_TOKEN_COOKIE, RefreshToken, SessionCredentials,
};
pub use self::error::{
    ApiError, ApiErrorValidationError, ApiOutcome, DEFAULT_STATUS_CODE, ErrorKind,
    FALLBACK_MESSAGE, FieldErrors,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Result alias for client core calls.
pub type ApiResult<T> = Result<T, ApiError>;
