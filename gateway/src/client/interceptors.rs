//! Request and response interceptors applied to every client core call.
//!
//! Outbound: header merging, bearer-token injection, credential cookies, and
//! trace propagation. Inbound: payload unwrapping and error normalisation.
//! All functions are pure over their inputs and the cookie values at call time.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::domain::ports::{CookieStore, RequestBody, TransportResponse};
use crate::domain::{
    ACCESS_TOKEN_COOKIE, AccessToken, ApiError, ApiResult, DEFAULT_STATUS_CODE, FALLBACK_MESSAGE,
    FieldErrors, TRACE_ID_HEADER, TraceId,
};

pub(crate) const AUTHORIZATION: &str = "Authorization";
pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const COOKIE: &str = "Cookie";
pub(crate) const SET_COOKIE: &str = "Set-Cookie";

/// Insert or replace `name`, matching existing headers case-insensitively.
pub(crate) fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers
        .iter_mut()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
    {
        Some(entry) => entry.1 = value,
        None => headers.push((name.to_owned(), value)),
    }
}

/// Merge `overrides` into `defaults`; overrides win on conflict.
pub(crate) fn merge_headers(
    defaults: &[(String, String)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged = defaults.to_vec();
    for (name, value) in overrides {
        set_header(&mut merged, name, value.clone());
    }
    merged
}

/// Multipart bodies carry their own boundary content type.
pub(crate) fn strip_content_type_for(body: &RequestBody, headers: &mut Vec<(String, String)>) {
    if matches!(body, RequestBody::Multipart(_)) {
        headers.retain(|(key, _)| !key.eq_ignore_ascii_case(CONTENT_TYPE));
    }
}

/// Request interceptor: bearer token, credential cookies, and trace id.
///
/// A missing access token is not an error; the request goes out without an
/// `Authorization` header and the server decides.
pub(crate) fn attach_credentials(headers: &mut Vec<(String, String)>, cookies: &dyn CookieStore) {
    if let Some(token) = cookies.get(ACCESS_TOKEN_COOKIE).and_then(AccessToken::new) {
        set_header(headers, AUTHORIZATION, token.bearer());
    }
    if let Some(cookie_header) = cookies.cookie_header() {
        set_header(headers, COOKIE, cookie_header);
    }
    if let Some(trace_id) = TraceId::current() {
        set_header(headers, TRACE_ID_HEADER, trace_id.to_string());
    }
}

/// Record any `Set-Cookie` headers the backend sent.
pub(crate) fn absorb_set_cookies(response: &TransportResponse, cookies: &dyn CookieStore) {
    let issued: Vec<String> = response
        .header_values(SET_COOKIE)
        .map(str::to_owned)
        .collect();
    if !issued.is_empty() {
        cookies.store_set_cookies(&issued);
    }
}

/// Success path: hand back the decoded body only. An empty body decodes as
/// JSON `null`.
pub(crate) fn unwrap_payload<T: DeserializeOwned>(response: &TransportResponse) -> ApiResult<T> {
    let decoded = if response.body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    };
    decoded.map_err(|error| {
        warn!(status = response.status, %error, "response payload did not match the expected shape");
        ApiError::request(
            format!("failed to decode response body: {error}"),
            response.status,
        )
    })
}

/// Description used when an HTTP failure carries no usable body.
pub(crate) fn status_description(status: u16) -> String {
    format!("Request failed with status code {status}")
}

/// Failure path: classify a failed call into exactly one [`ApiError`].
///
/// Order: object `message` (field errors), string `message`, body `error`,
/// body `detail`, the transport's own description, then a fixed fallback.
/// `status` is `None` when no response was received.
///
/// # Examples
/// ```
/// use gateway::client::normalize_failure;
///
/// let body = br#"{"message":{"email":"Invalid","password":"Too short"}}"#;
/// let err = normalize_failure(Some(422), body, None);
/// assert_eq!(err.message(), "Invalid");
/// assert_eq!(err.status_code(), 422);
/// ```
#[must_use]
pub fn normalize_failure(
    status: Option<u16>,
    body: &[u8],
    transport_message: Option<&str>,
) -> ApiError {
    let status_code = status.unwrap_or(DEFAULT_STATUS_CODE);
    let envelope: Option<Value> = serde_json::from_slice(body).ok();
    let field = |name: &str| envelope.as_ref().and_then(|value| value.get(name));

    match field("message") {
        Some(Value::Object(fields)) => {
            return ApiError::validation(FieldErrors::from_json_object(fields), status_code);
        }
        Some(Value::String(message)) if !message.trim().is_empty() => {
            return ApiError::request(message.as_str(), status_code);
        }
        _ => {}
    }

    let message = field("error")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .or_else(|| {
            field("detail")
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty())
        })
        .or_else(|| transport_message.filter(|text| !text.trim().is_empty()))
        .unwrap_or(FALLBACK_MESSAGE);

    match status {
        Some(code) => ApiError::request(message, code),
        None => ApiError::transport(message),
    }
}
