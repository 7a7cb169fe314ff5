//! Driven port for the raw HTTP round trip beneath the client core.
//!
//! The transport knows nothing about tokens or error envelopes: it sends what
//! it is given and returns the status, headers, and body of whatever came
//! back, success or not. Only failures to obtain a response are errors here.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use super::macros::define_port_error;

/// HTTP verbs exposed by the client core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// One part of a multipart form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// Plain text field.
    Text {
        /// Form field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File upload field.
    File {
        /// Form field name.
        name: String,
        /// File name reported to the server.
        file_name: String,
        /// Raw file contents.
        bytes: Vec<u8>,
    },
}

impl MultipartPart {
    /// Form field name of this part.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name.as_str(),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document; sent with the client's default `Content-Type`.
    Json(Value),
    /// `multipart/form-data`; the transport sets the boundary content type.
    Multipart(Vec<MultipartPart>),
}

/// Fully resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Verb.
    pub method: HttpMethod,
    /// Absolute URL including base URL, endpoint prefix, and path.
    pub url: Url,
    /// Headers after defaults, per-call overrides, and interceptors.
    pub headers: Vec<(String, String)>,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// Payload.
    pub body: RequestBody,
    /// Caller-supplied timeout, passed through unchanged.
    pub timeout: Option<Duration>,
}

impl TransportRequest {
    /// First value of header `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Raw response returned for any HTTP status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers; repeated headers appear once per value.
    pub headers: Vec<(String, String)>,
    /// Response body bytes.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// All values of header `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

define_port_error! {
    /// Errors raised when no HTTP response could be obtained.
    ///
    /// The message is the transport's own description and is what callers
    /// see when no response body is available.
    pub enum TransportError {
        /// Connection, TLS, or protocol failure.
        Connect,
        /// The caller-supplied timeout elapsed.
        Timeout,
        /// The request could not be built (bad header, bad URL).
        InvalidRequest,
    }
}

/// Port performing one HTTP round trip.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send `request` and return the raw response, whatever its status.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
