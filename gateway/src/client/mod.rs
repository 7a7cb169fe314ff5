//! HTTP client core: the single choke point for outbound API calls.
//!
//! [`ApiClient`] owns the resolved base URL, default headers, transport, and
//! cookie store. [`ScopedClient`] is a value bound to a path prefix that
//! shares all of that with the client it was made from. Every call runs the
//! request interceptor (bearer token, credential cookies, trace id) and the
//! response interceptor (payload unwrapping or error normalisation), and
//! resolves to either the bare payload or exactly one [`ApiError`].
//!
//! ```rust,ignore
//! let client = ApiClient::new(ClientConfig::new("https://api.kaiflow.dev"), transport, cookies);
//! let auth = client.endpoint("/auth");
//! let reply: MessageResponse = auth.post("/login", RequestBody::Json(body), RequestOptions::default()).await?;
//! ```

mod cookies;
mod interceptors;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

pub use cookies::CookieJar;
pub(crate) use cookies::cookie_pairs;
pub use interceptors::normalize_failure;

pub use crate::domain::ports::{MultipartPart, RequestBody};
use crate::domain::ports::{CookieStore, HttpMethod, HttpTransport, TransportRequest};
use crate::domain::{ApiError, ApiResult};

/// Fixed suffix appended to the configured API root.
pub const API_SUFFIX: &str = "/api";

/// Construction-time configuration for [`ApiClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    api_root: String,
    headers: Vec<(String, String)>,
}

impl ClientConfig {
    /// Configuration pointing at `api_root` (scheme and host, no `/api`).
    pub fn new(api_root: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into(),
            headers: Vec::new(),
        }
    }

    /// Add a default header. Caller headers override the built-in defaults.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Base URL every request is resolved against.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}{API_SUFFIX}", self.api_root.trim_end_matches('/'))
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra headers; these win over client defaults.
    pub headers: Vec<(String, String)>,
    /// Query string parameters.
    pub query: Vec<(String, String)>,
    /// Timeout handed to the transport unchanged.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Add a header override.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Set the transport timeout for this call.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

struct ClientCore {
    base_url: String,
    default_headers: Vec<(String, String)>,
    transport: Arc<dyn HttpTransport>,
}

/// Authenticated API client.
#[derive(Clone)]
pub struct ApiClient {
    core: Arc<ClientCore>,
    cookies: Arc<dyn CookieStore>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.core.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client over `transport`, reading credentials from `cookies`.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        cookies: Arc<dyn CookieStore>,
    ) -> Self {
        let base_url = config.base_url();
        let defaults = [(
            interceptors::CONTENT_TYPE.to_owned(),
            "application/json".to_owned(),
        )];
        let default_headers = interceptors::merge_headers(&defaults, &config.headers);
        Self {
            core: Arc::new(ClientCore {
                base_url,
                default_headers,
                transport,
            }),
            cookies,
        }
    }

    /// The same client reading credentials from a different cookie store.
    ///
    /// Used to make calls on behalf of one navigation with that navigation's
    /// cookies while sharing transport and configuration.
    #[must_use]
    pub fn with_cookie_store(&self, cookies: Arc<dyn CookieStore>) -> Self {
        Self {
            core: Arc::clone(&self.core),
            cookies,
        }
    }

    /// Resolved base URL (`{api_root}/api`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.core.base_url.as_str()
    }

    /// A client bound to `prefix`; see [`with_prefix`].
    #[must_use]
    pub fn endpoint(&self, prefix: &str) -> ScopedClient {
        with_prefix(self, prefix)
    }

    /// `GET path`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ApiResult<T> {
        self.dispatch("", HttpMethod::Get, path, RequestBody::Empty, options)
            .await
    }

    /// `POST path` with `body`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.dispatch("", HttpMethod::Post, path, body, options).await
    }

    /// `PUT path` with `body`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.dispatch("", HttpMethod::Put, path, body, options).await
    }

    /// `PATCH path` with `body`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.dispatch("", HttpMethod::Patch, path, body, options).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.dispatch("", HttpMethod::Delete, path, RequestBody::Empty, options)
            .await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        prefix: &str,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let full_path = format!("{prefix}{path}");
        let url = Url::parse(&join_url(&self.core.base_url, &full_path)).map_err(|error| {
            ApiError::transport(format!("invalid request URL for {full_path}: {error}"))
        })?;

        let mut headers = interceptors::merge_headers(&self.core.default_headers, &options.headers);
        interceptors::strip_content_type_for(&body, &mut headers);
        interceptors::attach_credentials(&mut headers, self.cookies.as_ref());

        let request = TransportRequest {
            method,
            url,
            headers,
            query: options.query,
            body,
            timeout: options.timeout,
        };

        debug!(method = method.as_str(), path = %full_path, "dispatching API request");
        let response = match self.core.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(method = method.as_str(), path = %full_path, %error, "API request failed without a response");
                return Err(normalize_failure(None, &[], Some(error.message())));
            }
        };

        interceptors::absorb_set_cookies(&response, self.cookies.as_ref());

        if response.is_success() {
            return interceptors::unwrap_payload(&response);
        }

        let description = interceptors::status_description(response.status);
        let error = normalize_failure(Some(response.status), &response.body, Some(&description));
        warn!(
            method = method.as_str(),
            path = %full_path,
            status = error.status_code(),
            kind = ?error.kind(),
            "API request rejected"
        );
        Err(error)
    }
}

/// Join `base` and `path` with exactly one `/`; an empty `path` yields `base`.
fn join_url(base: &str, path: &str) -> String {
    if path.is_empty() {
        return base.to_owned();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Client bound to a fixed path prefix.
///
/// Shares transport, defaults, and interceptors with the [`ApiClient`] it was
/// made from; creating one never changes that client.
#[derive(Debug, Clone)]
pub struct ScopedClient {
    base_prefix: String,
    client: ApiClient,
}

/// Bind `client` to `prefix`. Every call's path is `prefix + path`.
///
/// # Examples
/// ```rust,ignore
/// let auth = with_prefix(&client, "/auth");
/// let review = with_prefix(&client, "/review");
/// assert_eq!(auth.base_prefix(), "/auth");
/// ```
#[must_use]
pub fn with_prefix(client: &ApiClient, prefix: &str) -> ScopedClient {
    ScopedClient {
        base_prefix: prefix.to_owned(),
        client: client.clone(),
    }
}

impl ScopedClient {
    /// Prefix prepended to every path.
    #[must_use]
    pub fn base_prefix(&self) -> &str {
        self.base_prefix.as_str()
    }

    /// The client this scope delegates to.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `GET prefix + path`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ApiResult<T> {
        self.client
            .dispatch(&self.base_prefix, HttpMethod::Get, path, RequestBody::Empty, options)
            .await
    }

    /// `POST prefix + path` with `body`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.client
            .dispatch(&self.base_prefix, HttpMethod::Post, path, body, options)
            .await
    }

    /// `PUT prefix + path` with `body`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.client
            .dispatch(&self.base_prefix, HttpMethod::Put, path, body, options)
            .await
    }

    /// `PATCH prefix + path` with `body`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.client
            .dispatch(&self.base_prefix, HttpMethod::Patch, path, body, options)
            .await
    }

    /// `DELETE prefix + path`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`] for any failure.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        self.client
            .dispatch(&self.base_prefix, HttpMethod::Delete, path, RequestBody::Empty, options)
            .await
    }
}
