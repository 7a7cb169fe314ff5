//! Reqwest-backed HTTP transport adapter.
//!
//! This adapter owns wire details only: method and header translation, JSON
//! and multipart serialisation, per-call timeouts, and transport error
//! mapping. Every HTTP status is returned as a response; interpreting error
//! envelopes is the client core's job.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use crate::domain::ports::{
    HttpMethod, HttpTransport, MultipartPart, RequestBody, TransportError, TransportRequest,
    TransportResponse,
};

/// [`HttpTransport`] over a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Build a transport whose requests time out after `timeout` unless the
    /// call supplies its own.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Like [`ReqwestTransport::new`], but hands `3xx` responses back
    /// instead of following them.
    ///
    /// Used when relaying page responses, where the browser must see the
    /// upstream redirect itself.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn without_redirects(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }

    fn prepare(&self, request: TransportRequest) -> RequestBuilder {
        let TransportRequest {
            method,
            url,
            headers,
            query,
            body,
            timeout,
        } = request;

        let mut builder = self.client.request(to_reqwest_method(method), url);
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let method = request.method;
        let url = request.url.clone();
        let response = self
            .prepare(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(map_transport_error)?;
        debug!(method = method.as_str(), %url, status, "outbound call completed");

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

fn build_form(parts: Vec<MultipartPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| match part {
        MultipartPart::Text { name, value } => form.text(name, value),
        MultipartPart::File {
            name,
            file_name,
            bytes,
        } => form.part(name, Part::bytes(bytes).file_name(file_name)),
    })
}

fn collect_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_owned(), value.to_owned()))
        })
        .collect()
}

fn map_transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::timeout(error.to_string())
    } else if error.is_builder() {
        TransportError::invalid_request(error.to_string())
    } else {
        TransportError::connect(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network request translation.

    use super::*;
    use reqwest::header::{CONTENT_TYPE, HeaderValue, SET_COOKIE};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use url::Url;

    #[fixture]
    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(Duration::from_secs(5)).expect("client builds")
    }

    fn request(body: RequestBody) -> TransportRequest {
        TransportRequest {
            method: HttpMethod::Post,
            url: Url::parse("https://api.kaiflow.test/api/review/text").expect("url"),
            headers: vec![
                ("Content-Type".to_owned(), "application/json".to_owned()),
                ("Authorization".to_owned(), "Bearer t".to_owned()),
            ],
            query: vec![("lang".to_owned(), "rust".to_owned())],
            body,
            timeout: Some(Duration::from_millis(750)),
        }
    }

    #[rstest]
    #[case(HttpMethod::Get, Method::GET)]
    #[case(HttpMethod::Post, Method::POST)]
    #[case(HttpMethod::Put, Method::PUT)]
    #[case(HttpMethod::Patch, Method::PATCH)]
    #[case(HttpMethod::Delete, Method::DELETE)]
    fn maps_every_method(#[case] method: HttpMethod, #[case] expected: Method) {
        assert_eq!(to_reqwest_method(method), expected);
    }

    #[rstest]
    fn json_requests_keep_headers_query_and_timeout(transport: ReqwestTransport) {
        let built = transport
            .prepare(request(RequestBody::Json(json!({ "code": "x" }))))
            .build()
            .expect("request builds");

        assert_eq!(built.method(), Method::POST);
        assert_eq!(
            built.url().as_str(),
            "https://api.kaiflow.test/api/review/text?lang=rust"
        );
        assert_eq!(
            built.headers().get(CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            built.headers().get("authorization"),
            Some(&HeaderValue::from_static("Bearer t"))
        );
        assert_eq!(built.timeout(), Some(&Duration::from_millis(750)));
        let body = built.body().and_then(reqwest::Body::as_bytes);
        assert_eq!(body, Some(br#"{"code":"x"}"#.as_slice()));
    }

    #[rstest]
    fn multipart_requests_carry_a_boundary(transport: ReqwestTransport) {
        let mut plain = request(RequestBody::Multipart(vec![MultipartPart::Text {
            name: "code".to_owned(),
            value: "fn main() {}".to_owned(),
        }]));
        plain.headers.retain(|(name, _)| name != "Content-Type");

        let built = transport.prepare(plain).build().expect("request builds");
        let content_type = built
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .expect("content type");
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[rstest]
    fn invalid_header_names_fail_at_build(transport: ReqwestTransport) {
        let mut bad = request(RequestBody::Empty);
        bad.headers.push(("bad header".to_owned(), "x".to_owned()));

        let error = transport.prepare(bad).build().expect_err("must fail");
        assert!(map_transport_error(error).is_invalid_request());
    }

    #[rstest]
    fn repeated_response_headers_are_kept() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("access_token=a"));
        headers.append(SET_COOKIE, HeaderValue::from_static("refresh_token=r"));

        let collected = collect_headers(&headers);
        assert_eq!(
            collected,
            vec![
                ("set-cookie".to_owned(), "access_token=a".to_owned()),
                ("set-cookie".to_owned(), "refresh_token=r".to_owned()),
            ]
        );
    }
}
