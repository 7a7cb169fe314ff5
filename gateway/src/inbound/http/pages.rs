//! Page forwarder.
//!
//! Navigations the route guard lets through are relayed to the page
//! renderer. Only browser-facing headers travel upstream; hop-by-hop headers
//! are dropped in both directions.

use std::sync::Arc;
use std::time::Duration;

use actix_web::http::header::{self, HeaderName, HeaderValue};
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{error, warn};
use url::Url;

use crate::domain::ports::{HttpMethod, HttpTransport, RequestBody, TransportRequest};
use crate::domain::{TRACE_ID_HEADER, TraceId};

const FORWARDED_REQUEST_HEADERS: [&str; 6] = [
    "accept",
    "accept-language",
    "cookie",
    "if-none-match",
    "if-modified-since",
    "user-agent",
];

const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "content-length",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "transfer-encoding",
    "upgrade",
];

/// Upstream page renderer.
pub struct PageForwarder {
    origin: String,
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
}

impl PageForwarder {
    /// Forwarder relaying to `origin` over `transport`.
    pub fn new(origin: impl AsRef<str>, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            origin: origin.as_ref().trim_end_matches('/').to_owned(),
            transport,
            timeout: None,
        }
    }

    /// Per-navigation timeout for the upstream call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn upstream_request(&self, req: &HttpRequest) -> Result<TransportRequest, url::ParseError> {
        let path_and_query = req
            .uri()
            .path_and_query()
            .map_or("/", |value| value.as_str());
        let url = Url::parse(&format!("{}{path_and_query}", self.origin))?;

        let mut headers: Vec<(String, String)> = req
            .headers()
            .iter()
            .filter(|(name, _)| FORWARDED_REQUEST_HEADERS.contains(&name.as_str()))
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();
        if let Some(trace_id) = TraceId::current() {
            headers.push((TRACE_ID_HEADER.to_owned(), trace_id.to_string()));
        }

        Ok(TransportRequest {
            method: HttpMethod::Get,
            url,
            headers,
            query: Vec::new(),
            body: RequestBody::Empty,
            timeout: self.timeout,
        })
    }
}

/// Default service: relay `GET` navigations to the page renderer.
pub async fn forward_page(req: HttpRequest, forwarder: web::Data<PageForwarder>) -> HttpResponse {
    if req.method() != Method::GET {
        return HttpResponse::MethodNotAllowed()
            .insert_header((header::ALLOW, "GET"))
            .finish();
    }

    let request = match forwarder.upstream_request(&req) {
        Ok(request) => request,
        Err(error) => {
            warn!(%error, path = req.path(), "cannot build upstream page URL");
            return HttpResponse::BadRequest().finish();
        }
    };

    let upstream = match forwarder.transport.send(request).await {
        Ok(response) => response,
        Err(error) if error.is_timeout() => {
            warn!(%error, path = req.path(), "page renderer timed out");
            return HttpResponse::GatewayTimeout().finish();
        }
        Err(error) => {
            error!(%error, path = req.path(), "page renderer unreachable");
            return HttpResponse::BadGateway().finish();
        }
    };

    let Ok(status) = StatusCode::from_u16(upstream.status) else {
        error!(status = upstream.status, "page renderer returned an invalid status");
        return HttpResponse::BadGateway().finish();
    };

    let mut response = HttpResponse::build(status);
    for (name, value) in &upstream.headers {
        if HOP_BY_HOP.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            continue;
        };
        response.append_header((name, value));
    }
    response.body(upstream.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockHttpTransport, TransportError, TransportResponse};
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    async fn navigate(
        transport: MockHttpTransport,
        req: actix_test::TestRequest,
    ) -> actix_web::dev::ServiceResponse {
        let forwarder = PageForwarder::new("http://pages.internal:3000/", Arc::new(transport))
            .with_timeout(Duration::from_secs(2));
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(forwarder))
                .default_service(web::to(forward_page)),
        )
        .await;
        actix_test::call_service(&app, req.to_request()).await
    }

    #[actix_web::test]
    async fn relays_page_with_filtered_headers() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.url.as_str() == "http://pages.internal:3000/review/42?tab=diff"
                    && request.header("cookie") == Some("access_token=a")
                    && request.header("x-internal").is_none()
                    && request.timeout == Some(Duration::from_secs(2))
            })
            .times(1)
            .returning(|_| {
                Ok(TransportResponse {
                    status: 200,
                    headers: vec![
                        ("content-type".to_owned(), "text/html".to_owned()),
                        ("transfer-encoding".to_owned(), "chunked".to_owned()),
                    ],
                    body: b"<html>review</html>".to_vec(),
                })
            });

        let res = navigate(
            transport,
            actix_test::TestRequest::get()
                .uri("/review/42?tab=diff")
                .insert_header(("cookie", "access_token=a"))
                .insert_header(("x-internal", "1")),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("text/html"))
        );
        assert!(res.headers().get(header::TRANSFER_ENCODING).is_none());
        let body = actix_test::read_body(res).await;
        assert_eq!(body.as_ref(), b"<html>review</html>");
    }

    #[actix_web::test]
    async fn upstream_status_is_preserved() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(TransportResponse {
                status: 404,
                headers: Vec::new(),
                body: b"missing".to_vec(),
            })
        });

        let res = navigate(transport, actix_test::TestRequest::get().uri("/nope")).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(TransportError::connect("connection refused"), StatusCode::BAD_GATEWAY)]
    #[case(TransportError::invalid_request("bad header"), StatusCode::BAD_GATEWAY)]
    #[case(TransportError::timeout("operation timed out"), StatusCode::GATEWAY_TIMEOUT)]
    #[actix_web::test]
    async fn renderer_failures_map_to_gateway_statuses(
        #[case] failure: TransportError,
        #[case] expected: StatusCode,
    ) {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .times(1)
            .returning(move |_| Err(failure.clone()));

        let res = navigate(transport, actix_test::TestRequest::get().uri("/")).await;
        assert_eq!(res.status(), expected);
    }

    #[actix_web::test]
    async fn non_get_navigations_are_rejected() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().never();

        let res = navigate(transport, actix_test::TestRequest::post().uri("/")).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
