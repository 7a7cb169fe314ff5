//! Session refresh adapter used by the route guard.
//!
//! Each refresh runs through the auth gateway with a private cookie jar
//! seeded from the navigation's credentials, so the refresh token travels as
//! a cookie exactly as a browser would send it. Cookies the backend issues in
//! reply are handed back for relaying to the browser.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::AuthGateway;
use crate::client::{ApiClient, CookieJar};
use crate::domain::ports::{RefreshedSession, SessionRefresher};
use crate::domain::{ApiResult, SessionCredentials};

/// [`SessionRefresher`] backed by `POST /auth/refresh`.
#[derive(Debug, Clone)]
pub struct GatewaySessionRefresher {
    client: ApiClient,
}

impl GatewaySessionRefresher {
    /// Refresher sharing `client`'s transport and configuration.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionRefresher for GatewaySessionRefresher {
    async fn refresh(&self, credentials: &SessionCredentials) -> ApiResult<RefreshedSession> {
        let jar = Arc::new(CookieJar::from_credentials(credentials));
        let auth = AuthGateway::new(&self.client.with_cookie_store(jar.clone()));
        let reply = auth.refresh().await?;
        debug!(message = %reply.message, "session refreshed");
        Ok(RefreshedSession {
            set_cookies: jar.issued_set_cookies(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use crate::domain::ports::{MockHttpTransport, TransportResponse};
    use crate::domain::{ErrorKind, RefreshToken};

    fn refresher(transport: MockHttpTransport) -> GatewaySessionRefresher {
        let client = ApiClient::new(
            ClientConfig::new("https://api.kaiflow.test"),
            Arc::new(transport),
            Arc::new(CookieJar::new()),
        );
        GatewaySessionRefresher::new(client)
    }

    fn refresh_only() -> SessionCredentials {
        SessionCredentials {
            access_token: None,
            refresh_token: RefreshToken::new("r-42"),
        }
    }

    #[tokio::test]
    async fn sends_refresh_cookie_and_relays_new_cookies() {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(|request| {
                request.url.path() == "/api/auth/refresh"
                    && request.header("Cookie") == Some("refresh_token=r-42")
                    && request.header("Authorization").is_none()
            })
            .times(1)
            .returning(|_| {
                Ok(TransportResponse {
                    status: 200,
                    headers: vec![(
                        "set-cookie".to_owned(),
                        "access_token=fresh; HttpOnly; Max-Age=900; Path=/".to_owned(),
                    )],
                    body: br#"{"message":"Token refreshed"}"#.to_vec(),
                })
            });

        let session = refresher(transport)
            .refresh(&refresh_only())
            .await
            .expect("refresh succeeds");
        assert_eq!(
            session.set_cookies,
            vec!["access_token=fresh; HttpOnly; Max-Age=900; Path=/".to_owned()]
        );
    }

    #[tokio::test]
    async fn rejection_is_returned_as_api_error() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(TransportResponse {
                status: 401,
                headers: Vec::new(),
                body: br#"{"detail":"Invalid refresh token"}"#.to_vec(),
            })
        });

        let err = refresher(transport)
            .refresh(&refresh_only())
            .await
            .expect_err("refresh rejected");
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.message(), "Invalid refresh token");
    }
}
