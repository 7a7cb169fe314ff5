//! Auth gateway: login, signup, OTP verification, logout, and refresh.
//!
//! Every call is a `POST` under `/auth`. Successful calls return the
//! backend's `{ "message": ... }` payload; the backend manages the session
//! cookies itself through `Set-Cookie`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, RequestBody, RequestOptions, ScopedClient};
use crate::domain::{ApiError, ApiResult, DEFAULT_STATUS_CODE};

/// Path prefix for the auth endpoints.
pub const AUTH_PREFIX: &str = "/auth";

/// Login form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginUserDto {
    /// Account email.
    pub email: String,
    /// Plain-text password; sent over TLS only.
    pub password: String,
}

/// Signup form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupUserDto {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Account email; receives the OTP.
    pub email: String,
    /// Chosen password.
    pub password: String,
    /// Must equal `password`; the backend rejects mismatches.
    pub confirm_password: String,
}

/// OTP verification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyUserDto {
    /// Account email the OTP was sent to.
    pub email: String,
    /// Six-digit one-time password.
    pub otp: String,
}

/// Payload asking the backend to send a fresh OTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResendOtpDto {
    /// Account email the OTP should be sent to.
    pub email: String,
}

/// Minimal success payload shared by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// Typed access to the `/auth` endpoints.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    http: ScopedClient,
}

impl AuthGateway {
    /// Gateway over `client`, scoped to [`AUTH_PREFIX`].
    #[must_use]
    pub fn new(client: &ApiClient) -> Self {
        Self {
            http: client.endpoint(AUTH_PREFIX),
        }
    }

    /// `POST /auth/login`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`]; invalid credentials arrive as a
    /// request error with the backend's status.
    pub async fn login(&self, payload: &LoginUserDto) -> ApiResult<MessageResponse> {
        self.send("/login", Some(to_json(payload)?)).await
    }

    /// `POST /auth/logout`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`].
    pub async fn logout(&self) -> ApiResult<MessageResponse> {
        self.send("/logout", None).await
    }

    /// `POST /auth/signup`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`]; per-field rejections carry
    /// field errors.
    pub async fn signup(&self, payload: &SignupUserDto) -> ApiResult<MessageResponse> {
        self.send("/signup", Some(to_json(payload)?)).await
    }

    /// `POST /auth/verify`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`].
    pub async fn verify_user(&self, payload: &VerifyUserDto) -> ApiResult<MessageResponse> {
        self.send("/verify", Some(to_json(payload)?)).await
    }

    /// `POST /auth/refresh`. The refresh token travels as a cookie.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`]; a missing or revoked refresh
    /// token arrives as a 401 request error.
    pub async fn refresh(&self) -> ApiResult<MessageResponse> {
        self.send("/refresh", None).await
    }

    /// `POST /auth/resend-otp`.
    ///
    /// # Errors
    /// Returns the normalised [`ApiError`].
    pub async fn resend_otp(&self, payload: &ResendOtpDto) -> ApiResult<MessageResponse> {
        self.send("/resend-otp", Some(to_json(payload)?)).await
    }

    async fn send(&self, path: &str, body: Option<Value>) -> ApiResult<MessageResponse> {
        let body = body.map_or(RequestBody::Empty, RequestBody::Json);
        self.http.post(path, body, RequestOptions::default()).await
    }
}

fn to_json<T: Serialize>(payload: &T) -> ApiResult<Value> {
    serde_json::to_value(payload).map_err(|error| {
        ApiError::request(
            format!("failed to encode request body: {error}"),
            DEFAULT_STATUS_CODE,
        )
    })
}

#[cfg(test)]
mod tests {
    //! Endpoint and payload coverage for the auth gateway.
    use std::sync::Arc;

    use super::*;
    use crate::client::{ClientConfig, CookieJar};
    use crate::domain::ErrorKind;
    use crate::domain::ports::{HttpMethod, MockHttpTransport, TransportResponse};
    use rstest::rstest;
    use serde_json::json;

    fn gateway(transport: MockHttpTransport) -> AuthGateway {
        let client = ApiClient::new(
            ClientConfig::new("https://api.kaiflow.test"),
            Arc::new(transport),
            Arc::new(CookieJar::new()),
        );
        AuthGateway::new(&client)
    }

    fn expect_post(path: &'static str, body: RequestBody, reply: Value) -> MockHttpTransport {
        let mut transport = MockHttpTransport::new();
        transport
            .expect_send()
            .withf(move |request| {
                request.method == HttpMethod::Post
                    && request.url.path() == format!("/api/auth{path}")
                    && request.body == body
            })
            .times(1)
            .returning(move |_| {
                Ok(TransportResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: reply.to_string().into_bytes(),
                })
            });
        transport
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let transport = expect_post(
            "/login",
            RequestBody::Json(json!({ "email": "a@b.dev", "password": "Sup3r$ecret" })),
            json!({ "message": "Login successful" }),
        );
        let reply = gateway(transport)
            .login(&LoginUserDto {
                email: "a@b.dev".to_owned(),
                password: "Sup3r$ecret".to_owned(),
            })
            .await
            .expect("login");
        assert_eq!(reply.message, "Login successful");
    }

    #[tokio::test]
    async fn signup_sends_snake_case_fields() {
        let transport = expect_post(
            "/signup",
            RequestBody::Json(json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@kaiflow.dev",
                "password": "Engine#1843",
                "confirm_password": "Engine#1843",
            })),
            json!({ "message": "Signup successful. Please verify your email." }),
        );
        let reply = gateway(transport)
            .signup(&SignupUserDto {
                first_name: "Ada".to_owned(),
                last_name: "Lovelace".to_owned(),
                email: "ada@kaiflow.dev".to_owned(),
                password: "Engine#1843".to_owned(),
                confirm_password: "Engine#1843".to_owned(),
            })
            .await
            .expect("signup");
        assert!(reply.message.starts_with("Signup successful"));
    }

    #[tokio::test]
    async fn verify_and_resend_use_their_endpoints() {
        let verify = expect_post(
            "/verify",
            RequestBody::Json(json!({ "email": "a@b.dev", "otp": "123456" })),
            json!({ "message": "Email verified successfully" }),
        );
        gateway(verify)
            .verify_user(&VerifyUserDto {
                email: "a@b.dev".to_owned(),
                otp: "123456".to_owned(),
            })
            .await
            .expect("verify");

        let resend = expect_post(
            "/resend-otp",
            RequestBody::Json(json!({ "email": "a@b.dev" })),
            json!({ "message": "OTP sent" }),
        );
        gateway(resend)
            .resend_otp(&ResendOtpDto {
                email: "a@b.dev".to_owned(),
            })
            .await
            .expect("resend");
    }

    #[rstest]
    #[case("/logout")]
    #[case("/refresh")]
    #[tokio::test]
    async fn bodyless_calls_send_empty_body(#[case] path: &'static str) {
        let transport = expect_post(path, RequestBody::Empty, json!({ "message": "done" }));
        let gateway = gateway(transport);
        let reply = match path {
            "/logout" => gateway.logout().await,
            _ => gateway.refresh().await,
        }
        .expect("call succeeds");
        assert_eq!(reply.message, "done");
    }

    #[tokio::test]
    async fn rejected_refresh_surfaces_backend_error() {
        let mut transport = MockHttpTransport::new();
        transport.expect_send().times(1).returning(|_| {
            Ok(TransportResponse {
                status: 401,
                headers: Vec::new(),
                body: br#"{"message":"Refresh token revoked","error":"Unauthorized","statusCode":401}"#
                    .to_vec(),
            })
        });
        let err = gateway(transport).refresh().await.expect_err("revoked");
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.message(), "Refresh token revoked");
    }

    #[rstest]
    fn unencodable_payload_is_a_request_error() {
        let payload = std::collections::BTreeMap::from([((1_u8, 2_u8), "pair")]);
        let err = to_json(&payload).expect_err("tuple keys cannot become JSON");
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.status_code(), DEFAULT_STATUS_CODE);
        assert!(err.message().starts_with("failed to encode request body"));
    }
}
