//! OAuth entry route.
//!
//! `GET /oauth/{provider}` sends the browser to the backend's provider login
//! URL. The backend completes the flow and sets the session cookies itself.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, get, web};
use tracing::debug;

use crate::gateways::{OAuthGateway, OAuthProvider};

/// Redirect to the provider login URL; unknown providers are 404.
#[get("/oauth/{provider}")]
pub async fn oauth_login(
    provider: web::Path<String>,
    oauth: web::Data<OAuthGateway>,
) -> HttpResponse {
    match provider.parse::<OAuthProvider>() {
        Ok(provider) => {
            let target = oauth.login_url(provider);
            debug!(provider = provider.as_str(), "starting OAuth login");
            HttpResponse::Found()
                .insert_header((LOCATION, target))
                .finish()
        }
        Err(error) => HttpResponse::NotFound().body(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use rstest::rstest;

    #[rstest]
    #[case("/oauth/google", StatusCode::FOUND, Some("https://api.kaiflow.test/api/auth/google/login"))]
    #[case("/oauth/github", StatusCode::FOUND, Some("https://api.kaiflow.test/api/auth/github/login"))]
    #[case("/oauth/gitlab", StatusCode::NOT_FOUND, None)]
    #[actix_web::test]
    async fn redirects_known_providers(
        #[case] uri: &str,
        #[case] status: StatusCode,
        #[case] location: Option<&str>,
    ) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(OAuthGateway::new("https://api.kaiflow.test/")))
                .service(oauth_login),
        )
        .await;
        let req = actix_test::TestRequest::get().uri(uri).to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), status);
        assert_eq!(
            res.headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            location
        );
    }
}
