//! Server construction and middleware wiring.
//!
//! Probes and the OAuth entry route are registered directly on the app.
//! Every other path falls through to a catch-all scope wrapped by the route
//! guard, whose default service relays the navigation to the page renderer.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use gateway::domain::ports::SessionRefresher;
use gateway::gateways::{GatewaySessionRefresher, OAuthGateway};
use gateway::inbound::http::health::{HealthState, live, ready};
use gateway::inbound::http::oauth::oauth_login;
use gateway::inbound::http::pages::{PageForwarder, forward_page};
use gateway::inbound::http::{RouteGuard, Trace};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    oauth: web::Data<OAuthGateway>,
    pages: web::Data<PageForwarder>,
    refresher: Arc<dyn SessionRefresher>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        oauth,
        pages,
        refresher,
    } = deps;

    let guarded_pages = web::scope("")
        .wrap(RouteGuard::new(refresher))
        .default_service(web::to(forward_page));

    App::new()
        .app_data(health_state)
        .app_data(oauth)
        .app_data(pages)
        .wrap(Trace)
        .service(ready)
        .service(live)
        .service(oauth_login)
        .service(guarded_pages)
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        api_client,
        oauth,
        pages,
    } = config;

    let refresher: Arc<dyn SessionRefresher> = Arc::new(GatewaySessionRefresher::new(api_client));
    let deps = AppDependencies {
        health_state: health_state.clone(),
        oauth: web::Data::new(oauth),
        pages: web::Data::new(pages),
        refresher,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    info!(%bind_addr, "edge server listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Wiring checks: which paths the guard sees.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::http::header::LOCATION;
    use actix_web::test as actix_test;
    use async_trait::async_trait;
    use gateway::domain::ports::{
        HttpTransport, RefreshedSession, TransportError, TransportRequest, TransportResponse,
    };
    use gateway::domain::{ApiError, ApiResult, SessionCredentials};
    use rstest::rstest;

    struct RejectingRefresher;

    #[async_trait]
    impl SessionRefresher for RejectingRefresher {
        async fn refresh(&self, _: &SessionCredentials) -> ApiResult<RefreshedSession> {
            Err(ApiError::request("Invalid refresh token", 401))
        }
    }

    struct StaticPages;

    #[async_trait]
    impl HttpTransport for StaticPages {
        async fn send(
            &self,
            _: TransportRequest,
        ) -> Result<TransportResponse, TransportError> {
            Ok(TransportResponse {
                status: 200,
                headers: vec![("content-type".to_owned(), "text/html".to_owned())],
                body: b"<html></html>".to_vec(),
            })
        }
    }

    fn deps() -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            oauth: web::Data::new(OAuthGateway::new("https://api.kaiflow.test")),
            pages: web::Data::new(PageForwarder::new(
                "http://pages.internal",
                Arc::new(StaticPages),
            )),
            refresher: Arc::new(RejectingRefresher),
        }
    }

    #[rstest]
    #[case("/health/ready", None, StatusCode::OK, None)]
    #[case("/health/live", None, StatusCode::OK, None)]
    #[case("/oauth/google", None, StatusCode::FOUND, Some("https://api.kaiflow.test/api/auth/google/login"))]
    #[case("/_next/static/app.js", None, StatusCode::OK, None)]
    #[case("/login", None, StatusCode::OK, None)]
    #[case("/login", Some("access_token=a"), StatusCode::TEMPORARY_REDIRECT, Some("/"))]
    #[case("/", None, StatusCode::TEMPORARY_REDIRECT, Some("/login"))]
    #[case("/", Some("access_token=a"), StatusCode::OK, None)]
    #[case("/history", Some("refresh_token=r"), StatusCode::TEMPORARY_REDIRECT, Some("/login"))]
    #[actix_web::test]
    async fn routes_navigations(
        #[case] uri: &str,
        #[case] cookie: Option<&str>,
        #[case] status: StatusCode,
        #[case] location: Option<&str>,
    ) {
        let app = actix_test::init_service(build_app(deps())).await;
        let mut req = actix_test::TestRequest::get().uri(uri);
        if let Some(cookie) = cookie {
            req = req.insert_header(("cookie", cookie));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;

        assert_eq!(res.status(), status);
        assert_eq!(
            res.headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok()),
            location
        );
        assert!(res.headers().contains_key("trace-id"));
    }
}
