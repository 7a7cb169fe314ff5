//! Route guard middleware.
//!
//! Runs before every page navigation. Static assets pass untouched; auth
//! pages bounce signed-in users to `/`; every other page needs an access
//! token, or a refresh token that can be exchanged for one. A navigation
//! triggers at most one refresh call and the guard waits for it before
//! deciding. Cookies issued by a successful refresh go back to the browser
//! on the response and forward to the page handler on the request.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{COOKIE, HeaderValue, LOCATION, SET_COOKIE};
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{debug, warn};

use crate::client::cookie_pairs;
use crate::domain::navigation::{GuardDecision, after_refresh, classify_path, decide};
use crate::domain::ports::SessionRefresher;
use crate::domain::{SessionCredentials, TraceId};

/// Middleware enforcing session presence on page navigations.
///
/// # Examples
/// ```rust,ignore
/// let guard = RouteGuard::new(Arc::new(GatewaySessionRefresher::new(client)));
/// let app = App::new().wrap(guard);
/// ```
#[derive(Clone)]
pub struct RouteGuard {
    refresher: Arc<dyn SessionRefresher>,
}

impl RouteGuard {
    /// Guard refreshing sessions through `refresher`.
    pub fn new(refresher: Arc<dyn SessionRefresher>) -> Self {
        Self { refresher }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RouteGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RouteGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RouteGuardMiddleware {
            service: Rc::new(service),
            refresher: Arc::clone(&self.refresher),
        }))
    }
}

/// Service wrapper produced by [`RouteGuard`].
pub struct RouteGuardMiddleware<S> {
    service: Rc<S>,
    refresher: Arc<dyn SessionRefresher>,
}

impl<S, B> Service<ServiceRequest> for RouteGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let class = classify_path(req.path());
        let credentials = SessionCredentials::from_lookup(|name| {
            req.cookie(name).map(|cookie| cookie.value().to_owned())
        });
        let decision = decide(class, &credentials);
        let service = Rc::clone(&self.service);
        let refresher = Arc::clone(&self.refresher);

        Box::pin(async move {
            let (decision, set_cookies) = match decision {
                GuardDecision::AttemptRefresh => match refresher.refresh(&credentials).await {
                    Ok(session) => (after_refresh(true), session.set_cookies),
                    Err(error) => {
                        warn!(
                            path = req.path(),
                            status = error.status_code(),
                            %error,
                            trace_id = ?TraceId::current(),
                            "session refresh failed; redirecting to login"
                        );
                        (after_refresh(false), Vec::new())
                    }
                },
                other => (other, Vec::new()),
            };

            match decision {
                GuardDecision::Redirect(location) => {
                    debug!(path = req.path(), location, "guard redirect");
                    Ok(redirect(req, location))
                }
                GuardDecision::Proceed | GuardDecision::AttemptRefresh => {
                    proceed(&service, req, &set_cookies).await
                }
            }
        })
    }
}

fn redirect<B>(req: ServiceRequest, location: &'static str) -> ServiceResponse<EitherBody<B>> {
    let response = HttpResponse::TemporaryRedirect()
        .insert_header((LOCATION, location))
        .finish()
        .map_into_right_body();
    req.into_response(response)
}

async fn proceed<S, B>(
    service: &Rc<S>,
    mut req: ServiceRequest,
    set_cookies: &[String],
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
{
    if !set_cookies.is_empty() {
        forward_refreshed_cookies(&mut req, set_cookies);
    }
    let mut res = service.call(req).await?;
    for raw in set_cookies {
        match HeaderValue::from_str(raw) {
            Ok(value) => {
                res.headers_mut().append(SET_COOKIE, value);
            }
            Err(error) => warn!(%error, "dropping unencodable refreshed cookie"),
        }
    }
    Ok(res.map_into_left_body())
}

/// Rewrite the request `Cookie` header so the page handler sees the
/// refreshed session rather than the one the browser sent.
fn forward_refreshed_cookies(req: &mut ServiceRequest, set_cookies: &[String]) {
    let existing = req
        .headers()
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let header = merge_cookie_header(existing, set_cookies);
    if header.is_empty() {
        req.headers_mut().remove(COOKIE);
        return;
    }
    match HeaderValue::from_str(&header) {
        Ok(value) => {
            req.headers_mut().insert(COOKIE, value);
        }
        Err(error) => warn!(%error, "failed to rebuild cookie header after refresh"),
    }
}

fn merge_cookie_header(existing: &str, set_cookies: &[String]) -> String {
    let mut pairs = cookie_pairs(existing);
    for raw in set_cookies {
        let Some((name, value)) = raw
            .split(';')
            .next()
            .and_then(|pair| cookie_pairs(pair).into_iter().next())
        else {
            continue;
        };
        pairs.retain(|(key, _)| *key != name);
        if !value.is_empty() {
            pairs.push((name, value));
        }
    }
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
