//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use gateway::client::{ApiClient, ClientConfig, CookieJar};
use gateway::config::GatewaySettings;
use gateway::gateways::OAuthGateway;
use gateway::inbound::http::pages::PageForwarder;
use gateway::outbound::http::ReqwestTransport;

/// Everything the edge server needs, resolved from settings.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) api_client: ApiClient,
    pub(crate) oauth: OAuthGateway,
    pub(crate) pages: PageForwarder,
}

impl ServerConfig {
    /// Build transports, the API client, and the page forwarder.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when a reqwest client cannot be built.
    pub fn from_settings(settings: &GatewaySettings) -> std::io::Result<Self> {
        let timeout = settings.request_timeout();
        let api_transport = ReqwestTransport::new(timeout).map_err(|error| {
            std::io::Error::other(format!("failed to build API transport: {error}"))
        })?;
        let page_transport = ReqwestTransport::without_redirects(timeout).map_err(|error| {
            std::io::Error::other(format!("failed to build page transport: {error}"))
        })?;

        let api_client = ApiClient::new(
            ClientConfig::new(settings.api_url()),
            Arc::new(api_transport),
            Arc::new(CookieJar::new()),
        );
        let oauth = OAuthGateway::new(settings.api_url()).with_client_ids(
            settings.google_client_id.clone(),
            settings.github_client_id.clone(),
        );
        let pages =
            PageForwarder::new(settings.pages_origin(), Arc::new(page_transport)).with_timeout(timeout);

        Ok(Self {
            bind_addr: settings.bind_addr(),
            api_client,
            oauth,
            pages,
        })
    }
}
