//! Gateway configuration loaded via OrthoConfig.
//!
//! Every value may come from the command line, a config file, or a
//! `KAIFLOW_`-prefixed environment variable. Unset values take the
//! defaults declared on each field.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_PAGES_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_pages_origin() -> String {
    DEFAULT_PAGES_ORIGIN.to_owned()
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(DEFAULT_BIND_ADDR)
}

/// Configuration for the edge server and its API client.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KAIFLOW")]
pub struct GatewaySettings {
    /// Backend API root, without the `/api` suffix.
    #[ortho_config(default = default_api_url())]
    pub api_url: String,
    /// Public Google OAuth client id.
    pub google_client_id: Option<String>,
    /// Public GitHub OAuth client id.
    pub github_client_id: Option<String>,
    /// Upstream that renders pages once the guard lets a navigation through.
    #[ortho_config(default = default_pages_origin())]
    pub pages_origin: String,
    /// Socket address the edge server listens on.
    #[ortho_config(default = default_bind_addr())]
    pub bind_addr: SocketAddr,
    /// Timeout applied to page forwarding and session refresh calls.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl GatewaySettings {
    /// Backend API root. A blank override counts as unset.
    pub fn api_url(&self) -> &str {
        non_blank(&self.api_url).unwrap_or(DEFAULT_API_URL)
    }

    /// Page renderer origin with trailing slashes removed.
    pub fn pages_origin(&self) -> &str {
        non_blank(&self.pages_origin)
            .unwrap_or(DEFAULT_PAGES_ORIGIN)
            .trim_end_matches('/')
    }

    /// Listen address.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Outbound request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    Some(value).filter(|raw| !raw.trim().is_empty())
}
