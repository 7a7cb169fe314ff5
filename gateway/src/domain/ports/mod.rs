//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`HttpTransport`, `CookieStore`) are implemented by outbound
//! adapters; the driving `SessionRefresher` port is called by the route guard.

mod macros;

mod cookie_store;
mod http_transport;
mod session_refresher;

#[cfg(test)]
pub use cookie_store::MockCookieStore;
pub use cookie_store::CookieStore;
#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{
    HttpMethod, HttpTransport, MultipartPart, RequestBody, TransportError, TransportRequest,
    TransportResponse,
};
#[cfg(test)]
pub use session_refresher::MockSessionRefresher;
pub use session_refresher::{RefreshedSession, SessionRefresher};
