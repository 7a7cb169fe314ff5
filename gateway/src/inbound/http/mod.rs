//! HTTP inbound adapter: the edge server's middleware and handlers.

pub mod guard;
pub mod health;
pub mod oauth;
pub mod pages;
pub mod trace;

pub use guard::RouteGuard;
pub use trace::{Trace, TraceMiddleware};
