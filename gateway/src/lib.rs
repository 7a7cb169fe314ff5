//! Authenticated API gateway for the kaiflow web application.
//!
//! Two halves share one domain:
//!
//! - the **client core** (`client`, `gateways`): a typed HTTP client that
//!   injects the session token, scopes calls to endpoint prefixes, and turns
//!   every failure into one [`domain::ApiError`] shape;
//! - the **route guard** (`inbound::http`): edge middleware that decides,
//!   per navigation, whether to render, redirect, or silently refresh the
//!   session first.

pub mod client;
pub mod config;
pub mod domain;
pub mod gateways;
pub mod inbound;
pub mod outbound;

pub use inbound::http::{RouteGuard, Trace};
