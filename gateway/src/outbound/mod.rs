//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **http**: reqwest-backed implementation of `HttpTransport`, used for
//!   backend API calls and for relaying page navigations.
//!
//! Adapters are thin translators between domain types and the wire. They
//! contain no business logic.

pub mod http;
