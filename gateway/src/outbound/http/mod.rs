//! HTTP adapters for the transport port.

mod reqwest_transport;

pub use reqwest_transport::ReqwestTransport;
