//! Endpoint gateways built on the client core.
//!
//! Each gateway holds a scoped client created once at construction and
//! exposes one typed method per backend endpoint.

mod auth;
mod oauth;
mod refresher;
mod review;

pub use auth::{
    AUTH_PREFIX, AuthGateway, LoginUserDto, MessageResponse, ResendOtpDto, SignupUserDto,
    VerifyUserDto,
};
pub use oauth::{OAuthGateway, OAuthProvider, UnknownProvider};
pub use refresher::GatewaySessionRefresher;
pub use review::{REVIEW_PREFIX, ReviewGateway, ReviewResponse};
