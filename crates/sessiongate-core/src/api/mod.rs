//! Outbound request pipeline.
//!
//! `RequestAuthenticator` decorates every request with the session's bearer
//! credential; `ApiClient` composes it ahead of the `reqwest` transport so no
//! call can skip it.

pub mod authenticator;
pub mod client;
pub mod error;

pub use authenticator::{authorization_value, authorize_headers, RequestAuthenticator};
pub use client::ApiClient;
pub use error::ApiError;
