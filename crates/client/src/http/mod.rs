//! HTTP layer: the plain/decorated client pair.
//!
//! Two client roles, deliberately separate:
//!
//! - [`AuthApi`] - the plain role. Talks to the credential endpoints
//!   (`/auth/login`, `/auth/register`, `/auth/refresh`, password reset) on
//!   its own `reqwest::Client`. Never consults the token store and never
//!   retries, so the refresh call cannot recurse into the interceptor.
//! - [`ApiClient`] - the decorated role. Every other endpoint. Attaches the
//!   stored bearer token and recovers from token expiry with a
//!   single-flight refresh-and-retry protocol: concurrent 401s share one
//!   refresh call, every request is retried at most once, and an
//!   unrecoverable refresh clears the session and fires the registered
//!   session-expired hooks.

mod auth_api;
mod client;
mod request;
pub(crate) mod response;

pub use auth_api::{AuthApi, RefreshedTokens};
pub use client::ApiClient;
pub use request::{MultipartPart, RequestBody};
