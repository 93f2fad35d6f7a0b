//! Session credentials: durable token storage and access-token claims.

mod claims;
mod tokens;

pub use claims::TokenClaims;
pub use tokens::TokenStore;
