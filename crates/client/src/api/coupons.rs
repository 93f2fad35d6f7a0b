//! Coupon lookup.

use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::Coupon;

/// Coupon endpoints. Coupons are fetched read-only per checkout and never
/// persisted locally.
#[derive(Clone)]
pub struct CouponsApi {
    client: ApiClient,
}

impl CouponsApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /coupons/check?code=`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for an unknown code, with the backend's
    /// message.
    #[instrument(skip(self))]
    pub async fn check(&self, code: &str) -> Result<Coupon, ApiError> {
        let query = vec![("code".to_string(), code.to_string())];
        self.client.get_json("coupons/check", &query).await
    }
}
