//! Product reviews.

use tracing::instrument;

use lapshop_core::ProductId;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::{Review, ReviewInput};

/// Review endpoints.
#[derive(Clone)]
pub struct ReviewsApi {
    client: ApiClient,
}

impl ReviewsApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /reviews/product/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn for_product(&self, product_id: ProductId) -> Result<Vec<Review>, ApiError> {
        self.client
            .get_json(&format!("reviews/product/{product_id}"), &[])
            .await
    }

    /// `POST /reviews`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the backend rejects the review
    /// (e.g., no purchase of the product).
    #[instrument(skip(self, input), fields(product_id = %input.product_id, rating = input.rating))]
    pub async fn create(&self, input: &ReviewInput) -> Result<Review, ApiError> {
        self.client.post_json("reviews", input).await
    }
}
