//! Server-side cart endpoints, called advisorily by the cart store.

use reqwest::Method;
use tracing::instrument;

use lapshop_core::ProductId;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody};
use crate::types::{AddCartItemRequest, ServerCart};

/// Cart endpoints.
#[derive(Clone)]
pub struct CartApi {
    client: ApiClient,
}

impl CartApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /cart` - the authoritative server cart.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<ServerCart, ApiError> {
        self.client.get_json("cart", &[]).await
    }

    /// `POST /cart/items`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn add_item(&self, product_id: ProductId, quantity: u32) -> Result<(), ApiError> {
        let body = RequestBody::json(&AddCartItemRequest {
            product_id,
            quantity,
        })?;
        self.client
            .execute_empty(Method::POST, "cart/items", &[], body)
            .await
    }

    /// `DELETE /cart`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ApiError> {
        self.client.delete_empty("cart").await
    }
}
