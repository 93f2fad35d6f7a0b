//! Server-side wishlist endpoints.

use reqwest::Method;
use tracing::instrument;

use lapshop_core::ProductId;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody};
use crate::types::Product;

/// Wishlist endpoints.
#[derive(Clone)]
pub struct WishlistsApi {
    client: ApiClient,
}

impl WishlistsApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /wishlists` - the account's wishlist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.client.get_json("wishlists", &[]).await
    }

    /// `POST /wishlists/{productId}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn add(&self, product_id: ProductId) -> Result<(), ApiError> {
        self.client
            .execute_empty(
                Method::POST,
                &format!("wishlists/{product_id}"),
                &[],
                RequestBody::Empty,
            )
            .await
    }

    /// `DELETE /wishlists/{productId}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) -> Result<(), ApiError> {
        self.client
            .delete_empty(&format!("wishlists/{product_id}"))
            .await
    }

    /// `GET /wishlists/check/{productId}` - server-side membership check.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn check(&self, product_id: ProductId) -> Result<bool, ApiError> {
        self.client
            .get_json(&format!("wishlists/check/{product_id}"), &[])
            .await
    }
}
