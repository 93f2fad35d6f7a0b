//! Saved delivery addresses.

use reqwest::Method;
use tracing::instrument;

use lapshop_core::AddressId;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody};
use crate::types::{Address, AddressInput};

/// Address-book endpoints.
#[derive(Clone)]
pub struct AddressesApi {
    client: ApiClient,
}

impl AddressesApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /addresses`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Address>, ApiError> {
        self.client.get_json("addresses", &[]).await
    }

    /// `POST /addresses`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: &AddressInput) -> Result<Address, ApiError> {
        self.client.post_json("addresses", input).await
    }

    /// `PUT /addresses/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: AddressId, input: &AddressInput) -> Result<Address, ApiError> {
        self.client.put_json(&format!("addresses/{id}"), input).await
    }

    /// `DELETE /addresses/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: AddressId) -> Result<(), ApiError> {
        self.client.delete_empty(&format!("addresses/{id}")).await
    }

    /// `PUT /addresses/{id}/default` - mark as the default address.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn set_default(&self, id: AddressId) -> Result<(), ApiError> {
        self.client
            .execute_empty(
                Method::PUT,
                &format!("addresses/{id}/default"),
                &[],
                RequestBody::Empty,
            )
            .await
    }
}
