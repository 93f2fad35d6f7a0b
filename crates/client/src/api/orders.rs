//! Order endpoints.

use tracing::instrument;

use lapshop_core::{OrderId, OrderStatus};

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::http::response::decode_page;
use crate::types::{Order, OrderRequest, Page};

/// Order endpoints, shopper and admin sides.
#[derive(Clone)]
pub struct OrdersApi {
    client: ApiClient,
}

impl OrdersApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /orders` - place an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with the backend's message for domain
    /// rejections (insufficient stock, invalid coupon).
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn place(&self, request: &OrderRequest) -> Result<Order, ApiError> {
        self.client.post_json("orders", request).await
    }

    /// `GET /orders/my-orders` - the caller's order history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.client.get_json("orders/my-orders", &[]).await
    }

    /// `GET /orders` (admin) - paged listing of all orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, size: u64) -> Result<Page<Order>, ApiError> {
        let query = vec![
            ("page".to_string(), page.to_string()),
            ("size".to_string(), size.to_string()),
        ];
        let value: serde_json::Value = self.client.get_json("orders", &query).await?;
        decode_page(value)
    }

    /// `GET /orders/status/{status}` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn by_status(&self, status: OrderStatus) -> Result<Vec<Order>, ApiError> {
        self.client
            .get_json(&format!("orders/status/{status}"), &[])
            .await
    }

    /// `PUT /orders/{id}/status?status=` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<Order, ApiError> {
        let query = vec![("status".to_string(), status.to_string())];
        self.client
            .execute(
                reqwest::Method::PUT,
                &format!("orders/{id}/status"),
                &query,
                crate::http::RequestBody::Empty,
            )
            .await
    }
}
