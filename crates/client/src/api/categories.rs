//! Category service.

use std::time::Duration;

use moka::future::Cache;
use tracing::instrument;

use lapshop_core::CategoryId;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::{Category, CategoryInput};

/// Category endpoints; the listing is cached for 5 minutes and
/// invalidated by admin mutations.
#[derive(Clone)]
pub struct CategoriesApi {
    client: ApiClient,
    list_cache: Cache<(), Vec<Category>>,
}

impl CategoriesApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            list_cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(Duration::from_secs(300))
                .build(),
        }
    }

    /// `GET /categories`, cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(cached) = self.list_cache.get(&()).await {
            return Ok(cached);
        }
        let categories: Vec<Category> = self.client.get_json("categories", &[]).await?;
        self.list_cache.insert((), categories.clone()).await;
        Ok(categories)
    }

    /// `GET /categories/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn get(&self, id: CategoryId) -> Result<Category, ApiError> {
        self.client.get_json(&format!("categories/{id}"), &[]).await
    }

    /// `POST /categories` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let created: Category = self.client.post_json("categories", input).await?;
        self.list_cache.invalidate_all();
        Ok(created)
    }

    /// `PUT /categories/{id}` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: CategoryId, input: &CategoryInput) -> Result<Category, ApiError> {
        let updated: Category = self
            .client
            .put_json(&format!("categories/{id}"), input)
            .await?;
        self.list_cache.invalidate_all();
        Ok(updated)
    }

    /// `DELETE /categories/{id}` (admin).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), ApiError> {
        self.client.delete_empty(&format!("categories/{id}")).await?;
        self.list_cache.invalidate_all();
        Ok(())
    }
}
