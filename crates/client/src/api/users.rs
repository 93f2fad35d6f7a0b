//! Admin user management.

use tracing::instrument;

use lapshop_core::UserId;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::{UserInput, UserProfile};

/// User management endpoints (admin).
#[derive(Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /users`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UserProfile>, ApiError> {
        self.client.get_json("users", &[]).await
    }

    /// `POST /users`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for validation failures (duplicate
    /// username, unknown role).
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: &UserInput) -> Result<UserProfile, ApiError> {
        self.client.post_json("users", input).await
    }

    /// `PUT /users/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: UserId, input: &UserInput) -> Result<UserProfile, ApiError> {
        self.client.put_json(&format!("users/{id}"), input).await
    }

    /// `DELETE /users/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        self.client.delete_empty(&format!("users/{id}")).await
    }
}
