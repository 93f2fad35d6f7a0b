//! Authenticated account endpoints.
//!
//! These run on the decorated client (unlike login/register/refresh,
//! which belong to the plain role): they need bearer auth and benefit
//! from the refresh protocol.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestBody};
use crate::types::{UpdateProfileRequest, UserProfile};

/// Account endpoints.
#[derive(Clone)]
pub struct AccountApi {
    client: ApiClient,
}

impl AccountApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.client.get_json("auth/profile", &[]).await
    }

    /// `PUT /auth/profile`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        request: &UpdateProfileRequest,
    ) -> Result<UserProfile, ApiError> {
        self.client.put_json("auth/profile", request).await
    }

    /// `POST /auth/change-password`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` when the old password is rejected.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), ApiError> {
        let body = RequestBody::Json(json!({
            "oldPassword": old_password.expose_secret(),
            "newPassword": new_password.expose_secret(),
        }));
        self.client
            .execute_empty(reqwest::Method::POST, "auth/change-password", &[], body)
            .await
    }
}
