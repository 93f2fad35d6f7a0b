//! Admin permission management.

use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::Permission;

/// Permission endpoints (admin).
#[derive(Clone)]
pub struct PermissionsApi {
    client: ApiClient,
}

impl PermissionsApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /permissions`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Permission>, ApiError> {
        self.client.get_json("permissions", &[]).await
    }

    /// `POST /permissions`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for duplicate permission names.
    #[instrument(skip(self, permission), fields(name = %permission.name))]
    pub async fn create(&self, permission: &Permission) -> Result<Permission, ApiError> {
        self.client.post_json("permissions", permission).await
    }

    /// `DELETE /permissions/{id}`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.client.delete_empty(&format!("permissions/{id}")).await
    }
}
