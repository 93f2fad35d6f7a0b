//! Admin shop settings.

use tracing::instrument;

use crate::error::ApiError;
use crate::http::ApiClient;
use crate::types::ShopSettings;

/// Shop-settings endpoints (admin).
#[derive(Clone)]
pub struct SettingsApi {
    client: ApiClient,
}

impl SettingsApi {
    /// Create the service over the decorated client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `GET /admin/settings`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<ShopSettings, ApiError> {
        self.client.get_json("admin/settings", &[]).await
    }

    /// `PUT /admin/settings`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network or backend failure.
    #[instrument(skip(self, settings))]
    pub async fn update(&self, settings: &ShopSettings) -> Result<ShopSettings, ApiError> {
        self.client.put_json("admin/settings", settings).await
    }
}
