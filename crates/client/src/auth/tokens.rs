//! Durable storage of the session credentials.

use crate::storage::{LocalStore, keys};
use crate::types::UserProfile;

/// Cloneable handle over the persisted session: access token, refresh
/// token, and cached user profile.
///
/// Reads go to storage on every call - the durable copy is the source of
/// truth, so a token refreshed by one component is immediately visible to
/// every other holder of this handle.
#[derive(Clone)]
pub struct TokenStore {
    store: LocalStore,
}

impl TokenStore {
    /// Wrap a local store.
    #[must_use]
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// The current access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.store.get_raw(keys::TOKEN)
    }

    /// Store a new access token.
    pub fn set_access_token(&self, token: &str) {
        self.store.set_raw(keys::TOKEN, token);
    }

    /// The current refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.store.get_raw(keys::REFRESH_TOKEN)
    }

    /// Store a new refresh token.
    pub fn set_refresh_token(&self, token: &str) {
        self.store.set_raw(keys::REFRESH_TOKEN, token);
    }

    /// The cached user profile, if any. A corrupt stored profile is
    /// discarded and reported as absent.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.store.get(keys::USER)
    }

    /// Cache the user profile.
    pub fn set_user(&self, user: &UserProfile) {
        self.store.set(keys::USER, user);
    }

    /// Whether a session exists (an access token is stored).
    #[must_use]
    pub fn has_session(&self) -> bool {
        self.access_token().is_some()
    }

    /// Remove the access token, refresh token, and cached profile.
    pub fn clear_session(&self) {
        self.store.remove(keys::TOKEN);
        self.store.remove(keys::REFRESH_TOKEN);
        self.store.remove(keys::USER);
    }
}
