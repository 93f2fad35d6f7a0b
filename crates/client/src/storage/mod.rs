//! Durable per-client key-value storage.
//!
//! Everything the client persists between runs - tokens, the cached user
//! profile, cart lines, wishlist, recently-viewed products, theme - goes
//! through this layer as JSON-serialized string values, mirroring the
//! per-origin storage of a browser client.
//!
//! Two backends: [`MemoryBackend`] (default, used by tests and ephemeral
//! sessions) and [`FileBackend`] (one JSON document under a state
//! directory, written through on every change). Storage corruption is
//! never fatal: an unreadable file starts empty, and a value that fails to
//! parse is removed and treated as absent.

mod backend;
mod local_store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend};
pub use local_store::LocalStore;

/// Storage keys used by the client. Collected here so no two subsystems
/// can collide on a key.
pub mod keys {
    /// Access token (bearer credential).
    pub const TOKEN: &str = "token";
    /// Refresh token.
    pub const REFRESH_TOKEN: &str = "refreshToken";
    /// Cached user profile.
    pub const USER: &str = "user";
    /// Cart line collection.
    pub const CART: &str = "cart";
    /// Wishlist collection.
    pub const WISHLIST: &str = "wishlist";
    /// Bounded recently-viewed products list.
    pub const RECENT_VIEWS: &str = "recentViews";
    /// Theme preference.
    pub const THEME: &str = "theme";
}
