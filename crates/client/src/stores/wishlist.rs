//! The wishlist store: optimistic toggle, no rollback.

use std::sync::{Arc, Mutex};

use tracing::{instrument, warn};

use lapshop_core::ProductId;

use crate::api::WishlistsApi;
use crate::auth::TokenStore;
use crate::error::ApiError;
use crate::storage::{LocalStore, keys};
use crate::types::Product;

/// The shopper's wishlist: product snapshots, unique by product id,
/// persisted locally regardless of session.
#[derive(Clone)]
pub struct WishlistStore {
    inner: Arc<WishlistInner>,
}

struct WishlistInner {
    entries: Mutex<Vec<Product>>,
    store: LocalStore,
    tokens: TokenStore,
    api: WishlistsApi,
}

impl WishlistStore {
    /// Create the wishlist store, replaying any persisted entries.
    #[must_use]
    pub fn new(store: LocalStore, tokens: TokenStore, api: WishlistsApi) -> Self {
        let entries: Vec<Product> = store.get(keys::WISHLIST).unwrap_or_default();
        Self {
            inner: Arc::new(WishlistInner {
                entries: Mutex::new(entries),
                store,
                tokens,
                api,
            }),
        }
    }

    /// Snapshot of the current entries.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.lock().clone()
    }

    /// Whether `product_id` is wished for.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lock().iter().any(|p| p.id == product_id)
    }

    /// Flip membership of `product`, locally first. Returns whether the
    /// product is present after the toggle.
    ///
    /// With a session, the matching server add/remove follows; its
    /// failure leaves the optimistic local state as-is.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, product: &Product) -> bool {
        let added = {
            let mut entries = self.lock();
            let was_present = entries.iter().any(|p| p.id == product.id);
            if was_present {
                entries.retain(|p| p.id != product.id);
            } else {
                entries.push(product.clone());
            }
            self.persist(&entries);
            !was_present
        };

        if self.inner.tokens.has_session() {
            let result = if added {
                self.inner.api.add(product.id).await
            } else {
                self.inner.api.remove(product.id).await
            };
            if let Err(e) = result {
                warn!(error = %e, "wishlist server sync failed, keeping local state");
            }
        }

        added
    }

    /// Remove `product_id`, locally first, with the advisory server call
    /// when a session exists.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: ProductId) {
        {
            let mut entries = self.lock();
            entries.retain(|p| p.id != product_id);
            self.persist(&entries);
        }
        if self.inner.tokens.has_session() {
            if let Err(e) = self.inner.api.remove(product_id).await {
                warn!(error = %e, "wishlist server remove failed");
            }
        }
    }

    /// Drop every entry locally.
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries);
    }

    /// Replace the local list with the server's copy.
    ///
    /// Unlike the cart, any successful response replaces local state,
    /// including an empty one - the server wishlist is per-account, and
    /// hydration happens right after login.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error; local state is untouched on failure.
    #[instrument(skip(self))]
    pub async fn hydrate_from_server(&self) -> Result<(), ApiError> {
        let server_items = self.inner.api.list().await?;
        let mut entries = self.lock();
        *entries = server_items;
        self.persist(&entries);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Product>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn persist(&self, entries: &[Product]) {
        self.inner.store.set(keys::WISHLIST, &entries);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{guest_stack, product};

    fn wishlist(store: &LocalStore) -> WishlistStore {
        let (tokens, client) = guest_stack(store);
        WishlistStore::new(store.clone(), tokens, WishlistsApi::new(client))
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let store = LocalStore::in_memory();
        let wishlist = wishlist(&store);
        let laptop = product(1, "ThinkPad X1", 500);

        assert!(wishlist.toggle(&laptop).await);
        assert!(wishlist.contains(ProductId::new(1)));

        assert!(!wishlist.toggle(&laptop).await);
        assert!(!wishlist.contains(ProductId::new(1)));
    }

    #[tokio::test]
    async fn test_toggle_is_unique_by_product_id() {
        let store = LocalStore::in_memory();
        let wishlist = wishlist(&store);

        wishlist.toggle(&product(1, "A", 500)).await;
        // Same id, different snapshot fields: still a removal.
        wishlist.toggle(&product(1, "A (renamed)", 600)).await;
        assert!(wishlist.items().is_empty());
    }

    #[tokio::test]
    async fn test_persists_across_reload() {
        let store = LocalStore::in_memory();
        let wishlist = wishlist(&store);
        wishlist.toggle(&product(3, "Aspire", 300)).await;

        let replayed = self::wishlist(&store);
        assert!(replayed.contains(ProductId::new(3)));
    }
}
