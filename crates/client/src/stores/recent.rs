//! Bounded recently-viewed products list.

use std::sync::{Arc, Mutex};

use lapshop_core::ProductId;

use crate::storage::{LocalStore, keys};
use crate::types::Product;

/// How many products the list retains.
const CAPACITY: usize = 10;

/// Most-recently-first list of viewed products, deduplicated by product
/// id, capped at 10, persisted under `recentViews`.
#[derive(Clone)]
pub struct RecentlyViewed {
    inner: Arc<RecentInner>,
}

struct RecentInner {
    items: Mutex<Vec<Product>>,
    store: LocalStore,
}

impl RecentlyViewed {
    /// Create the list, replaying any persisted entries.
    #[must_use]
    pub fn new(store: LocalStore) -> Self {
        let items: Vec<Product> = store.get(keys::RECENT_VIEWS).unwrap_or_default();
        Self {
            inner: Arc::new(RecentInner {
                items: Mutex::new(items),
                store,
            }),
        }
    }

    /// Record a product view: remove any previous entry with the same id,
    /// insert at the front, trim to capacity, persist.
    pub fn push(&self, product: &Product) {
        let mut items = self.lock();
        items.retain(|p| p.id != product.id);
        items.insert(0, product.clone());
        items.truncate(CAPACITY);
        self.inner.store.set(keys::RECENT_VIEWS, &*items);
    }

    /// Snapshot, most recent first.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.lock().clone()
    }

    /// Whether `product_id` is in the list.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.lock().iter().any(|p| p.id == product_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Product>> {
        self.inner
            .items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::product;

    #[test]
    fn test_push_front_inserts_and_dedupes() {
        let recent = RecentlyViewed::new(LocalStore::in_memory());
        recent.push(&product(1, "A", 100));
        recent.push(&product(2, "B", 200));
        recent.push(&product(1, "A", 100));

        let ids: Vec<i64> = recent.items().iter().map(|p| p.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let recent = RecentlyViewed::new(LocalStore::in_memory());
        for i in 0..15 {
            recent.push(&product(i, "P", 100));
        }
        let items = recent.items();
        assert_eq!(items.len(), 10);
        // Most recent first; the oldest five fell off.
        assert_eq!(items[0].id.as_i64(), 14);
        assert!(!recent.contains(ProductId::new(4)));
    }

    #[test]
    fn test_persists_across_reload() {
        let store = LocalStore::in_memory();
        let recent = RecentlyViewed::new(store.clone());
        recent.push(&product(9, "X", 100));

        let replayed = RecentlyViewed::new(store);
        assert!(replayed.contains(ProductId::new(9)));
    }
}
