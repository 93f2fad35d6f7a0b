//! The cart store: local truth, advisory server sync.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use lapshop_core::ProductId;

use crate::api::CartApi;
use crate::auth::TokenStore;
use crate::error::ApiError;
use crate::storage::{LocalStore, keys};
use crate::types::{CategoryRef, Product};

/// One line of the cart: a snapshot of the product's display fields plus
/// a quantity. `product_id` is unique within the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// Always at least 1; a line that would reach 0 is removed instead.
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub factory: Option<String>,
}

impl CartLine {
    /// Snapshot a product into a cart line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image: product.image.clone(),
            category: product.category.clone(),
            factory: product.factory.clone(),
        }
    }

    /// The line's contribution to the cart total.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The shopper's cart.
///
/// Local mutations always succeed and persist before any network
/// round-trip; when a session exists the matching server call follows,
/// and its failure is logged without touching the local state.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    lines: Mutex<Vec<CartLine>>,
    store: LocalStore,
    tokens: TokenStore,
    api: CartApi,
}

impl CartStore {
    /// Create the cart store, replaying any persisted lines.
    #[must_use]
    pub fn new(store: LocalStore, tokens: TokenStore, api: CartApi) -> Self {
        let lines: Vec<CartLine> = store.get(keys::CART).unwrap_or_default();
        Self {
            inner: Arc::new(CartInner {
                lines: Mutex::new(lines),
                store,
                tokens,
                api,
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the current lines.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().clone()
    }

    /// Total unit count, recomputed from the lines on every read.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lock().iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Total price, recomputed from the lines on every read.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lock().iter().map(CartLine::line_total).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`.
    ///
    /// A line already holding this product id has its quantity
    /// incremented (merge, not overwrite); otherwise a new snapshot line
    /// is inserted. The mutation always succeeds locally; with a session,
    /// an advisory `POST /cart/items` follows.
    #[instrument(skip(self, product), fields(product_id = %product.id, quantity))]
    pub async fn add_item(&self, product: &Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        {
            let mut lines = self.lock();
            if let Some(line) = lines.iter_mut().find(|l| l.product_id == product.id) {
                line.quantity = line.quantity.saturating_add(quantity);
            } else {
                lines.push(CartLine::from_product(product, quantity));
            }
            self.persist(&lines);
        }

        if self.inner.tokens.has_session() {
            if let Err(e) = self.inner.api.add_item(product.id, quantity).await {
                warn!(error = %e, "cart server sync failed, keeping local line");
            }
        }
    }

    /// Replace the quantity of the line holding `product_id`.
    ///
    /// A quantity of 0 behaves exactly like [`Self::remove_item`]. Server
    /// quantity sync is a known gap (the backend has no per-line update
    /// route), so this is local-only.
    pub fn update_quantity(&self, product_id: ProductId, quantity: u32) {
        let mut lines = self.lock();
        if quantity == 0 {
            lines.retain(|l| l.product_id != product_id);
        } else if let Some(line) = lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
        self.persist(&lines);
    }

    /// Remove the line holding `product_id`. Local-only, like quantity
    /// updates.
    pub fn remove_item(&self, product_id: ProductId) {
        let mut lines = self.lock();
        lines.retain(|l| l.product_id != product_id);
        self.persist(&lines);
    }

    /// Drop every line. With a session, also issues `DELETE /cart`.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        {
            let mut lines = self.lock();
            lines.clear();
            self.persist(&lines);
        }
        if self.inner.tokens.has_session() {
            if let Err(e) = self.inner.api.clear().await {
                warn!(error = %e, "server cart clear failed");
            }
        }
    }

    // =========================================================================
    // Server reconciliation
    // =========================================================================

    /// Fetch the authoritative server cart and overwrite local lines with
    /// its content - but only when it is non-empty. An empty server cart
    /// leaves the local state untouched, so a guest's pre-login cart is
    /// not silently wiped by an empty authenticated cart.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error; local state is untouched on failure.
    #[instrument(skip(self))]
    pub async fn load_from_server(&self) -> Result<(), ApiError> {
        let server_cart = self.inner.api.fetch().await?;
        if server_cart.items.is_empty() {
            debug!("server cart empty, keeping local lines");
            return Ok(());
        }

        let lines: Vec<CartLine> = server_cart
            .items
            .iter()
            .map(|item| CartLine::from_product(&item.product, item.quantity))
            .collect();

        let mut guard = self.lock();
        *guard = lines;
        self.persist(&guard);
        Ok(())
    }

    /// Push every local line to the server, one advisory add per line.
    /// Per-line failures are logged and skipped.
    #[instrument(skip(self))]
    pub async fn sync_to_server(&self) {
        let snapshot = self.lines();
        for line in snapshot {
            if let Err(e) = self
                .inner
                .api
                .add_item(line.product_id, line.quantity)
                .await
            {
                warn!(product_id = %line.product_id, error = %e, "line sync failed");
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartLine>> {
        self.inner
            .lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Write the full collection through to durable storage. Called under
    /// the line lock so persisted state never skips a mutation.
    fn persist(&self, lines: &[CartLine]) {
        self.inner.store.set(keys::CART, &lines);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_support::{guest_stack, product};

    fn cart(store: &LocalStore) -> CartStore {
        let (tokens, client) = guest_stack(store);
        CartStore::new(store.clone(), tokens, CartApi::new(client))
    }

    #[tokio::test]
    async fn test_add_merges_quantities_on_same_product() {
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        let laptop = product(1, "ThinkPad X1", 500);

        cart.add_item(&laptop, 2).await;
        cart.add_item(&laptop, 3).await;

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_update_quantity_zero_removes_line() {
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        cart.add_item(&product(1, "A", 500), 2).await;

        cart.update_quantity(ProductId::new(1), 0);
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity_replaces_not_merges() {
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        cart.add_item(&product(1, "A", 500), 2).await;

        cart.update_quantity(ProductId::new(1), 7);
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_totals_recompute_from_lines() {
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        cart.add_item(&product(1, "A", 500), 2).await;
        cart.add_item(&product(2, "B", 300), 1).await;

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::from(1300));
    }

    #[tokio::test]
    async fn test_every_mutation_persists() {
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        cart.add_item(&product(1, "A", 500), 2).await;

        // A second store over the same backend replays the persisted lines.
        let replayed = self::cart(&store);
        assert_eq!(replayed.lines(), cart.lines());

        cart.remove_item(ProductId::new(1));
        let replayed = self::cart(&store);
        assert!(replayed.is_empty());
    }

    #[tokio::test]
    async fn test_persisted_cart_roundtrip_is_lossless() {
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        let mut laptop = product(1, "ThinkPad X1", 25_000_000);
        laptop.image = Some("x1.png".to_string());
        laptop.factory = Some("Lenovo".to_string());
        cart.add_item(&laptop, 2).await;

        let reloaded: Vec<CartLine> = store.get(keys::CART).unwrap();
        assert_eq!(reloaded, cart.lines());
    }

    #[tokio::test]
    async fn test_guest_mutations_issue_no_server_calls() {
        // The guest stack points at an unroutable address; any server call
        // would surface as a long hang or error. Local mutations must not
        // touch it at all.
        let store = LocalStore::in_memory();
        let cart = cart(&store);
        cart.add_item(&product(1, "A", 500), 1).await;
        cart.update_quantity(ProductId::new(1), 3);
        cart.clear().await;
        assert!(cart.is_empty());
    }
}
