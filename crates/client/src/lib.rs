//! LapShop Client - headless SDK for the LapShop REST backend.
//!
//! All business logic of consequence (persistence, pricing, inventory,
//! authorization) lives in the backend; this crate is client-side state
//! orchestration: authenticated HTTP with a single-flight token refresh,
//! the session context, offline-first cart/wishlist stores, and typed
//! service facades for every endpoint.
//!
//! # Architecture
//!
//! - [`http`] - the plain/decorated client pair. The plain role talks to
//!   the credential endpoints; the decorated role attaches the bearer
//!   token and recovers from 401s with a single-flight refresh-and-retry.
//! - [`session`] - login/logout/register, state broadcast, the admin
//!   predicate.
//! - [`stores`] - cart, wishlist, recently-viewed, preferences. Local
//!   storage is authoritative; server sync is advisory.
//! - [`api`] - one typed service per backend resource.
//! - [`checkout`] - order placement with stock-error recovery and coupon
//!   math.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use lapshop_client::LapShop;
//! use secrecy::SecretString;
//!
//! let shop = LapShop::from_env()?;
//! shop.session().login("minh", &SecretString::from("hunter2")).await;
//! let page = shop.products().list(0, 12).await?;
//! if let Some(first) = page.content.first() {
//!     shop.cart().add_item(first, 1).await;
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod checkout;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod storage;
pub mod stores;
pub mod types;

use std::sync::Arc;

use thiserror::Error;

use crate::api::{
    AccountApi, AddressesApi, CartApi, CategoriesApi, CouponsApi, OrdersApi, PermissionsApi,
    ProductsApi, ReviewsApi, SettingsApi, UsersApi, WishlistsApi,
};
use crate::auth::TokenStore;
use crate::checkout::Checkout;
use crate::config::{ClientConfig, ConfigError};
use crate::http::{ApiClient, AuthApi};
use crate::session::Session;
use crate::storage::{FileBackend, LocalStore, MemoryBackend, StorageBackend};
use crate::stores::{CartStore, Preferences, RecentlyViewed, WishlistStore};

pub use crate::error::ApiError;
pub use crate::session::{AuthOutcome, SessionState};

/// Errors creating the application root.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuration was missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The state directory could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// The application root: one instance per logical client (one browser tab
/// worth of state), owning the session, the stores, and the services.
///
/// Everything hangs off shared handles, so `LapShop` is cheap to clone
/// and all clones observe the same state. Tests construct isolated
/// instances over in-memory storage; nothing here is a process-wide
/// global.
#[derive(Clone)]
pub struct LapShop {
    inner: Arc<LapShopInner>,
}

struct LapShopInner {
    config: ClientConfig,
    client: ApiClient,
    tokens: TokenStore,
    session: Session,
    cart: CartStore,
    wishlist: WishlistStore,
    recent: RecentlyViewed,
    prefs: Preferences,
    checkout: Checkout,
    account: AccountApi,
    products: ProductsApi,
    categories: CategoriesApi,
    orders: OrdersApi,
    coupons: CouponsApi,
    addresses: AddressesApi,
    reviews: ReviewsApi,
    users: UsersApi,
    permissions: PermissionsApi,
    settings: SettingsApi,
}

impl LapShop {
    /// Build the application root from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] for missing/invalid configuration or an
    /// unopenable state directory.
    pub fn from_env() -> Result<Self, SetupError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build the application root from explicit configuration.
    ///
    /// With a state directory configured, state persists in a JSON
    /// document there; otherwise it lives in memory for this run only.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the state directory cannot be opened or
    /// the API URL cannot form an endpoint root.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never
    /// happen under normal circumstances as we use standard TLS
    /// configuration.
    pub fn new(config: ClientConfig) -> Result<Self, SetupError> {
        let backend: Arc<dyn StorageBackend> = match &config.state_dir {
            Some(dir) => Arc::new(FileBackend::open(dir)?),
            None => Arc::new(MemoryBackend::new()),
        };
        let store = LocalStore::new(backend);
        let api_root = config.api_root()?;

        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to create HTTP client");

        let tokens = TokenStore::new(store.clone());
        // Two distinct client roles: the plain one issues the refresh
        // call, so the decorated one can never recurse into itself.
        let auth = AuthApi::new(http.clone(), api_root.clone());
        let client = ApiClient::new(http, api_root, tokens.clone(), auth);
        let session = Session::new(client.clone());

        let cart = CartStore::new(store.clone(), tokens.clone(), CartApi::new(client.clone()));
        let wishlist = WishlistStore::new(
            store.clone(),
            tokens.clone(),
            WishlistsApi::new(client.clone()),
        );
        let recent = RecentlyViewed::new(store.clone());
        let prefs = Preferences::new(store);

        let orders = OrdersApi::new(client.clone());
        let coupons = CouponsApi::new(client.clone());
        let checkout = Checkout::new(orders.clone(), coupons.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(LapShopInner {
                config,
                client: client.clone(),
                tokens,
                session,
                cart,
                wishlist,
                recent,
                prefs,
                checkout,
                account: AccountApi::new(client.clone()),
                products: ProductsApi::new(client.clone()),
                categories: CategoriesApi::new(client.clone()),
                orders,
                coupons,
                addresses: AddressesApi::new(client.clone()),
                reviews: ReviewsApi::new(client.clone()),
                users: UsersApi::new(client.clone()),
                permissions: PermissionsApi::new(client.clone()),
                settings: SettingsApi::new(client),
            }),
        })
    }

    /// Session start: hydrate the session optimistically, then reconcile
    /// the cart and wishlist with their server copies. Reconciliation
    /// failures are advisory and ignored - local state stands.
    pub async fn start(&self) {
        self.session().restore().await;
        if self.inner.tokens.has_session() {
            let _ = self.cart().load_from_server().await;
            let _ = self.wishlist().hydrate_from_server().await;
        }
    }

    /// The loaded configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Register a hook fired whenever the session expires irrecoverably
    /// (the refresh protocol gave up). The session state channel has
    /// already moved to `Anonymous` when hooks run.
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner.client.on_session_expired(hook);
    }

    /// The session context.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// The cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// The wishlist store.
    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    /// The recently-viewed list.
    #[must_use]
    pub fn recently_viewed(&self) -> &RecentlyViewed {
        &self.inner.recent
    }

    /// UI preferences.
    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.inner.prefs
    }

    /// The checkout flow.
    #[must_use]
    pub fn checkout(&self) -> &Checkout {
        &self.inner.checkout
    }

    /// Account endpoints (profile, password).
    #[must_use]
    pub fn account(&self) -> &AccountApi {
        &self.inner.account
    }

    /// Product catalog endpoints.
    #[must_use]
    pub fn products(&self) -> &ProductsApi {
        &self.inner.products
    }

    /// Category endpoints.
    #[must_use]
    pub fn categories(&self) -> &CategoriesApi {
        &self.inner.categories
    }

    /// Order endpoints.
    #[must_use]
    pub fn orders(&self) -> &OrdersApi {
        &self.inner.orders
    }

    /// Coupon endpoints.
    #[must_use]
    pub fn coupons(&self) -> &CouponsApi {
        &self.inner.coupons
    }

    /// Address-book endpoints.
    #[must_use]
    pub fn addresses(&self) -> &AddressesApi {
        &self.inner.addresses
    }

    /// Review endpoints.
    #[must_use]
    pub fn reviews(&self) -> &ReviewsApi {
        &self.inner.reviews
    }

    /// Admin user management.
    #[must_use]
    pub fn users(&self) -> &UsersApi {
        &self.inner.users
    }

    /// Admin permission management.
    #[must_use]
    pub fn permissions(&self) -> &PermissionsApi {
        &self.inner.permissions
    }

    /// Admin shop settings.
    #[must_use]
    pub fn settings(&self) -> &SettingsApi {
        &self.inner.settings
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for the unit tests.

    use rust_decimal::Decimal;
    use url::Url;

    use crate::auth::TokenStore;
    use crate::http::{ApiClient, AuthApi};
    use crate::storage::LocalStore;
    use crate::types::Product;

    /// A token store and decorated client over the given storage,
    /// pointing nowhere. Guest-path tests must never touch the network.
    pub fn guest_stack(store: &LocalStore) -> (TokenStore, ApiClient) {
        let tokens = TokenStore::new(store.clone());
        let http = reqwest::Client::new();
        let root: Url = "http://127.0.0.1:1/api/v1/"
            .parse()
            .expect("static test URL");
        let auth = AuthApi::new(http.clone(), root.clone());
        let client = ApiClient::new(http, root, tokens.clone(), auth);
        (tokens, client)
    }

    /// A product fixture with the given id, name, and whole-dong price.
    pub fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id: lapshop_core::ProductId::new(id),
            name: name.to_string(),
            price: Decimal::from(price),
            description: None,
            image: None,
            quantity: None,
            factory: None,
            target: None,
            category: None,
            sold: None,
            created_at: None,
        }
    }
}
