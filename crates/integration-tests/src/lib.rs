//! Integration tests for the LapShop client.
//!
//! Each test spins up [`TestBackend`], an in-process axum server that
//! speaks the LapShop REST dialect (enveloped JSON, bearer auth, JWT-ish
//! token rotation), and points a real client stack at it. No external
//! services are involved.
//!
//! ```bash
//! cargo test -p lapshop-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{delete, get, post};
use serde_json::{Value, json};
use url::Url;

use lapshop_client::config::ClientConfig;
use lapshop_client::http::{ApiClient, AuthApi};
use lapshop_client::storage::LocalStore;
use lapshop_client::auth::TokenStore;
use lapshop_client::LapShop;

/// Credentials the backend accepts.
pub const USERNAME: &str = "minh";
/// Password paired with [`USERNAME`].
pub const PASSWORD: &str = "secret";
/// Access token issued at startup and by a successful login.
pub const INITIAL_ACCESS: &str = "access-0";
/// Refresh token issued at startup and by a successful login.
pub const INITIAL_REFRESH: &str = "refresh-0";

type ApiResponse = (StatusCode, Json<Value>);

// =============================================================================
// Scripted state
// =============================================================================

/// Mutable script driving the fake backend's behavior.
struct Script {
    valid_access: String,
    valid_refresh: String,
    issued: usize,
    refresh_succeeds: bool,
    /// Every bearer-authenticated route answers 401, even with a token
    /// the refresh endpoint just minted.
    reject_all_bearer: bool,
    refresh_delay: Duration,
    products: Vec<Value>,
    cart_items: Vec<Value>,
    wishlist: Vec<Value>,
    wishlist_rejects: bool,
    bare_product_array: bool,
    last_list_query: Vec<(String, String)>,
    reject_order_message: Option<String>,
    coupon: Option<Value>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            valid_access: INITIAL_ACCESS.to_owned(),
            valid_refresh: INITIAL_REFRESH.to_owned(),
            issued: 0,
            refresh_succeeds: true,
            reject_all_bearer: false,
            refresh_delay: Duration::from_millis(25),
            products: Vec::new(),
            cart_items: Vec::new(),
            wishlist: Vec::new(),
            wishlist_rejects: false,
            bare_product_array: false,
            last_list_query: Vec::new(),
            reject_order_message: None,
            coupon: None,
        }
    }
}

/// Shared state of the fake backend: call counters plus the script.
pub struct BackendState {
    /// Calls to `POST /auth/refresh`, successful or not.
    pub refresh_calls: AtomicUsize,
    /// Calls to `POST /auth/login`.
    pub login_calls: AtomicUsize,
    /// Calls to `POST /orders`.
    pub order_calls: AtomicUsize,
    /// Calls to `POST /cart/items`.
    pub cart_add_calls: AtomicUsize,
    /// Calls to `GET /products/{id}`.
    pub product_get_calls: AtomicUsize,
    /// Calls to `DELETE /cart`.
    pub cart_clear_calls: AtomicUsize,
    script: Mutex<Script>,
}

#[allow(clippy::significant_drop_tightening)]
impl BackendState {
    fn new() -> Self {
        Self {
            refresh_calls: AtomicUsize::new(0),
            login_calls: AtomicUsize::new(0),
            order_calls: AtomicUsize::new(0),
            cart_add_calls: AtomicUsize::new(0),
            product_get_calls: AtomicUsize::new(0),
            cart_clear_calls: AtomicUsize::new(0),
            script: Mutex::new(Script::default()),
        }
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Invalidate the current access token without telling the client,
    /// as a server-side expiry would.
    pub fn expire_access(&self) {
        let mut script = self.script();
        script.issued += 1;
        script.valid_access = format!("access-{}", script.issued);
    }

    /// The access token the backend currently honors.
    pub fn current_access(&self) -> String {
        self.script().valid_access.clone()
    }

    /// Make `POST /auth/refresh` fail from now on.
    pub fn fail_refreshes(&self) {
        self.script().refresh_succeeds = false;
    }

    /// Answer 401 on every authenticated route, refreshed or not.
    pub fn reject_all_bearer_tokens(&self) {
        self.script().reject_all_bearer = true;
    }

    /// Widen or close the window during which concurrent callers pile up
    /// behind an in-flight refresh.
    pub fn set_refresh_delay(&self, delay: Duration) {
        self.script().refresh_delay = delay;
    }

    /// Replace the catalog.
    pub fn set_products(&self, products: Vec<Value>) {
        self.script().products = products;
    }

    /// The query string the most recent `GET /products` carried.
    #[must_use]
    pub fn last_list_query(&self) -> Vec<(String, String)> {
        self.script().last_list_query.clone()
    }

    /// Serve `GET /products` as a bare JSON array instead of a page.
    pub fn serve_bare_product_array(&self) {
        self.script().bare_product_array = true;
    }

    /// Replace the server-side cart with `(product, quantity)` lines.
    pub fn set_cart(&self, lines: Vec<(Value, u32)>) {
        self.script().cart_items = lines
            .into_iter()
            .map(|(product, quantity)| json!({ "product": product, "quantity": quantity }))
            .collect();
    }

    /// Replace the server-side wishlist.
    pub fn set_wishlist(&self, products: Vec<Value>) {
        self.script().wishlist = products;
    }

    /// Answer 500 on wishlist mutations.
    pub fn fail_wishlist_mutations(&self) {
        self.script().wishlist_rejects = true;
    }

    /// Reject `POST /orders` with the given message.
    pub fn reject_orders(&self, message: &str) {
        self.script().reject_order_message = Some(message.to_owned());
    }

    /// Serve one coupon from `GET /coupons/check`.
    pub fn set_coupon(&self, coupon: Value) {
        self.script().coupon = Some(coupon);
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiResponse> {
        let script = self.script();
        if script.reject_all_bearer {
            return Err(unauthorized());
        }
        let presented = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));
        if presented == Some(script.valid_access.as_str()) {
            Ok(())
        } else {
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> ApiResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Unauthorized" })),
    )
}

fn envelope(data: Value) -> ApiResponse {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": "OK", "data": data })),
    )
}

/// The profile issued for [`USERNAME`].
#[must_use]
pub fn minh_profile() -> Value {
    json!({
        "id": "7b0f8f7e-33aa-4f0b-9d21-0f1f4bfe9001",
        "username": USERNAME,
        "email": "minh@example.com",
        "fullName": "Minh Nguyen",
        "roles": [{ "name": "ROLE_USER" }],
    })
}

/// A catalog product in the backend's wire shape.
#[must_use]
pub fn product_json(id: i64, name: &str, price: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "quantity": 10,
        "factory": "Lenovo",
        "target": "gaming",
    })
}

// =============================================================================
// Handlers
// =============================================================================

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> ApiResponse {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if username != Some(USERNAME) || password != Some(PASSWORD) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Bad credentials" })),
        );
    }
    let mut script = state.script();
    script.valid_access = INITIAL_ACCESS.to_owned();
    script.valid_refresh = INITIAL_REFRESH.to_owned();
    drop(script);
    envelope(json!({
        "token": INITIAL_ACCESS,
        "refreshToken": INITIAL_REFRESH,
        "user": minh_profile(),
    }))
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> ApiResponse {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let (delay, ok) = {
        let script = state.script();
        let presented = body.get("refreshToken").and_then(Value::as_str);
        (
            script.refresh_delay,
            script.refresh_succeeds && presented == Some(script.valid_refresh.as_str()),
        )
    };
    tokio::time::sleep(delay).await;
    if !ok {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Refresh token invalid" })),
        );
    }
    let mut script = state.script();
    script.issued += 1;
    script.valid_access = format!("access-{}", script.issued);
    let token = script.valid_access.clone();
    drop(script);
    envelope(json!({ "token": token }))
}

async fn logout() -> ApiResponse {
    envelope(Value::Null)
}

async fn profile(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResponse {
    match state.authorize(&headers) {
        Ok(()) => envelope(minh_profile()),
        Err(rejection) => rejection,
    }
}

async fn list_products(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResponse {
    let mut script = state.script();
    script.last_list_query = params;
    if script.bare_product_array {
        return envelope(Value::Array(script.products.clone()));
    }
    envelope(json!({
        "content": script.products,
        "totalPages": 1,
        "totalElements": script.products.len(),
        "number": 0,
        "size": 20,
    }))
}

async fn get_product(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
) -> ApiResponse {
    state.product_get_calls.fetch_add(1, Ordering::SeqCst);
    let script = state.script();
    let found = script
        .products
        .iter()
        .find(|product| product.get("id").and_then(Value::as_i64) == Some(id));
    found.map_or_else(
        || {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "success": false, "message": "Product not found" })),
            )
        },
        |product| envelope(product.clone()),
    )
}

async fn get_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResponse {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let script = state.script();
    envelope(json!({ "id": 1, "items": script.cart_items }))
}

async fn add_cart_item(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResponse {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    state.cart_add_calls.fetch_add(1, Ordering::SeqCst);
    let product_id = body.get("productId").and_then(Value::as_i64).unwrap_or(0);
    let quantity = body.get("quantity").and_then(Value::as_u64).unwrap_or(1);
    let mut script = state.script();
    script.cart_items.push(json!({
        "product": product_json(product_id, "unnamed", 0),
        "quantity": quantity,
    }));
    drop(script);
    envelope(Value::Null)
}

async fn clear_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResponse {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    state.cart_clear_calls.fetch_add(1, Ordering::SeqCst);
    state.script().cart_items.clear();
    envelope(Value::Null)
}

async fn list_wishlist(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResponse {
    match state.authorize(&headers) {
        Ok(()) => envelope(Value::Array(state.script().wishlist.clone())),
        Err(rejection) => rejection,
    }
}

async fn add_wishlist(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResponse {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let mut script = state.script();
    if script.wishlist_rejects {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Wishlist unavailable" })),
        );
    }
    script.wishlist.push(product_json(id, "unnamed", 0));
    drop(script);
    envelope(Value::Null)
}

async fn remove_wishlist(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> ApiResponse {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    let mut script = state.script();
    if script.wishlist_rejects {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "message": "Wishlist unavailable" })),
        );
    }
    script
        .wishlist
        .retain(|product| product.get("id").and_then(Value::as_i64) != Some(id));
    drop(script);
    envelope(Value::Null)
}

async fn place_order(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> ApiResponse {
    if let Err(rejection) = state.authorize(&headers) {
        return rejection;
    }
    state.order_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(message) = state.script().reject_order_message.clone() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": message })),
        );
    }
    envelope(json!({ "id": 1, "status": "PENDING" }))
}

async fn my_orders(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> ApiResponse {
    match state.authorize(&headers) {
        Ok(()) => envelope(json!([])),
        Err(rejection) => rejection,
    }
}

async fn check_coupon(
    State(state): State<Arc<BackendState>>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> ApiResponse {
    let script = state.script();
    let requested = params.get("code").map(String::as_str);
    match &script.coupon {
        Some(coupon) if coupon.get("code").and_then(Value::as_str) == requested => {
            envelope(coupon.clone())
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Coupon not found" })),
        ),
    }
}

// =============================================================================
// Harness
// =============================================================================

/// An in-process LapShop backend bound to an ephemeral port.
pub struct TestBackend {
    addr: SocketAddr,
    /// Counters and script knobs shared with the running server.
    pub state: Arc<BackendState>,
}

impl TestBackend {
    /// Bind, spawn the server, and return the handle. The server lives
    /// until the runtime shuts down with the test.
    pub async fn spawn() -> Self {
        let state = Arc::new(BackendState::new());
        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/refresh", post(refresh))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/auth/profile", get(profile))
            .route("/api/v1/products", get(list_products))
            .route("/api/v1/products/{id}", get(get_product))
            .route("/api/v1/cart", get(get_cart).delete(clear_cart))
            .route("/api/v1/cart/items", post(add_cart_item))
            .route("/api/v1/wishlists", get(list_wishlist))
            .route(
                "/api/v1/wishlists/{id}",
                post(add_wishlist).delete(remove_wishlist),
            )
            .route("/api/v1/orders", post(place_order))
            .route("/api/v1/orders/my-orders", get(my_orders))
            .route("/api/v1/coupons/check", get(check_coupon))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Base URL, without the `/api/v1` suffix.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).unwrap()
    }

    /// A fully wired application root pointed at this backend, with
    /// in-memory state.
    #[must_use]
    pub fn shop(&self) -> LapShop {
        LapShop::new(ClientConfig::for_url(self.base_url())).unwrap()
    }

    /// The bare client stack, for tests that drive the interceptor
    /// directly.
    #[must_use]
    pub fn raw_stack(&self) -> (LocalStore, TokenStore, ApiClient) {
        let config = ClientConfig::for_url(self.base_url());
        let api_root = config.api_root().unwrap();
        let http = reqwest::Client::new();
        let store = LocalStore::in_memory();
        let tokens = TokenStore::new(store.clone());
        let auth = AuthApi::new(http.clone(), api_root.clone());
        let client = ApiClient::new(http, api_root, tokens.clone(), auth);
        (store, tokens, client)
    }
}

/// A client stack pointed at a port nothing listens on, for outage
/// behavior.
#[must_use]
pub fn unreachable_stack() -> (LocalStore, TokenStore, ApiClient) {
    let config = ClientConfig::for_url(Url::parse("http://127.0.0.1:9").unwrap());
    let api_root = config.api_root().unwrap();
    let http = reqwest::Client::new();
    let store = LocalStore::in_memory();
    let tokens = TokenStore::new(store.clone());
    let auth = AuthApi::new(http.clone(), api_root.clone());
    let client = ApiClient::new(http, api_root, tokens.clone(), auth);
    (store, tokens, client)
}

/// Seed a session whose access token the backend no longer honors but
/// whose refresh token it does.
pub fn seed_stale_session(backend: &TestBackend, tokens: &TokenStore) {
    tokens.set_access_token("stale-access");
    tokens.set_refresh_token(INITIAL_REFRESH);
    backend.state.expire_access();
}

/// Seed a session the backend honors as-is.
pub fn seed_live_session(tokens: &TokenStore) {
    tokens.set_access_token(INITIAL_ACCESS);
    tokens.set_refresh_token(INITIAL_REFRESH);
}
