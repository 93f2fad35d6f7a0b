//! The decorated client role: bearer injection and single-flight
//! refresh-and-retry on 401.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::TokenStore;
use crate::error::ApiError;

use super::auth_api::AuthApi;
use super::request::RequestBody;
use super::response;

/// Callback fired when the session is irrecoverably lost - the SDK's
/// analog of forced navigation to the login page.
type SessionExpiredHook = Box<dyn Fn() + Send + Sync>;

/// Single-flight refresh gate.
///
/// The mutex serializes would-be refreshers; the generation counter tells
/// a waiter whether the refresh it queued behind already happened. A
/// request samples the generation before dispatch, so a 401 answered by an
/// old token finds the generation moved and reuses the new token instead
/// of refreshing again.
struct RefreshGate {
    lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
}

/// Authenticated client for everything outside the credential endpoints.
///
/// Cheaply cloneable; all clones share one token store, one refresh gate,
/// and one set of session-expired hooks.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    api_root: Url,
    tokens: TokenStore,
    auth: AuthApi,
    gate: RefreshGate,
    expired_hooks: std::sync::Mutex<Vec<SessionExpiredHook>>,
}

impl ApiClient {
    /// Create the decorated client role.
    ///
    /// `auth` must be the plain role sharing the same token store - the
    /// refresh call is always issued through it, never through `self`.
    #[must_use]
    pub fn new(http: reqwest::Client, api_root: Url, tokens: TokenStore, auth: AuthApi) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http,
                api_root,
                tokens,
                auth,
                gate: RefreshGate {
                    lock: tokio::sync::Mutex::new(()),
                    generation: AtomicU64::new(0),
                },
                expired_hooks: std::sync::Mutex::new(Vec::new()),
            }),
        }
    }

    /// The token store shared with this client.
    #[must_use]
    pub fn tokens(&self) -> &TokenStore {
        &self.inner.tokens
    }

    /// The plain client role this client refreshes through.
    #[must_use]
    pub fn auth(&self) -> &AuthApi {
        &self.inner.auth
    }

    /// Register a hook fired whenever the session expires irrecoverably.
    pub fn on_session_expired(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.inner
            .expired_hooks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Box::new(hook));
    }

    // =========================================================================
    // Typed execution
    // =========================================================================

    /// Execute a request and decode the enveloped JSON response.
    ///
    /// # Errors
    ///
    /// `ApiError::Http` for transport failures (never retried here),
    /// `ApiError::Status` for non-success statuses other than 401, and
    /// `ApiError::SessionExpired` when the refresh protocol gives up.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(method, path, query, &body).await?;
        response::decode_json(response).await
    }

    /// Execute a request whose response body the caller does not need.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::execute`].
    pub async fn execute_empty(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: RequestBody,
    ) -> Result<(), ApiError> {
        let response = self.dispatch(method, path, query, &body).await?;
        response::expect_success(response).await
    }

    /// Execute a request and return the raw response bytes (file
    /// downloads, spreadsheet templates).
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Self::execute`].
    pub async fn execute_bytes(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
    ) -> Result<Vec<u8>, ApiError> {
        let response = self
            .dispatch(method, path, query, &RequestBody::Empty)
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(response::status_error(status.as_u16(), &body));
        }
        Ok(response.bytes().await?.to_vec())
    }

    // Convenience wrappers used by the service modules.

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ApiError> {
        self.execute(Method::GET, path, query, RequestBody::Empty)
            .await
    }

    pub(crate) async fn post_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::POST, path, &[], RequestBody::json(body)?)
            .await
    }

    pub(crate) async fn put_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(Method::PUT, path, &[], RequestBody::json(body)?)
            .await
    }

    pub(crate) async fn delete_empty(&self, path: &str) -> Result<(), ApiError> {
        self.execute_empty(Method::DELETE, path, &[], RequestBody::Empty)
            .await
    }

    // =========================================================================
    // Dispatch and the refresh protocol
    // =========================================================================

    /// Send a request, running the single-flight refresh-and-retry
    /// protocol on a 401. Returns any non-401 response unchanged.
    #[instrument(skip(self, query, body), fields(%method, path))]
    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: &RequestBody,
    ) -> Result<reqwest::Response, ApiError> {
        // Sample the generation before reading the token, so a refresh
        // completing between the two is detected, not repeated.
        let sampled = self.inner.gate.generation.load(Ordering::Acquire);
        let response = self.send_once(method.clone(), path, query, body).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path, "401 received, entering refresh gate");
        self.refresh_or_reuse(sampled).await?;

        // Exactly one retry, with the post-refresh token.
        let retry = self.send_once(method, path, query, body).await?;
        if retry.status() == StatusCode::UNAUTHORIZED {
            warn!(path, "retried request rejected again, session is gone");
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }
        Ok(retry)
    }

    /// Enter the refresh gate. The caller that still sees its sampled
    /// generation performs the refresh; everyone queued behind it reuses
    /// the outcome.
    async fn refresh_or_reuse(&self, sampled: u64) -> Result<(), ApiError> {
        let gate = &self.inner.gate;
        let _guard = gate.lock.lock().await;

        if gate.generation.load(Ordering::Acquire) != sampled {
            // A sibling already refreshed while we queued; its token is in
            // the store, ready for our retry.
            debug!("refresh already performed by a concurrent request");
            return Ok(());
        }

        let Some(refresh_token) = self.inner.tokens.refresh_token() else {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        };

        match self.inner.auth.refresh(&refresh_token).await {
            Ok(refreshed) => {
                self.inner.tokens.set_access_token(&refreshed.token);
                if let Some(rotated) = refreshed.refresh_token {
                    self.inner.tokens.set_refresh_token(&rotated);
                }
                gate.generation.fetch_add(1, Ordering::AcqRel);
                debug!("access token refreshed");
                Ok(())
            }
            Err(e) => {
                // A broken refresh token cannot self-heal: no retry, no
                // backoff. Clearing inside the gate means every queued
                // waiter finds no refresh token and fails fast instead of
                // issuing a second refresh call.
                warn!(error = %e, "token refresh failed, clearing session");
                self.expire_session();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Build and send one attempt. The stored token is read at build time,
    /// so a retry after refresh picks up the new one.
    async fn send_once(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: &RequestBody,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self
            .inner
            .api_root
            .join(path)
            .map_err(|e| ApiError::Url(e.to_string()))?;

        let mut request = self.inner.http.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = self.inner.tokens.access_token() {
            request = request.bearer_auth(token);
        }
        request = match body {
            RequestBody::Empty => request,
            RequestBody::Json(value) => request.json(value),
            RequestBody::Form(pairs) => request.form(pairs),
            // Multipart keeps its boundary content type; it must never be
            // forced to JSON.
            RequestBody::Multipart(parts) => request.multipart(RequestBody::to_multipart_form(parts)),
        };

        Ok(request.send().await?)
    }

    /// Clear all session state and fire the session-expired hooks.
    fn expire_session(&self) {
        self.inner.tokens.clear_session();
        let hooks = self
            .inner
            .expired_hooks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for hook in hooks.iter() {
            hook();
        }
    }
}
