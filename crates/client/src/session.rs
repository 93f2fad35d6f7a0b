//! Session and identity context.
//!
//! Single source of truth for "who is logged in" and "are they an
//! administrator". State transitions are broadcast over a watch channel
//! (`Anonymous → Authenticating → Authenticated`, back to `Anonymous` on
//! logout or irrecoverable expiry), and the admin predicate reconciles the
//! token claims, the cached profile, and a legacy username fallback with a
//! defined precedence.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::auth::{TokenClaims, TokenStore};
use crate::error::ApiError;
use crate::http::{ApiClient, AuthApi};
use crate::types::{RegisterRequest, UserProfile};

/// Admin markers accepted in token authorities and profile roles.
const ADMIN_MARKERS: [&str; 2] = ["ROLE_ADMIN", "ADMIN"];

/// Reserved username treated as admin by the final fallback.
const RESERVED_ADMIN_USERNAME: &str = "admin";

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// No session.
    #[default]
    Anonymous,
    /// A login call is in flight.
    Authenticating,
    /// Logged in as the carried profile.
    Authenticated(UserProfile),
}

impl SessionState {
    /// The profile, when authenticated.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Discriminated login/register outcome. These operations never return
/// `Err` to the caller - a rejected call is a `Failure` with the backend's
/// message.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// The operation succeeded.
    Success(UserProfile),
    /// The operation was rejected; `message` is user-facing.
    Failure {
        /// Message extracted from the backend response (or the transport
        /// error, for offline failures).
        message: String,
    },
}

impl AuthOutcome {
    /// Whether this outcome is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Cloneable session context.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    tokens: TokenStore,
    auth: AuthApi,
    client: ApiClient,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Create the session context over the client pair.
    ///
    /// Wires the decorated client's session-expired hooks into the state
    /// channel, so a failed refresh anywhere in the SDK is observed as a
    /// transition to `Anonymous`.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let session = Self {
            inner: Arc::new(SessionInner {
                tokens: client.tokens().clone(),
                auth: client.auth().clone(),
                client,
                state,
            }),
        };

        let state = session.inner.state.clone();
        session.inner.client.on_session_expired(move || {
            state.send_replace(SessionState::Anonymous);
        });

        session
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The current user, when authenticated.
    #[must_use]
    pub fn current_user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user().cloned()
    }

    // =========================================================================
    // Login / register / logout
    // =========================================================================

    /// `login` - establish a session.
    ///
    /// On success the access token, the refresh token when issued, and the
    /// profile are stored and the state moves to `Authenticated`. On
    /// failure nothing is stored, the state returns to whatever it was,
    /// and the backend's message is carried in the outcome.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> AuthOutcome {
        let previous = self.state();
        self.inner.state.send_replace(SessionState::Authenticating);

        match self.inner.auth.login(username, password).await {
            Ok(response) => {
                self.inner.tokens.set_access_token(&response.token);
                if let Some(refresh) = &response.refresh_token {
                    self.inner.tokens.set_refresh_token(refresh);
                }
                let user = response.user.unwrap_or_else(|| minimal_profile(username));
                self.inner.tokens.set_user(&user);
                self.inner
                    .state
                    .send_replace(SessionState::Authenticated(user.clone()));
                AuthOutcome::Success(user)
            }
            Err(e) => {
                self.inner.state.send_replace(previous);
                AuthOutcome::Failure {
                    message: failure_message(e),
                }
            }
        }
    }

    /// `register` - create an account. Does not establish a session and
    /// does not touch any stored field.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> AuthOutcome {
        match self.inner.auth.register(request).await {
            Ok(()) => AuthOutcome::Success(minimal_profile(&request.username)),
            Err(e) => AuthOutcome::Failure {
                message: failure_message(e),
            },
        }
    }

    /// `logout` - best-effort server invalidation, then unconditional
    /// local clear. The server call's failure is ignored: the local
    /// session ends either way.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.inner.tokens.has_session() {
            if let Err(e) = self
                .inner
                .client
                .execute_empty(
                    reqwest::Method::POST,
                    "auth/logout",
                    &[],
                    crate::http::RequestBody::Empty,
                )
                .await
            {
                debug!(error = %e, "server-side logout failed, clearing locally anyway");
            }
        }
        self.inner.tokens.clear_session();
        self.inner.state.send_replace(SessionState::Anonymous);
    }

    // =========================================================================
    // Hydration and refresh
    // =========================================================================

    /// Optimistic mount hydration.
    ///
    /// A cached profile is exposed immediately for fast first paint, then
    /// a background profile fetch verifies it. Only a session-expiry
    /// outcome clears the session; any other failure (offline, backend
    /// down) leaves the optimistic session intact.
    #[instrument(skip(self))]
    pub async fn restore(&self) {
        if !self.inner.tokens.has_session() {
            return;
        }
        if let Some(cached) = self.inner.tokens.user() {
            self.inner.state.send_replace(SessionState::Authenticated(cached));
        }

        match self
            .inner
            .client
            .get_json::<UserProfile>("auth/profile", &[])
            .await
        {
            Ok(profile) => {
                self.inner.tokens.set_user(&profile);
                self.inner.state.send_replace(SessionState::Authenticated(profile));
            }
            Err(ApiError::SessionExpired) => {
                // The client already cleared the token store and fired the
                // hooks; just make sure the state reflects it.
                self.inner.state.send_replace(SessionState::Anonymous);
            }
            Err(e) => {
                warn!(error = %e, "profile verification failed, keeping optimistic session");
            }
        }
    }

    /// Manual refresh escape hatch.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` with no stored refresh token, or
    /// the refresh endpoint's error. Does not clear the session - that is
    /// the interceptor's decision, not the caller's.
    #[instrument(skip(self))]
    pub async fn try_refresh(&self) -> Result<(), ApiError> {
        let Some(refresh_token) = self.inner.tokens.refresh_token() else {
            return Err(ApiError::MissingToken);
        };
        let refreshed = self.inner.auth.refresh(&refresh_token).await?;
        self.inner.tokens.set_access_token(&refreshed.token);
        if let Some(rotated) = refreshed.refresh_token {
            self.inner.tokens.set_refresh_token(&rotated);
        }
        Ok(())
    }

    // =========================================================================
    // Authorization predicate
    // =========================================================================

    /// Whether the current session belongs to an administrator.
    ///
    /// Precedence: (1) the decoded access token, accepted only when
    /// unexpired; (2) the cached profile's roles, in both the
    /// array-of-roles and single-role forms; (3) the reserved `admin`
    /// username. No session means `false`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        let Some(token) = self.inner.tokens.access_token() else {
            return false;
        };

        if let Some(claims) = TokenClaims::decode(&token)
            && !claims.is_expired()
            && ADMIN_MARKERS.iter().any(|m| claims.has_authority(m))
        {
            return true;
        }

        if let Some(user) = self.inner.tokens.user() {
            if user
                .roles
                .iter()
                .filter_map(crate::types::Role::marker)
                .any(|m| ADMIN_MARKERS.contains(&m))
            {
                return true;
            }
            if user
                .role
                .as_deref()
                .is_some_and(|r| ADMIN_MARKERS.contains(&r))
            {
                return true;
            }
            // Development artifact inherited from the original client: the
            // reserved "admin" username is always treated as admin.
            // TODO(product): decide whether this fallback ships or dies.
            if user.username == RESERVED_ADMIN_USERNAME {
                return true;
            }
        }

        false
    }
}

/// The profile shape stored when the backend returns none.
fn minimal_profile(username: &str) -> UserProfile {
    UserProfile {
        id: None,
        username: username.to_string(),
        email: None,
        full_name: None,
        phone: None,
        address: None,
        gender: None,
        roles: Vec::new(),
        role: None,
    }
}

/// Turn an API error into a user-facing failure message.
fn failure_message(error: ApiError) -> String {
    match error {
        ApiError::Status { message, .. } => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_outcome_discriminates() {
        let ok = AuthOutcome::Success(minimal_profile("minh"));
        assert!(ok.is_success());

        let failed = AuthOutcome::Failure {
            message: "Bad credentials".to_string(),
        };
        assert!(!failed.is_success());
    }

    #[test]
    fn test_failure_message_extracts_backend_text() {
        let message = failure_message(ApiError::Status {
            status: 401,
            message: "Bad credentials".to_string(),
        });
        assert_eq!(message, "Bad credentials");
    }

    #[test]
    fn test_session_state_user_accessor() {
        assert!(SessionState::Anonymous.user().is_none());
        assert!(SessionState::Authenticating.user().is_none());
        let state = SessionState::Authenticated(minimal_profile("minh"));
        assert_eq!(state.user().map(|u| u.username.as_str()), Some("minh"));
    }

    fn admin_token(exp: i64) -> String {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload = serde_json::json!({
            "sub": "minh",
            "authorities": ["ROLE_ADMIN"],
            "exp": exp,
        });
        format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\"}"),
            URL_SAFE_NO_PAD.encode(payload.to_string()),
            URL_SAFE_NO_PAD.encode(b"sig")
        )
    }

    #[test]
    fn test_is_admin_false_without_session() {
        let store = crate::storage::LocalStore::in_memory();
        let (_tokens, client) = crate::test_support::guest_stack(&store);
        let session = Session::new(client);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_expired_admin_token_grants_nothing() {
        let store = crate::storage::LocalStore::in_memory();
        let (tokens, client) = crate::test_support::guest_stack(&store);
        tokens.set_access_token(&admin_token(chrono::Utc::now().timestamp() - 60));
        let session = Session::new(client);
        assert!(!session.is_admin());
    }

    #[test]
    fn test_unexpired_admin_token_grants_admin() {
        let store = crate::storage::LocalStore::in_memory();
        let (tokens, client) = crate::test_support::guest_stack(&store);
        tokens.set_access_token(&admin_token(chrono::Utc::now().timestamp() + 3600));
        let session = Session::new(client);
        assert!(session.is_admin());
    }

    #[test]
    fn test_profile_role_backs_up_an_opaque_token() {
        let store = crate::storage::LocalStore::in_memory();
        let (tokens, client) = crate::test_support::guest_stack(&store);
        tokens.set_access_token("opaque-token");
        let mut user = minimal_profile("minh");
        user.role = Some("ADMIN".to_string());
        tokens.set_user(&user);
        let session = Session::new(client);
        assert!(session.is_admin());
    }

    #[test]
    fn test_reserved_admin_username_fallback() {
        let store = crate::storage::LocalStore::in_memory();
        let (tokens, client) = crate::test_support::guest_stack(&store);
        tokens.set_access_token("opaque-token");
        tokens.set_user(&minimal_profile("admin"));
        let session = Session::new(client);
        assert!(session.is_admin());
    }
}
