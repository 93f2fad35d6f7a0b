//! Tests for login, logout, and session restoration against the fake
//! backend.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use secrecy::SecretString;

use lapshop_client::session::Session;
use lapshop_client::{AuthOutcome, SessionState};
use lapshop_integration_tests::{
    INITIAL_ACCESS, INITIAL_REFRESH, PASSWORD, TestBackend, USERNAME, seed_live_session,
    seed_stale_session,
};

#[tokio::test]
async fn login_stores_tokens_and_profile() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    let session = Session::new(client);

    let outcome = session.login(USERNAME, &SecretString::from(PASSWORD)).await;

    let profile = match outcome {
        AuthOutcome::Success(profile) => profile,
        AuthOutcome::Failure { message } => panic!("login rejected: {message}"),
    };
    assert_eq!(profile.username, USERNAME);
    assert_eq!(tokens.access_token().as_deref(), Some(INITIAL_ACCESS));
    assert_eq!(tokens.refresh_token().as_deref(), Some(INITIAL_REFRESH));
    assert!(matches!(session.state(), SessionState::Authenticated(_)));
    assert_eq!(backend.state.login_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejected_login_leaves_the_store_untouched() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    seed_live_session(&tokens);
    let session = Session::new(client);

    let outcome = session.login(USERNAME, &SecretString::from("wrong")).await;

    assert!(matches!(outcome, AuthOutcome::Failure { .. }));
    // The previous session survives a failed login attempt.
    assert_eq!(tokens.access_token().as_deref(), Some(INITIAL_ACCESS));
    assert_eq!(tokens.refresh_token().as_deref(), Some(INITIAL_REFRESH));
}

#[tokio::test]
async fn logout_clears_the_local_session() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    let session = Session::new(client);
    session.login(USERNAME, &SecretString::from(PASSWORD)).await;
    assert!(tokens.has_session());

    session.logout().await;

    assert!(!tokens.has_session());
    assert!(tokens.user().is_none());
    assert!(matches!(session.state(), SessionState::Anonymous));
}

#[tokio::test]
async fn restore_verifies_the_cached_profile() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    seed_live_session(&tokens);
    // Plant a cached profile that drifted from the server's copy.
    let mut cached: lapshop_client::types::UserProfile =
        serde_json::from_value(lapshop_integration_tests::minh_profile()).unwrap();
    cached.email = Some("stale@example.com".to_owned());
    tokens.set_user(&cached);
    let session = Session::new(client);

    session.restore().await;

    let SessionState::Authenticated(profile) = session.state() else {
        panic!("expected an authenticated session");
    };
    assert_eq!(profile.email.as_deref(), Some("minh@example.com"));
}

#[tokio::test]
async fn restore_keeps_the_session_on_transport_failures() {
    // An unreachable backend is an outage, not an expiry.
    let (_store, tokens, client) = lapshop_integration_tests::unreachable_stack();
    seed_live_session(&tokens);
    let cached: lapshop_client::types::UserProfile =
        serde_json::from_value(lapshop_integration_tests::minh_profile()).unwrap();
    tokens.set_user(&cached);
    let session = Session::new(client);

    session.restore().await;

    assert!(tokens.has_session());
    assert!(matches!(session.state(), SessionState::Authenticated(_)));
}

#[tokio::test]
async fn restore_clears_a_session_the_backend_rejects() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    seed_stale_session(&backend, &tokens);
    backend.state.fail_refreshes();
    let cached = serde_json::from_value(lapshop_integration_tests::minh_profile()).unwrap();
    tokens.set_user(&cached);
    let session = Session::new(client);

    session.restore().await;

    assert!(!tokens.has_session());
    assert!(matches!(session.state(), SessionState::Anonymous));
    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn restore_without_a_session_stays_anonymous() {
    let backend = TestBackend::spawn().await;
    let (_store, _tokens, client) = backend.raw_stack();
    let session = Session::new(client);

    session.restore().await;

    assert!(matches!(session.state(), SessionState::Anonymous));
    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 0);
}
