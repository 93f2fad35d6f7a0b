//! Tests for the authenticated-request interceptor: single-flight token
//! refresh, single retry, and terminal session expiry.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use lapshop_client::ApiError;
use lapshop_client::http::RequestBody;
use lapshop_integration_tests::{TestBackend, seed_stale_session};

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let backend = TestBackend::spawn().await;
    backend.state.set_refresh_delay(Duration::from_millis(50));
    let (_store, tokens, client) = backend.raw_stack();
    seed_stale_session(&backend, &tokens);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "retried request failed: {result:?}");
    }

    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 1);
    // The rotated token is in the store, ready for later requests.
    assert_eq!(
        tokens.access_token().as_deref(),
        Some(backend.state.current_access().as_str())
    );
}

#[tokio::test]
async fn requests_after_a_refresh_reuse_the_new_token() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    seed_stale_session(&backend, &tokens);

    client
        .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
        .await
        .unwrap();
    client
        .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn second_401_after_refresh_is_terminal() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    seed_stale_session(&backend, &tokens);
    // Refresh succeeds, but the retried request is rejected again.
    backend.state.reject_all_bearer_tokens();

    let fired = Arc::new(AtomicUsize::new(0));
    let observer = Arc::clone(&fired);
    client.on_session_expired(move || {
        observer.fetch_add(1, Ordering::SeqCst);
    });

    let result = client
        .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
        .await;

    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(!tokens.has_session());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_failure_clears_the_session() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    seed_stale_session(&backend, &tokens);
    backend.state.fail_refreshes();

    let fired = Arc::new(AtomicUsize::new(0));
    let observer = Arc::clone(&fired);
    client.on_session_expired(move || {
        observer.fetch_add(1, Ordering::SeqCst);
    });

    let result = client
        .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
        .await;

    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert!(!tokens.has_session());
    assert!(tokens.access_token().is_none());
    assert!(tokens.refresh_token().is_none());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_callers_share_a_failed_refresh() {
    let backend = TestBackend::spawn().await;
    backend.state.set_refresh_delay(Duration::from_millis(50));
    let (_store, tokens, client) = backend.raw_stack();
    seed_stale_session(&backend, &tokens);
    backend.state.fail_refreshes();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(ApiError::SessionExpired)));
    }

    // The first caller through the gate fails the refresh and clears the
    // session; everyone queued behind it fails fast on the missing token.
    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(!tokens.has_session());
}

#[tokio::test]
async fn missing_refresh_token_fails_without_a_refresh_call() {
    let backend = TestBackend::spawn().await;
    let (_store, tokens, client) = backend.raw_stack();
    tokens.set_access_token("stale-access");
    backend.state.expire_access();

    let result = client
        .execute::<Value>(Method::GET, "auth/profile", &[], RequestBody::Empty)
        .await;

    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn public_routes_need_no_session() {
    let backend = TestBackend::spawn().await;
    backend
        .state
        .set_products(vec![lapshop_integration_tests::product_json(
            1, "ThinkPad X1", 25_000_000,
        )]);
    let (_store, _tokens, client) = backend.raw_stack();

    let page: Value = client
        .execute(Method::GET, "products", &[], RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(page["content"].as_array().unwrap().len(), 1);
    assert_eq!(backend.state.refresh_calls.load(Ordering::SeqCst), 0);
}
