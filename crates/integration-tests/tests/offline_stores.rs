//! Tests for the offline-first cart and wishlist stores: local state is
//! authoritative, the server is advisory.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use secrecy::SecretString;

use lapshop_client::types::Product;
use lapshop_integration_tests::{PASSWORD, TestBackend, USERNAME, product_json};

fn product(id: i64, name: &str, price: i64) -> Product {
    serde_json::from_value(product_json(id, name, price)).unwrap()
}

#[tokio::test]
async fn guest_cart_mutations_never_touch_the_server() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();

    let thinkpad = product(1, "ThinkPad X1", 25_000_000);
    shop.cart().add_item(&thinkpad, 2).await;
    shop.cart().update_quantity(thinkpad.id, 5);
    shop.cart().remove_item(thinkpad.id);

    assert_eq!(backend.state.cart_add_calls.load(Ordering::SeqCst), 0);
    assert!(shop.cart().is_empty());
}

#[tokio::test]
async fn signed_in_cart_adds_are_mirrored_to_the_server() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;

    shop.cart().add_item(&product(1, "ThinkPad X1", 25_000_000), 2).await;

    assert_eq!(backend.state.cart_add_calls.load(Ordering::SeqCst), 1);
    assert_eq!(shop.cart().total_items(), 2);
}

#[tokio::test]
async fn adding_the_same_product_merges_quantities() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();

    let thinkpad = product(1, "ThinkPad X1", 25_000_000);
    shop.cart().add_item(&thinkpad, 2).await;
    shop.cart().add_item(&thinkpad, 3).await;

    let lines = shop.cart().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines.first().unwrap().quantity, 5);
}

#[tokio::test]
async fn empty_server_cart_does_not_clobber_local_lines() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;
    shop.cart().add_item(&product(1, "ThinkPad X1", 25_000_000), 2).await;
    backend.state.set_cart(vec![]);

    shop.cart().load_from_server().await.unwrap();

    assert_eq!(shop.cart().total_items(), 2);
}

#[tokio::test]
async fn nonempty_server_cart_replaces_local_lines() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;
    shop.cart().add_item(&product(1, "ThinkPad X1", 25_000_000), 2).await;
    backend
        .state
        .set_cart(vec![(product_json(7, "Legion 5", 30_000_000), 3)]);

    shop.cart().load_from_server().await.unwrap();

    let lines = shop.cart().lines();
    assert_eq!(lines.len(), 1);
    let line = lines.first().unwrap();
    assert_eq!(line.name, "Legion 5");
    assert_eq!(line.quantity, 3);
}

#[tokio::test]
async fn clearing_the_cart_issues_a_server_delete() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;
    shop.cart().add_item(&product(1, "ThinkPad X1", 25_000_000), 1).await;

    shop.cart().clear().await;

    assert!(shop.cart().is_empty());
    assert_eq!(backend.state.cart_clear_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wishlist_toggle_survives_a_failing_server() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;
    backend.state.fail_wishlist_mutations();

    let thinkpad = product(1, "ThinkPad X1", 25_000_000);
    let added = shop.wishlist().toggle(&thinkpad).await;

    // Optimistic local state stands even though the server said 500.
    assert!(added);
    assert!(shop.wishlist().contains(thinkpad.id));
}

#[tokio::test]
async fn wishlist_hydration_replaces_local_state_even_when_empty() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;
    shop.wishlist().toggle(&product(1, "ThinkPad X1", 25_000_000)).await;
    backend.state.set_wishlist(vec![]);

    shop.wishlist().hydrate_from_server().await.unwrap();

    assert!(shop.wishlist().items().is_empty());
}

#[tokio::test]
async fn wishlist_hydration_pulls_the_server_list() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();
    shop.session()
        .login(USERNAME, &SecretString::from(PASSWORD))
        .await;
    backend
        .state
        .set_wishlist(vec![product_json(9, "XPS 13", 28_000_000)]);

    shop.wishlist().hydrate_from_server().await.unwrap();

    let items = shop.wishlist().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap().name, "XPS 13");
}

#[tokio::test]
async fn guest_catalog_reads_coexist_with_a_local_cart() {
    let backend = TestBackend::spawn().await;
    let shop = backend.shop();

    // Guest cart plus an anonymous catalog read; neither disturbs the other.
    backend
        .state
        .set_products(vec![product_json(1, "ThinkPad X1", 25_000_000)]);
    shop.cart().add_item(&product(1, "ThinkPad X1", 25_000_000), 1).await;
    let page = shop.products().list(0, 20).await.unwrap();

    assert_eq!(page.content.len(), 1);
    assert_eq!(shop.cart().total_items(), 1);
}
