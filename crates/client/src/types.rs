//! Wire types for the LapShop REST API.
//!
//! All request/response bodies are camelCase JSON. Prices are wired as
//! plain JSON numbers (Vietnamese dong), hence `rust_decimal` with float
//! serde. Fields the backend sometimes omits are `Option` with defaults so
//! older payload shapes keep decoding.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use lapshop_core::{
    AddressId, CartDetailId, CartId, CategoryId, CouponId, Gender, OrderId, OrderStatus, ProductId,
    ReviewId, UserId,
};

// =============================================================================
// Catalog
// =============================================================================

/// A product as returned by the catalog endpoints.
///
/// Doubles as the display snapshot stored in cart lines, wishlist entries,
/// and the recently-viewed list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Units in stock. Absent on list payloads that omit inventory.
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Manufacturer (Dell, Lenovo, ...). The API calls this "factory".
    #[serde(default)]
    pub factory: Option<String>,
    /// Usage segment (gaming, office, ...).
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub sold: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Category reference embedded in product payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: CategoryId,
    #[serde(default)]
    pub name: Option<String>,
}

/// A category as returned by `/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields for creating or updating a category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fields for creating or updating a product (admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// A page of results, in the backend's pageable shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub total_elements: u64,
    /// Zero-based page index.
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub size: u64,
}

impl<T> Page<T> {
    /// An empty page, used when the backend returns a bare list.
    #[must_use]
    pub fn from_content(content: Vec<T>) -> Self {
        let len = content.len() as u64;
        Self {
            content,
            total_pages: 1,
            total_elements: len,
            number: 0,
            size: len,
        }
    }
}

// =============================================================================
// Identity
// =============================================================================

/// A user profile, as cached locally and returned by `/auth/profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Array-of-roles form.
    #[serde(default)]
    pub roles: Vec<Role>,
    /// Single-role form used by some payloads.
    #[serde(default)]
    pub role: Option<String>,
}

/// A role attached to a user profile. The backend emits both `name` and
/// Spring-style `authority` fields depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    /// The role marker, whichever field carries it.
    #[must_use]
    pub fn marker(&self) -> Option<&str> {
        self.name.as_deref().or(self.authority.as_deref())
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(alias = "accessToken")]
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Registration request. Not `Serialize`: the password rides a
/// [`SecretString`] and only crosses into plain text at the wire call.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: SecretString,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub gender: Option<Gender>,
}

/// Profile update request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

// =============================================================================
// Cart & wishlist (server side)
// =============================================================================

/// The authoritative server-side cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCart {
    #[serde(default)]
    pub id: Option<CartId>,
    #[serde(default, alias = "cartDetails")]
    pub items: Vec<ServerCartItem>,
}

/// One line of the server-side cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCartItem {
    #[serde(default)]
    pub id: Option<CartDetailId>,
    pub product: Product,
    pub quantity: u32,
}

/// Body for `POST /cart/items`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

// =============================================================================
// Orders
// =============================================================================

/// Body for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One requested order line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// An order as returned by the order endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub receiver_phone: Option<String>,
    #[serde(default)]
    pub receiver_address: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "orderDetails")]
    pub items: Vec<OrderItem>,
}

/// One line of a returned order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

// =============================================================================
// Coupons, addresses, reviews
// =============================================================================

/// A coupon, fetched read-only during checkout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(default)]
    pub id: Option<CouponId>,
    pub code: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub min_order_amount: Option<Decimal>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

const fn default_true() -> bool {
    true
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub detail: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Fields for creating or updating an address.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub detail: String,
}

/// A product review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub username: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body for `POST /reviews`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub product_id: ProductId,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

// =============================================================================
// Admin: users, permissions, settings
// =============================================================================

/// Fields for creating or updating a user (admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub email: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

/// A named permission (admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default)]
    pub id: Option<uuid::Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Shop-wide settings (admin).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSettings {
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub maintenance_mode: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_decodes_with_minimal_fields() {
        let product: Product =
            serde_json::from_str(r#"{"id": 1, "name": "ThinkPad X1", "price": 25000000}"#).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.image, None);
        assert_eq!(product.category, None);
    }

    #[test]
    fn test_product_price_is_a_json_number() {
        let product = Product {
            id: ProductId::new(2),
            name: "Aspire 5".to_string(),
            price: Decimal::new(12_990_000, 0),
            description: None,
            image: None,
            quantity: None,
            factory: Some("Acer".to_string()),
            target: None,
            category: None,
            sold: None,
            created_at: None,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert!(json["price"].is_number());
    }

    #[test]
    fn test_login_response_accepts_access_token_alias() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{"accessToken": "abc", "user": null}"#).unwrap();
        assert_eq!(resp.token, "abc");
        assert!(resp.refresh_token.is_none());
    }

    #[test]
    fn test_profile_accepts_both_role_forms() {
        let array_form: UserProfile = serde_json::from_str(
            r#"{"username": "minh", "roles": [{"authority": "ROLE_ADMIN"}]}"#,
        )
        .unwrap();
        assert_eq!(array_form.roles[0].marker(), Some("ROLE_ADMIN"));

        let single_form: UserProfile =
            serde_json::from_str(r#"{"username": "minh", "role": "ADMIN"}"#).unwrap();
        assert_eq!(single_form.role.as_deref(), Some("ADMIN"));
        assert!(single_form.roles.is_empty());
    }

    #[test]
    fn test_server_cart_accepts_cart_details_alias() {
        let cart: ServerCart = serde_json::from_str(
            r#"{"id": 5, "cartDetails": [{"product": {"id": 1, "name": "A", "price": 500}, "quantity": 2}]}"#,
        )
        .unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
    }

    #[test]
    fn test_coupon_defaults_active() {
        let coupon: Coupon =
            serde_json::from_str(r#"{"code": "SALE10", "discountAmount": 100000}"#).unwrap();
        assert!(coupon.active);
        assert!(coupon.min_order_amount.is_none());
    }
}
