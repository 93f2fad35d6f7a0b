//! Checkout: order placement with stock-error recovery, and coupon math.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{instrument, warn};

use lapshop_core::ProductId;

use crate::api::{CouponsApi, OrdersApi};
use crate::error::ApiError;
use crate::stores::CartStore;
use crate::types::{Order, OrderItemRequest, OrderRequest};

/// The backend's out-of-stock message, pattern-matched to drive the
/// corrective cart removal.
const STOCK_MESSAGE_PREFIX: &str = "Insufficient product quantity for product: ";

/// Delivery details for an order.
#[derive(Debug, Clone)]
pub struct Receiver {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines to order.
    #[error("Cart is empty")]
    EmptyCart,

    /// The backend rejected the order for lack of stock. The offending
    /// cart line has already been removed locally (when it could be
    /// matched), so the caller just re-renders the cart with the message.
    #[error("{message}")]
    OutOfStock {
        /// The backend's message, verbatim.
        message: String,
        /// The cart line removed as the corrective action, if matched.
        removed: Option<ProductId>,
    },

    /// Any other API failure, unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Coupon rejection reasons.
#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Coupon is not active")]
    Inactive,
    #[error("Coupon has expired")]
    Expired,
    #[error("Order total below coupon minimum of {minimum}")]
    MinimumNotMet {
        /// The coupon's minimum order amount.
        minimum: Decimal,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A validated coupon applied to an order total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponApplication {
    /// Amount taken off the order.
    pub discount: Decimal,
    /// Total after the discount, never below zero.
    pub discounted_total: Decimal,
}

/// The checkout flow, tying the order and coupon services to the cart.
#[derive(Clone)]
pub struct Checkout {
    orders: OrdersApi,
    coupons: CouponsApi,
    cart: CartStore,
}

impl Checkout {
    /// Create the checkout flow.
    #[must_use]
    pub const fn new(orders: OrdersApi, coupons: CouponsApi, cart: CartStore) -> Self {
        Self {
            orders,
            coupons,
            cart,
        }
    }

    /// Place an order from the current cart lines.
    ///
    /// On success the cart is cleared (server and local). On an
    /// out-of-stock rejection the offending line is removed locally -
    /// matched by name, falling back to a product id in the message -
    /// and the backend's message is re-surfaced.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] with nothing to order,
    /// [`CheckoutError::OutOfStock`] for stock rejections, and
    /// [`CheckoutError::Api`] for everything else.
    #[instrument(skip(self, receiver, coupon_code))]
    pub async fn place_order(
        &self,
        receiver: &Receiver,
        coupon_code: Option<&str>,
    ) -> Result<Order, CheckoutError> {
        let lines = self.cart.lines();
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let request = OrderRequest {
            items: lines
                .iter()
                .map(|line| OrderItemRequest {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price: line.unit_price,
                })
                .collect(),
            receiver_name: receiver.name.clone(),
            receiver_phone: receiver.phone.clone(),
            receiver_address: receiver.address.clone(),
            coupon_code: coupon_code.map(str::to_string),
            note: None,
        };

        match self.orders.place(&request).await {
            Ok(order) => {
                // The backend consumed the cart; drop the local copy and
                // the server mirror.
                self.cart.clear().await;
                Ok(order)
            }
            Err(ApiError::Status { message, .. }) if message.contains(STOCK_MESSAGE_PREFIX) => {
                let removed = self.remove_offending_line(&message);
                if removed.is_none() {
                    warn!(message, "out-of-stock product not found in cart");
                }
                Err(CheckoutError::OutOfStock { message, removed })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Validate a coupon against an order total and compute the
    /// discounted total.
    ///
    /// # Errors
    ///
    /// [`CouponError::Inactive`], [`CouponError::Expired`], or
    /// [`CouponError::MinimumNotMet`] for an ineligible coupon;
    /// [`CouponError::Api`] when the lookup itself fails.
    #[instrument(skip(self))]
    pub async fn apply_coupon(
        &self,
        code: &str,
        order_total: Decimal,
    ) -> Result<CouponApplication, CouponError> {
        let coupon = self.coupons.check(code).await?;
        if !coupon.active {
            return Err(CouponError::Inactive);
        }
        if let Some(expiry) = coupon.expiry_date
            && expiry < chrono::Utc::now()
        {
            return Err(CouponError::Expired);
        }
        if let Some(minimum) = coupon.min_order_amount
            && order_total < minimum
        {
            return Err(CouponError::MinimumNotMet { minimum });
        }

        let discount = coupon.discount_amount.min(order_total);
        Ok(CouponApplication {
            discount,
            discounted_total: order_total - discount,
        })
    }

    /// Remove the cart line named in an out-of-stock message. Matches the
    /// product name first, then tries the trailing token as a product id.
    fn remove_offending_line(&self, message: &str) -> Option<ProductId> {
        let fragment = message
            .rsplit_once(STOCK_MESSAGE_PREFIX)
            .map(|(_, tail)| tail.trim())?;

        let lines = self.cart.lines();
        if let Some(line) = lines.iter().find(|l| l.name == fragment) {
            self.cart.remove_item(line.product_id);
            return Some(line.product_id);
        }

        let id = fragment.parse::<i64>().ok().map(ProductId::new)?;
        if lines.iter().any(|l| l.product_id == id) {
            self.cart.remove_item(id);
            return Some(id);
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::CartApi;
    use crate::storage::LocalStore;
    use crate::test_support::{guest_stack, product};

    fn checkout_with_cart() -> (Checkout, CartStore) {
        let store = LocalStore::in_memory();
        let (tokens, client) = guest_stack(&store);
        let cart = CartStore::new(store, tokens, CartApi::new(client.clone()));
        let checkout = Checkout::new(
            OrdersApi::new(client.clone()),
            CouponsApi::new(client),
            cart.clone(),
        );
        (checkout, cart)
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_before_any_network_call() {
        let (checkout, _cart) = checkout_with_cart();
        let receiver = Receiver {
            name: "Minh".to_string(),
            phone: "0900000000".to_string(),
            address: "1 Tran Hung Dao".to_string(),
        };
        assert!(matches!(
            checkout.place_order(&receiver, None).await,
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[tokio::test]
    async fn test_offending_line_removed_by_name() {
        let (checkout, cart) = checkout_with_cart();
        cart.add_item(&product(1, "ThinkPad X1", 500), 1).await;
        cart.add_item(&product(2, "Aspire 5", 300), 1).await;

        let removed = checkout
            .remove_offending_line("Insufficient product quantity for product: ThinkPad X1");
        assert_eq!(removed, Some(ProductId::new(1)));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].name, "Aspire 5");
    }

    #[tokio::test]
    async fn test_offending_line_falls_back_to_id() {
        let (checkout, cart) = checkout_with_cart();
        cart.add_item(&product(7, "Legion 5", 900), 1).await;

        let removed =
            checkout.remove_offending_line("Insufficient product quantity for product: 7");
        assert_eq!(removed, Some(ProductId::new(7)));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_unmatched_stock_message_removes_nothing() {
        let (checkout, cart) = checkout_with_cart();
        cart.add_item(&product(1, "ThinkPad X1", 500), 1).await;

        let removed = checkout
            .remove_offending_line("Insufficient product quantity for product: Unknown Laptop");
        assert_eq!(removed, None);
        assert_eq!(cart.lines().len(), 1);
    }
}
