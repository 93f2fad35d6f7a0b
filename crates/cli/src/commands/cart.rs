use clap::Subcommand;
use lapshop_client::LapShop;
use lapshop_client::checkout::{CheckoutError, Receiver};
use lapshop_core::{ProductId, format_vnd};

use super::CommandResult;

#[derive(Subcommand)]
pub enum CartAction {
    /// Print the cart contents and total
    Show,
    /// Add a product to the cart
    Add {
        product_id: i64,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (0 removes it)
    Set { product_id: i64, quantity: u32 },
    /// Remove a line from the cart
    Remove { product_id: i64 },
    /// Empty the cart
    Clear,
    /// Pull the server-side cart into the local one
    Pull,
    /// Push every local line to the server
    Push,
    /// Place an order from the cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        coupon: Option<String>,
    },
}

#[allow(clippy::print_stdout)]
pub async fn run(shop: &LapShop, action: CartAction) -> CommandResult {
    match action {
        CartAction::Show => print_cart(shop),
        CartAction::Add {
            product_id,
            quantity,
        } => {
            let product = shop.products().get(ProductId::new(product_id)).await?;
            shop.cart().add_item(&product, quantity).await;
            println!("Added {quantity} x {}", product.name);
            print_cart(shop);
        }
        CartAction::Set {
            product_id,
            quantity,
        } => {
            shop.cart().update_quantity(ProductId::new(product_id), quantity);
            print_cart(shop);
        }
        CartAction::Remove { product_id } => {
            shop.cart().remove_item(ProductId::new(product_id));
            print_cart(shop);
        }
        CartAction::Clear => {
            shop.cart().clear().await;
            println!("Cart cleared");
        }
        CartAction::Pull => {
            shop.cart().load_from_server().await?;
            print_cart(shop);
        }
        CartAction::Push => {
            shop.cart().sync_to_server().await;
            println!("Cart pushed to server");
        }
        CartAction::Checkout {
            name,
            phone,
            address,
            coupon,
        } => {
            let receiver = Receiver {
                name,
                phone,
                address,
            };
            match shop
                .checkout()
                .place_order(&receiver, coupon.as_deref())
                .await
            {
                Ok(order) => {
                    println!("Order #{} placed ({})", order.id, order.status);
                }
                Err(CheckoutError::OutOfStock { message, removed }) => {
                    if let Some(id) = removed {
                        println!("Removed product #{id} from the cart");
                    }
                    return Err(message.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(shop: &LapShop) {
    let lines = shop.cart().lines();
    if lines.is_empty() {
        println!("Cart is empty");
        return;
    }
    for line in &lines {
        println!(
            "{:>6}  {:<40}  {:>3} x {:>15}  =  {:>15}",
            line.product_id.as_i64(),
            line.name,
            line.quantity,
            format_vnd(line.unit_price),
            format_vnd(line.line_total())
        );
    }
    println!(
        "Total: {} ({} items)",
        format_vnd(shop.cart().total_price()),
        shop.cart().total_items()
    );
}
