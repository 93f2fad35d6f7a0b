use clap::Subcommand;
use lapshop_client::LapShop;
use lapshop_client::types::Order;
use lapshop_core::{OrderId, OrderStatus, format_vnd};
use rust_decimal::Decimal;

use super::CommandResult;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// List the signed-in user's orders
    Mine,
    /// List all orders, paged (admin)
    List {
        #[arg(long, default_value_t = 0)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        size: u64,
        /// Restrict to one status (PENDING, PROCESSING, COMPLETED, CANCELLED)
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    /// Move an order to a new status (admin)
    SetStatus { id: i64, status: OrderStatus },
}

#[allow(clippy::print_stdout)]
pub async fn run(shop: &LapShop, action: OrdersAction) -> CommandResult {
    match action {
        OrdersAction::Mine => {
            let orders = shop.orders().my_orders().await?;
            if orders.is_empty() {
                println!("No orders yet");
            }
            for order in &orders {
                print_order(order);
            }
        }
        OrdersAction::List { page, size, status } => {
            if let Some(status) = status {
                for order in shop.orders().by_status(status).await? {
                    print_order(&order);
                }
            } else {
                let listing = shop.orders().list(page, size).await?;
                for order in &listing.content {
                    print_order(order);
                }
                println!(
                    "Page {}/{} ({} orders)",
                    listing.number + 1,
                    listing.total_pages.max(1),
                    listing.total_elements
                );
            }
        }
        OrdersAction::SetStatus { id, status } => {
            let order = shop.orders().update_status(OrderId::new(id), status).await?;
            println!("Order #{} is now {}", order.id, order.status);
        }
    }

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    let total = order.total_price.unwrap_or_else(|| {
        order
            .items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    });
    println!(
        "#{:<6}  {:<12}  {:>15}  {}",
        order.id.as_i64(),
        order.status.to_string(),
        format_vnd(total),
        order
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    );
    for item in &order.items {
        let name = item.product_name.as_deref().unwrap_or("(product)");
        println!("        {:>3} x {:<40} {:>15}", item.quantity, name, format_vnd(item.price));
    }
}
