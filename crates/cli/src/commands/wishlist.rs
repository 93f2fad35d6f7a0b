use clap::Subcommand;
use lapshop_client::LapShop;
use lapshop_core::{ProductId, format_vnd};

use super::CommandResult;

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Print the wishlist
    Show,
    /// Add or remove a product, depending on whether it is listed
    Toggle { product_id: i64 },
    /// Remove a product
    Remove { product_id: i64 },
    /// Empty the wishlist
    Clear,
}

#[allow(clippy::print_stdout)]
pub async fn run(shop: &LapShop, action: WishlistAction) -> CommandResult {
    match action {
        WishlistAction::Show => {
            let items = shop.wishlist().items();
            if items.is_empty() {
                println!("Wishlist is empty");
            }
            for product in &items {
                println!(
                    "{:>6}  {:<40}  {:>15}",
                    product.id,
                    product.name,
                    format_vnd(product.price)
                );
            }
        }
        WishlistAction::Toggle { product_id } => {
            let product = shop.products().get(ProductId::new(product_id)).await?;
            if shop.wishlist().toggle(&product).await {
                println!("Added {} to the wishlist", product.name);
            } else {
                println!("Removed {} from the wishlist", product.name);
            }
        }
        WishlistAction::Remove { product_id } => {
            shop.wishlist().remove(ProductId::new(product_id)).await;
            println!("Removed");
        }
        WishlistAction::Clear => {
            shop.wishlist().clear();
            println!("Wishlist cleared");
        }
    }

    Ok(())
}
