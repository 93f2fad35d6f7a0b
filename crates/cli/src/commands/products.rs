use clap::Subcommand;
use lapshop_client::LapShop;
use lapshop_client::api::{ProductFilter, ProductSort};
use lapshop_client::types::{Page, Product};
use lapshop_core::{ProductId, format_vnd};
use rust_decimal::Decimal;

use super::CommandResult;

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List the catalog, newest first
    List {
        #[arg(long, default_value_t = 0)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        size: u64,
    },
    /// Filter the catalog
    Search {
        /// Manufacturer; repeatable
        #[arg(long)]
        factory: Vec<String>,
        /// Usage segment (gaming, office, ...); repeatable
        #[arg(long)]
        target: Vec<String>,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        min_price: Option<Decimal>,
        #[arg(long)]
        max_price: Option<Decimal>,
        /// One of: price-asc, price-desc, newest, best-selling
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        size: u64,
    },
    /// Show one product in full
    Show { id: i64 },
    /// List known manufacturers
    Factories,
}

#[allow(clippy::print_stdout)]
pub async fn run(shop: &LapShop, action: ProductsAction) -> CommandResult {
    match action {
        ProductsAction::List { page, size } => {
            let listing = shop.products().list(page, size).await?;
            print_page(&listing);
        }
        ProductsAction::Search {
            factory,
            target,
            keyword,
            min_price,
            max_price,
            sort,
            page,
            size,
        } => {
            let filter = ProductFilter {
                factories: factory,
                targets: target,
                price_min: min_price,
                price_max: max_price,
                keyword,
                sort: sort.as_deref().map(parse_sort).transpose()?,
                page: Some(page),
                size: Some(size),
            };
            let listing = shop.products().filter(&filter).await?;
            print_page(&listing);
        }
        ProductsAction::Show { id } => {
            let product = shop.products().get(ProductId::new(id)).await?;
            shop.recently_viewed().push(&product);
            print_product(&product);
        }
        ProductsAction::Factories => {
            for factory in shop.products().factories().await? {
                println!("{factory}");
            }
        }
    }

    Ok(())
}

fn parse_sort(value: &str) -> Result<ProductSort, String> {
    match value {
        "price-asc" => Ok(ProductSort::PriceAsc),
        "price-desc" => Ok(ProductSort::PriceDesc),
        "newest" => Ok(ProductSort::Newest),
        "best-selling" => Ok(ProductSort::BestSelling),
        other => Err(format!("Unknown sort order: {other}")),
    }
}

#[allow(clippy::print_stdout)]
fn print_page(page: &Page<Product>) {
    for product in &page.content {
        println!(
            "{:>6}  {:<40}  {:>15}",
            product.id.as_i64(),
            product.name,
            format_vnd(product.price)
        );
    }
    println!(
        "Page {}/{} ({} products)",
        page.number + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

#[allow(clippy::print_stdout)]
fn print_product(product: &Product) {
    println!("{} (#{})", product.name, product.id);
    println!("Price: {}", format_vnd(product.price));
    if let Some(factory) = &product.factory {
        println!("Factory: {factory}");
    }
    if let Some(target) = &product.target {
        println!("Target: {target}");
    }
    if let Some(quantity) = product.quantity {
        println!("In stock: {quantity}");
    }
    if let Some(sold) = product.sold {
        println!("Sold: {sold}");
    }
    if let Some(description) = &product.description {
        println!("\n{description}");
    }
}
