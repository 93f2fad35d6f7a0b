//! LapShop CLI - terminal client for the LapShop store.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (stores tokens under LAPSHOP_STATE_DIR)
//! lapshop auth login -u minh
//!
//! # Browse the catalog
//! lapshop products list
//! lapshop products search --factory Lenovo --keyword thinkpad
//!
//! # Shop
//! lapshop cart add 42 --quantity 2
//! lapshop cart show
//! lapshop cart checkout --name "Minh" --phone 0900000000 --address "1 Tran Hung Dao"
//!
//! # Orders
//! lapshop orders mine
//! ```
//!
//! # Environment Variables
//!
//! - `LAPSHOP_API_URL` - Base URL of the LapShop backend (required)
//! - `LAPSHOP_STATE_DIR` - Directory for persisted session/cart state

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use lapshop_client::LapShop;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lapshop")]
#[command(author, version, about = "LapShop terminal client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign out, register, inspect the session
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: commands::products::ProductsAction,
    },
    /// Manage the cart and check out
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: commands::wishlist::WishlistAction,
    },
    /// View and (as admin) manage orders
    Orders {
        #[command(subcommand)]
        action: commands::orders::OrdersAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::print_stderr)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let shop = LapShop::from_env()?;
    shop.on_session_expired(|| {
        eprintln!("Session expired - run `lapshop auth login` to sign in again");
    });
    shop.start().await;

    match cli.command {
        Commands::Auth { action } => commands::auth::run(&shop, action).await?,
        Commands::Products { action } => commands::products::run(&shop, action).await?,
        Commands::Cart { action } => commands::cart::run(&shop, action).await?,
        Commands::Wishlist { action } => commands::wishlist::run(&shop, action).await?,
        Commands::Orders { action } => commands::orders::run(&shop, action).await?,
    }

    Ok(())
}
