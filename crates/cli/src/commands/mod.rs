pub mod auth;
pub mod cart;
pub mod orders;
pub mod products;
pub mod wishlist;

/// Fallible command entry point, matching `main`'s error handling.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
