//! Client-local state stores.
//!
//! The shopper's in-progress selections live here, offline-first: every
//! mutation lands in local durable storage synchronously, and server
//! synchronization is advisory - a failed sync is logged, never rolled
//! back. The local store is authoritative for the active client; the
//! remote copy is an opportunistic mirror. That is a documented contract,
//! not an accident.

mod cart;
mod prefs;
mod recent;
mod wishlist;

pub use cart::{CartLine, CartStore};
pub use prefs::{Preferences, Theme};
pub use recent::RecentlyViewed;
pub use wishlist::WishlistStore;
