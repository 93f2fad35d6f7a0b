//! Core types for the LapShop client.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::format_vnd;
pub use status::{Gender, OrderStatus};
