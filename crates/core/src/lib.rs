//! LapShop Core - Shared types library.
//!
//! This crate provides common types used across all LapShop client components:
//! - `client` - SDK talking to the LapShop REST API
//! - `cli` - Command-line shop client
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money formatting, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
