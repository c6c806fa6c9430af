//! Core types and trait definitions for the Culinaria school directory.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod filter;
pub mod i18n;
pub mod image;
pub mod lookup;
pub mod profile;
pub mod routes;
pub mod school;
pub mod seed;
pub mod slug;
pub mod store;

pub use error::{Error, Result};
