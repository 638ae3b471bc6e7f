//! Core types and trait definitions for the Catalog service.
//!
//! This crate has no HTTP or database dependencies. It owns
//! the request-validation-and-persistence-mapping layer: identifier checks,
//! payload allow-listing, per-field rules, and the translation of store
//! outcomes into a small error taxonomy.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod handler;
pub mod id;
pub mod projection;
pub mod schema;
pub mod store;

pub use error::{Error, ErrorKind, Result};
pub use handler::ResourceHandler;
pub use id::{ObjectId, is_valid_identifier};
pub use schema::{PRODUCTS, ResourceSchema, USERS};
pub use store::{Document, DocumentStore, StoreError};
