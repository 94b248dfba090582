//! Cafe POS Core - Domain library for the point-of-sale.
//!
//! This crate provides the domain model used by the `pos` binary:
//! - [`types`] - Newtype wrappers for ids, prices and operator emails
//! - [`product`] - Products and the raw records they are built from
//! - [`catalog`] - Catalog with fallback policy and the product filter
//! - [`cart`] - The cart engine (line items, quantities, totals, checkout)
//! - [`session`] - Signed-in / anonymous session state
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no logging. Everything here is deterministic and unit tested.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod product;
pub mod session;
pub mod types;

pub use cart::{Cart, CartLine, CheckoutSummary};
pub use catalog::{Catalog, CatalogOrigin, fallback_products, visible_products};
pub use product::{Product, ProductRecord, ProductRecordError};
pub use session::{OperatorSession, SessionState, TOKEN_REFRESH_MARGIN_SECS};
pub use types::*;
