//! Batch processors.
//!
//! A processor builds the [`GlobalContext`](crate::normalizer::GlobalContext)
//! once per batch, normalizes each item independently and collects the
//! failures of single items as [`ItemError`](crate::error::ItemError)s
//! instead of failing the batch.

pub mod category;
pub mod context;
pub mod product;

pub use category::{CategoryBatchOutcome, CategoryTreeProcessor};
pub use context::ContextBuilder;
pub use product::{ProductBatchOutcome, ProductProcessor};
