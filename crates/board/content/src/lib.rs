//! Data-driven content definitions and loaders.
//!
//! This crate houses loaders for the externally authored static data the
//! match consumes as read-only input:
//! - board layouts (tile graph, data-driven via RON)
//! - partner template catalogs (data-driven via RON)
//!
//! Content is consumed by the runtime at session build time and never
//! mutated afterwards.

pub mod loaders;

pub use loaders::{BoardLoader, LoadResult, TemplateLoader};
