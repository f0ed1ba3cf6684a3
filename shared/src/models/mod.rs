//! Data models
//!
//! Catalog types consumed by the checkout engine. The catalog itself
//! (CRUD, storage) lives server-side; the engine only reads these.

pub mod catalog;

// Re-exports
pub use catalog::*;
