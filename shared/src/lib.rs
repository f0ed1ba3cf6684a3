//! Shared types for the checkout engine
//!
//! Domain models and submission payloads exchanged between the
//! checkout engine, the presentation layer and the fiscal backend.

pub mod error;
pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{CheckoutErrorCode, CheckoutFailure};
pub use models::{CatalogItem, DiscountMode, HappyHourContext, HappyHourDiscount};
