//! Catalog Model

use serde::{Deserialize, Serialize};

/// How a happy-hour discount is expressed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountMode {
    /// Fractional rate applied to the base price (0.25 = 25% off)
    #[default]
    Percentage,
    /// Fixed currency amount subtracted from the base price
    Fixed,
}

/// A happy-hour discount definition (per-item override or general fallback).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct HappyHourDiscount {
    pub mode: DiscountMode,
    /// Percentage: fractional rate in [0, 1]. Fixed: currency amount.
    pub value: f64,
}

impl HappyHourDiscount {
    /// A discount with no effect; used when switching modes resets the value.
    pub fn reset(mode: DiscountMode) -> Self {
        Self { mode, value: 0.0 }
    }
}

/// General happy-hour settings, passed explicitly into pricing.
///
/// Items without their own discount value fall back to `discount`.
/// Whether happy hour is currently in effect is decided outside the
/// engine (schedule or manual toggle) and merely consumed here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct HappyHourContext {
    pub is_active: bool,
    pub discount: HappyHourDiscount,
}

/// A priceable catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    /// Tax-inclusive base price
    pub base_price: f64,
    /// Fractional tax rate (0.20 = 20%)
    pub tax_rate: f64,
    pub is_happy_hour_eligible: bool,
    /// Per-item discount override; `None` or zero value falls back to
    /// the general happy-hour settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub happy_hour_discount: Option<HappyHourDiscount>,
}

impl CatalogItem {
    /// The discount to apply under happy hour: the item's own override
    /// when it carries a value, otherwise the general fallback.
    pub fn effective_happy_hour_discount(&self, ctx: &HappyHourContext) -> HappyHourDiscount {
        match self.happy_hour_discount {
            Some(d) if d.value > 0.0 => d,
            _ => ctx.discount,
        }
    }
}
