//! Catalog data model
//!
//! Typed shapes for the backend's product JSON (camelCase wire format).
//! Products are fetched fresh per page view and treated as immutable
//! snapshots; the backend is the source of truth and not every field is
//! guaranteed present, so deserialization is tolerant of absent data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod resolver;

fn default_true() -> bool {
    true
}

/// Rule governing whether stock depletion blocks further sales.
///
/// `Unknown` captures unrecognized wire values so an upgraded backend
/// never makes deserialization fail; the resolver fails safe on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryPolicy {
    Continue,
    Deny,
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub amount: Decimal,
    pub currency_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: Money,
    pub max_variant_price: Money,
}

/// One option/value pair, used both by variants (their position in the
/// option space) and by images (what they depict).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionValue {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

/// A named axis of product variation (e.g. "Color") with its ordered
/// values. Option names are case-insensitive keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub values: Vec<OptionValue>,
}

/// One purchasable SKU of a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Backend opt-out flag, independent of inventory count. Absent means
    /// the variant has not been switched off.
    #[serde(default = "default_true")]
    pub available_for_sale: bool,
    #[serde(default)]
    pub inventory_policy: Option<InventoryPolicy>,
    /// Absent means inventory is not tracked for this variant.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    #[serde(default)]
    pub price: Option<Money>,
    /// One value per product option on a well-formed variant. The
    /// resolver tolerates gaps by treating them as "no match".
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    /// Structured tagging of which option values this image depicts.
    /// `None` means the image is generic.
    #[serde(default)]
    pub selected_options: Option<Vec<SelectedOption>>,
}

/// Immutable product snapshot fetched per page view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Product-level opt-out; when false every variant is unsellable
    /// regardless of inventory. Absent means available.
    #[serde(default = "default_true")]
    pub available_for_sale: bool,
    #[serde(default)]
    pub options: Vec<ProductOption>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub featured_image: Option<ProductImage>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
}
