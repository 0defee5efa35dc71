//! Backend API surface
//!
//! Wire envelopes and payload shapes returned by the backend's REST API,
//! plus the async client in [`client`]. Field names follow the backend's
//! camelCase JSON.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::BackendClient;

/// `{ "data": ... }` wrapper used by most endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

/// Query parameters for product listing/search endpoints.
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub category_id: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    /// Joined with commas on the wire.
    pub tags: Vec<String>,
    pub is_featured: Option<bool>,
}

impl ProductQuery {
    fn is_empty(&self) -> bool {
        self.page.is_none()
            && self.limit.is_none()
            && self.sort.is_none()
            && self.category_id.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.tags.is_empty()
            && self.is_featured.is_none()
    }

    pub(crate) fn apply(&self, url: &mut url::Url) {
        if self.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if let Some(page) = self.page {
            pairs.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            pairs.append_pair("limit", &limit.to_string());
        }
        if let Some(sort) = &self.sort {
            pairs.append_pair("sort", sort);
        }
        if let Some(category_id) = &self.category_id {
            pairs.append_pair("categoryId", category_id);
        }
        if let Some(min_price) = self.min_price {
            pairs.append_pair("minPrice", &min_price.to_string());
        }
        if let Some(max_price) = self.max_price {
            pairs.append_pair("maxPrice", &max_price.to_string());
        }
        if !self.tags.is_empty() {
            pairs.append_pair("tags", &self.tags.join(","));
        }
        if let Some(is_featured) = self.is_featured {
            pairs.append_pair("isFeatured", &is_featured.to_string());
        }
    }
}

/// Per-variant stock snapshot from the availability check endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantAvailability {
    pub id: String,
    pub available_for_sale: bool,
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPayload {
    pub id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItemPayload>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    /// String or number on the wire depending on backend version.
    #[serde(default)]
    pub price: Option<Decimal>,
    pub quantity: u32,
    #[serde(default)]
    pub product: Option<CartItemProduct>,
    #[serde(default)]
    pub variant: Option<CartItemVariant>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemProduct {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub images: Vec<crate::catalog::ProductImage>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemVariant {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartItem {
    pub product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    pub quantity: u32,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub id: String,
    pub order_number: String,
    pub status: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<String>,
    #[serde(default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItemPayload>,
}

/// Response of `POST /orders`.
#[derive(Clone, Debug, Deserialize)]
pub struct PlacedOrder {
    #[serde(default)]
    pub message: Option<String>,
    pub order: OrderPayload,
}
