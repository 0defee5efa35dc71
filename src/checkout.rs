//! Checkout payloads
//!
//! Typed order-placement requests, validated client-side before they are
//! posted so the backend never sees an obviously broken order. Payment
//! processing itself happens behind the backend's payment redirect and
//! is out of this crate's hands.

use serde::Serialize;
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub variant_id: String,
    pub quantity: u32,
}

fn validate_items(items: &[CheckoutItem]) -> Result<(), ValidationError> {
    if items.iter().any(|item| item.quantity == 0) {
        return Err(ValidationError::new("zero_quantity"));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[validate(length(min = 1, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "last name is required"))]
    pub last_name: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

#[derive(Clone, Debug, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(min = 1, message = "order has no items"), custom = "validate_items")]
    pub items: Vec<CheckoutItem>,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    #[validate]
    pub shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate]
    pub billing_address: Option<ShippingAddress>,
    /// Backend-recognized method key, e.g. `cod`, `vnpay`, `momo`.
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_note: Option<String>,
}
