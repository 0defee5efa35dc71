//! Cart session and view model
//!
//! The backend owns the cart itself; this module owns the client-side
//! identifiers pointing at it and the transformation of cart payloads
//! into display-ready line items. Session state is explicit and injected
//! by the caller rather than read from ambient storage.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::api::{CartItemPayload, CartPayload};

/// Client-owned pointers at the backend cart. A fresh session has no
/// cart yet; one is attached after the first `create_cart` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartSession {
    pub session_id: String,
    pub cart_id: Option<String>,
}

impl CartSession {
    pub fn new() -> Self {
        Self {
            session_id: format!("session_{}", Uuid::new_v4()),
            cart_id: None,
        }
    }

    /// Resume a session persisted by the caller.
    pub fn resume(session_id: impl Into<String>, cart_id: Option<String>) -> Self {
        Self {
            session_id: session_id.into(),
            cart_id,
        }
    }

    pub fn attach_cart(&mut self, cart_id: impl Into<String>) {
        self.cart_id = Some(cart_id.into());
    }

    /// Forget the cart (after checkout or an explicit clear); the
    /// session id survives so the shopper keeps their identity.
    pub fn detach_cart(&mut self) {
        self.cart_id = None;
    }
}

impl Default for CartSession {
    fn default() -> Self {
        Self::new()
    }
}

/// One display-ready cart line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartLine {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub title: String,
    pub variant_title: Option<String>,
    pub handle: String,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }

    fn from_payload(item: &CartItemPayload) -> Self {
        let product = item.product.as_ref();
        Self {
            id: item.id.clone(),
            product_id: item.product_id.clone(),
            variant_id: item.variant_id.clone(),
            title: product
                .and_then(|p| p.title.clone())
                .unwrap_or_else(|| "Unknown Product".into()),
            variant_title: item.variant.as_ref().and_then(|v| v.title.clone()),
            handle: product.and_then(|p| p.handle.clone()).unwrap_or_default(),
            image_url: product.and_then(|p| p.images.first().map(|i| i.url.clone())),
            price: item.price.unwrap_or_default(),
            quantity: item.quantity,
        }
    }
}

/// Display-ready cart built from a backend cart payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartView {
    pub cart_id: String,
    pub session_id: Option<String>,
    pub lines: Vec<CartLine>,
}

impl CartView {
    pub fn from_payload(payload: &CartPayload) -> Self {
        Self {
            cart_id: payload.id.clone(),
            session_id: payload.session_id.clone(),
            lines: payload.items.iter().map(CartLine::from_payload).collect(),
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc + line.line_total())
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Last segment of a Shopify-style global id
/// (`gid://lumi/Product/42` -> `42`). Plain ids pass through unchanged.
pub fn extract_numeric_id(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}
