//! LUMI Storefront
//!
//! Presentation/orchestration layer over the LUMI commerce backend.
//! All business logic (inventory, pricing, payments, order persistence)
//! lives in the backend service; this crate consumes its HTTP API and
//! resolves what the storefront should show and sell.
//!
//! ## Features
//! - Typed catalog model for the backend's product JSON
//! - Variant availability and option resolution
//! - Async backend API client (products, cart, orders)
//! - Cart sessions, cart view models, checkout payloads

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;

pub use api::client::BackendClient;
pub use catalog::resolver::{
    compute_availability, is_value_available, resolve_exact_variant, resolve_images, Combination,
    Selection,
};
pub use catalog::{
    InventoryPolicy, Money, Product, ProductImage, ProductOption, ProductVariant, SelectedOption,
};
pub use checkout::CheckoutRequest;
pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};

/// Install a global tracing subscriber driven by `RUST_LOG`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
