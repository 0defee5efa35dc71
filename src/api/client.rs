//! Async HTTP client for the backend API.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use validator::Validate;

use crate::api::{
    AddToCartItem, CartPayload, DataEnvelope, OrderPayload, Paginated, PlacedOrder, ProductQuery,
    VariantAvailability,
};
use crate::catalog::Product;
use crate::checkout::CheckoutRequest;
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};

/// Client for the backend REST API. Cheap to clone; holds a pooled
/// `reqwest` client internally.
#[derive(Clone)]
pub struct BackendClient {
    base: Url,
    http: reqwest::Client,
    token: Option<String>,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base", &self.base)
            .field("max_retries", &self.max_retries)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl BackendClient {
    pub fn new(config: &StorefrontConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base: config.api_base.clone(),
            http,
            token: None,
            max_retries: config.max_retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    /// Attach a bearer token for endpoints that require a signed-in
    /// customer (orders history, cancellation).
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined)?)
    }

    /// Send a request, retrying 429/5xx and connect/timeout failures
    /// with exponential backoff. Other error statuses fail fast.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let max_attempts = self.max_retries.max(1);
        let mut last_error: Option<StorefrontError> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = self.retry_delay_ms * 2_u64.pow(attempt.saturating_sub(1));
                tokio::time::sleep(Duration::from_millis(delay)).await;
                tracing::debug!(attempt, %url, "retrying backend request");
            }

            let mut request = self.http.request(method.clone(), url.clone());
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!(%status, %url, "backend response");
                    if status.is_success() {
                        return Ok(response.json::<T>().await?);
                    }
                    let message = response.text().await.unwrap_or_default();
                    let error = StorefrontError::Api {
                        status: status.as_u16(),
                        message,
                    };
                    if status.as_u16() == 429 || status.is_server_error() {
                        tracing::warn!(%status, %url, "backend request failed, will retry");
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
                Err(error) => {
                    if error.is_timeout() || error.is_connect() {
                        tracing::warn!(%url, "backend unreachable, will retry");
                        last_error = Some(error.into());
                        continue;
                    }
                    return Err(error.into());
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| StorefrontError::Config("request failed with no attempts".into())))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.execute(Method::GET, url, None).await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T> {
        self.execute(method, url, Some(serde_json::to_value(body)?))
            .await
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    pub async fn list_products(&self, query: &ProductQuery) -> Result<Paginated<Product>> {
        let mut url = self.endpoint("/products")?;
        query.apply(&mut url);
        self.get(url).await
    }

    pub async fn search_products(
        &self,
        search: &str,
        query: &ProductQuery,
    ) -> Result<Paginated<Product>> {
        let mut url = self.endpoint("/products/search")?;
        url.query_pairs_mut().append_pair("q", search);
        query.apply(&mut url);
        self.get(url).await
    }

    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>> {
        let mut url = self.endpoint("/products/featured")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let envelope: DataEnvelope<Vec<Product>> = self.get(url).await?;
        Ok(envelope.data)
    }

    pub async fn product_by_handle(&self, handle: &str) -> Result<Product> {
        let url = self.endpoint(&format!("/products/{handle}"))?;
        self.get(url).await
    }

    pub async fn product_by_id(&self, id: &str) -> Result<Product> {
        let url = self.endpoint(&format!("/products/id/{id}"))?;
        self.get(url).await
    }

    /// Live stock snapshot for the given variants, used to refresh the
    /// resolver's inputs before add-to-cart.
    pub async fn check_variant_availability(
        &self,
        variant_ids: &[String],
    ) -> Result<Vec<VariantAvailability>> {
        let url = self.endpoint("/products/variants/check-availability")?;
        let body = serde_json::json!({ "variantIds": variant_ids });
        let envelope: DataEnvelope<Vec<VariantAvailability>> =
            self.send_json(Method::POST, url, &body).await?;
        Ok(envelope.data)
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    pub async fn get_cart(&self, cart_id: &str) -> Result<CartPayload> {
        let mut url = self.endpoint("/cart")?;
        url.query_pairs_mut().append_pair("cartId", cart_id);
        let envelope: DataEnvelope<CartPayload> = self.get(url).await?;
        Ok(envelope.data)
    }

    pub async fn create_cart(&self, session_id: &str) -> Result<CartPayload> {
        let url = self.endpoint("/cart")?;
        let body = serde_json::json!({ "sessionId": session_id });
        let envelope: DataEnvelope<CartPayload> = self.send_json(Method::POST, url, &body).await?;
        Ok(envelope.data)
    }

    pub async fn add_to_cart(&self, cart_id: &str, item: &AddToCartItem) -> Result<CartPayload> {
        let url = self.endpoint(&format!("/cart/{cart_id}/items"))?;
        let envelope: DataEnvelope<CartPayload> = self.send_json(Method::POST, url, item).await?;
        Ok(envelope.data)
    }

    pub async fn update_cart_item(
        &self,
        cart_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> Result<CartPayload> {
        let url = self.endpoint(&format!("/cart/{cart_id}/items/{item_id}"))?;
        let body = serde_json::json!({ "quantity": quantity });
        let envelope: DataEnvelope<CartPayload> = self.send_json(Method::PUT, url, &body).await?;
        Ok(envelope.data)
    }

    pub async fn remove_cart_item(&self, cart_id: &str, item_id: &str) -> Result<CartPayload> {
        let url = self.endpoint(&format!("/cart/{cart_id}/items/{item_id}"))?;
        let envelope: DataEnvelope<CartPayload> = self.execute(Method::DELETE, url, None).await?;
        Ok(envelope.data)
    }

    pub async fn clear_cart(&self, cart_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("/cart/{cart_id}"))?;
        let _: serde_json::Value = self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Merge an anonymous session cart into a signed-in customer's cart.
    pub async fn merge_carts(
        &self,
        session_cart_id: &str,
        user_cart_id: Option<&str>,
    ) -> Result<CartPayload> {
        let url = self.endpoint("/cart/merge")?;
        let body = serde_json::json!({
            "sessionCartId": session_cart_id,
            "userCartId": user_cart_id,
        });
        let envelope: DataEnvelope<CartPayload> = self.send_json(Method::POST, url, &body).await?;
        Ok(envelope.data)
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Validate and submit an order.
    pub async fn place_order(&self, request: &CheckoutRequest) -> Result<PlacedOrder> {
        request.validate()?;
        let url = self.endpoint("/orders")?;
        self.send_json(Method::POST, url, request).await
    }

    /// Guest order lookup: order number plus the email it was placed with.
    pub async fn order_by_number(&self, order_number: &str, email: &str) -> Result<OrderPayload> {
        let mut url = self.endpoint(&format!("/orders/number/{order_number}"))?;
        url.query_pairs_mut().append_pair("email", email);
        let envelope: DataEnvelope<OrderPayload> = self.get(url).await?;
        Ok(envelope.data)
    }

    /// Signed-in customer's order history; requires a bearer token.
    pub async fn my_orders(&self, page: u32, limit: u32) -> Result<Paginated<OrderPayload>> {
        let mut url = self.endpoint("/orders/me")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        self.get(url).await
    }

    pub async fn cancel_order(&self, order_id: &str, reason: &str) -> Result<OrderPayload> {
        let url = self.endpoint(&format!("/orders/{order_id}/cancel"))?;
        let body = serde_json::json!({ "reason": reason });
        let envelope: DataEnvelope<OrderPayload> = self.send_json(Method::POST, url, &body).await?;
        Ok(envelope.data)
    }
}
