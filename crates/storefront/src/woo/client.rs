//! HTTP client for the WooCommerce REST API.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::config::WooConfig;

use super::types::{Coupon, CreateOrderRequest, Order};
use super::WooError;

/// WooCommerce REST API client.
///
/// Holds a pooled `reqwest` client with a bounded timeout; credentials are
/// sent as basic auth on every request, which is what the backend expects
/// over HTTPS.
#[derive(Clone)]
pub struct WooClient {
    client: reqwest::Client,
    api_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
}

impl WooClient {
    /// Create a new WooCommerce API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &WooConfig, timeout: Duration) -> Result<Self, WooError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_url)
    }

    /// Create an order.
    ///
    /// Used both for real orders (webhook reconciliation) and for the
    /// provisional orders the quote service creates and discards.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects the order.
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, WooError> {
        let response = self
            .client
            .post(self.url("orders"))
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .json(request)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Delete an order by id. `force=true` bypasses the trash.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend refuses the delete.
    pub async fn delete_order(&self, order_id: i64, force: bool) -> Result<(), WooError> {
        let response = self
            .client
            .delete(self.url(&format!("orders/{order_id}")))
            .query(&[("force", force)])
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WooError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    /// Look up a coupon by exact code.
    ///
    /// The backend matches codes case-insensitively; returns the first match
    /// or `None` when the code is unknown.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn find_coupon(&self, code: &str) -> Result<Option<Coupon>, WooError> {
        let response = self
            .client
            .get(self.url("coupons"))
            .query(&[("code", code)])
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .send()
            .await?;

        let coupons: Vec<Coupon> = Self::parse_json(response).await?;
        Ok(coupons.into_iter().next())
    }

    /// Find orders whose meta holds the given payment session id.
    ///
    /// The backend exposes no direct meta query, so this searches on the
    /// session id (which only ever appears in the meta field) and then
    /// filters on the stored meta value to be exact.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn find_orders_by_session(&self, session_id: &str) -> Result<Vec<Order>, WooError> {
        let response = self
            .client
            .get(self.url("orders"))
            .query(&[("search", session_id), ("per_page", "20")])
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .send()
            .await?;

        let orders: Vec<Order> = Self::parse_json(response).await?;
        Ok(orders
            .into_iter()
            .filter(|o| o.payment_session_id() == Some(session_id))
            .collect())
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, WooError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WooError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| WooError::Parse(e.to_string()))
    }
}
