//! HTTP client for the Stripe v1 REST API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;

use crate::config::StripeConfig;

use super::types::{CheckoutSession, List, PromotionCode, SessionLineItem, StripeCoupon};
use super::StripeError;

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    api_url: String,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig, timeout: Duration) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert("Authorization", auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.api_url)
    }

    /// Create a Checkout Session from flattened form params.
    ///
    /// The v1 API takes `application/x-www-form-urlencoded` bodies with
    /// bracketed keys; [`crate::checkout::session`] builds the param list.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Stripe rejects the session.
    pub async fn create_checkout_session(
        &self,
        params: &[(String, String)],
    ) -> Result<CheckoutSession, StripeError> {
        let response = self
            .client
            .post(self.url("checkout/sessions"))
            .form(params)
            .send()
            .await?;

        Self::parse_json(response).await
    }

    /// Fetch a session's line items with the product expanded, so each
    /// item's metadata (product id, cart line id, bundle) is readable.
    ///
    /// Webhook event payloads omit full line-item detail, so the
    /// reconciliation handler always re-fetches through this call.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn list_session_line_items(
        &self,
        session_id: &str,
    ) -> Result<Vec<SessionLineItem>, StripeError> {
        let response = self
            .client
            .get(self.url(&format!("checkout/sessions/{session_id}/line_items")))
            .query(&[("limit", "100"), ("expand[]", "data.price.product")])
            .send()
            .await?;

        let list: List<SessionLineItem> = Self::parse_json(response).await?;
        Ok(list.data)
    }

    /// Resolve an active promotion code by its customer-facing code.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn find_promotion_code(
        &self,
        code: &str,
    ) -> Result<Option<PromotionCode>, StripeError> {
        let response = self
            .client
            .get(self.url("promotion_codes"))
            .query(&[("code", code), ("active", "true"), ("limit", "1")])
            .send()
            .await?;

        let list: List<PromotionCode> = Self::parse_json(response).await?;
        Ok(list.data.into_iter().next())
    }

    /// Fetch a coupon by id. Unknown ids return `None` rather than an error,
    /// since a missing coupon is an expected fallback outcome.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails for any reason other than 404.
    pub async fn get_coupon(&self, coupon_id: &str) -> Result<Option<StripeCoupon>, StripeError> {
        let response = self
            .client
            .get(self.url(&format!("coupons/{coupon_id}")))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let coupon: StripeCoupon = Self::parse_json(response).await?;
        Ok(Some(coupon))
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StripeError> {
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}
