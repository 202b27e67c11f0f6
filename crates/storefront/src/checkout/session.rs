//! Payment session construction.
//!
//! Transforms the submitted cart into a hosted Checkout Session. The session
//! is the last hand-off before money moves: the provider computes the
//! authoritative charge from these line items, and the webhook later
//! reconstructs the backend order from the metadata attached here. Nothing
//! is persisted locally - a session stranded by a crash simply expires at
//! the provider.

use driftwood_core::{to_minor_units, MoneyError};
use thiserror::Error;
use tracing::instrument;

use crate::config::StorefrontConfig;
use crate::models::{CheckoutRequest, CreatedSession};
use crate::stripe::{StripeClient, StripeError};
use crate::stripe::types::{METADATA_BILLING_DETAILS, METADATA_SHIPPING_DETAILS};

/// Errors building a payment session.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A line item's unit price cannot be expressed in minor units.
    #[error("invalid line amount: {0}")]
    Amount(#[from] MoneyError),

    /// A metadata block failed to serialize.
    #[error("metadata serialization: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The payment provider rejected the session.
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// Build a hosted payment session for the submitted cart.
///
/// Coupon resolution is fail-open: an unresolvable or erroring coupon is
/// logged and dropped rather than blocking the sale. Everything else is
/// fail-closed - a session the provider rejects is a checkout failure.
///
/// # Errors
///
/// Returns [`BuildError`] if an amount is unrepresentable or the provider
/// rejects the session.
#[instrument(skip(stripe, config, request), fields(line_count = request.lines.len()))]
pub async fn build_session(
    stripe: &StripeClient,
    config: &StorefrontConfig,
    request: &CheckoutRequest,
) -> Result<CreatedSession, BuildError> {
    let mut params = session_params(config, request)?;

    if let Some(code) = request.coupon.as_deref() {
        if let Some((key, value)) = resolve_discount(stripe, code).await {
            params.push((key, value));
        }
    }

    let session = stripe.create_checkout_session(&params).await?;
    let url = session
        .url
        .ok_or_else(|| StripeError::MissingRedirectUrl(session.id.clone()))?;

    tracing::info!(session_id = %session.id, "Payment session created");
    Ok(CreatedSession {
        session_id: session.id,
        url,
    })
}

/// Flatten the cart into the provider's bracketed form params.
///
/// Split out from [`build_session`] so the encoding (rounding included) is
/// testable without a provider in the loop.
pub fn session_params(
    config: &StorefrontConfig,
    request: &CheckoutRequest,
) -> Result<Vec<(String, String)>, BuildError> {
    let currency = config.currency.to_lowercase();
    let mut params: Vec<(String, String)> = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "success_url".to_string(),
            format!(
                "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
                config.base_url
            ),
        ),
        ("cancel_url".to_string(), format!("{}/checkout", config.base_url)),
        ("customer_email".to_string(), request.customer_email.clone()),
    ];

    for (i, country) in config.allowed_countries.iter().enumerate() {
        params.push((
            format!("shipping_address_collection[allowed_countries][{i}]"),
            country.clone(),
        ));
    }

    // The webhook reconstructs the order from these blobs, not from the
    // provider's native address fields.
    params.push((
        format!("metadata[{METADATA_BILLING_DETAILS}]"),
        serde_json::to_string(&request.billing)?,
    ));
    params.push((
        format!("metadata[{METADATA_SHIPPING_DETAILS}]"),
        serde_json::to_string(&request.shipping)?,
    ));

    for (i, line) in request.lines.iter().enumerate() {
        let unit_amount = to_minor_units(line.unit_price)?;
        let prefix = format!("line_items[{i}]");

        params.push((format!("{prefix}[quantity]"), line.quantity.to_string()));
        params.push((format!("{prefix}[price_data][currency]"), currency.clone()));
        params.push((
            format!("{prefix}[price_data][unit_amount]"),
            unit_amount.to_string(),
        ));
        params.push((
            format!("{prefix}[price_data][product_data][name]"),
            line.display_name(),
        ));
        params.push((
            format!("{prefix}[price_data][product_data][metadata][product_id]"),
            line.product_id.to_string(),
        ));
        if let Some(cart_line_id) = &line.cart_line_id {
            params.push((
                format!("{prefix}[price_data][product_data][metadata][cart_line_id]"),
                cart_line_id.clone(),
            ));
        }
        if let Some(bundle) = &line.bundle {
            params.push((
                format!("{prefix}[price_data][product_data][metadata][bundle]"),
                serde_json::to_string(bundle)?,
            ));
        }
    }

    Ok(params)
}

/// Resolve a coupon code to a session discount param.
///
/// Tries an active promotion code first, then a raw provider coupon id.
/// Returns `None` (and logs) when the code resolves to nothing or the
/// lookups error - coupon trouble must never block a sale.
async fn resolve_discount(stripe: &StripeClient, code: &str) -> Option<(String, String)> {
    match stripe.find_promotion_code(code).await {
        Ok(Some(promo)) => {
            return Some(("discounts[0][promotion_code]".to_string(), promo.id));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(code = %code, error = %e, "Promotion code lookup failed, continuing without discount");
            return None;
        }
    }

    match stripe.get_coupon(code).await {
        Ok(Some(coupon)) => Some(("discounts[0][coupon]".to_string(), coupon.id)),
        Ok(None) => {
            tracing::warn!(code = %code, "Coupon not resolvable at provider, continuing without discount");
            None
        }
        Err(e) => {
            tracing::warn!(code = %code, error = %e, "Coupon lookup failed, continuing without discount");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::{StripeConfig, WooConfig};
    use crate::models::{CartLine, ContactDetails};
    use secrecy::SecretString;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.test".to_string(),
            currency: "AED".to_string(),
            allowed_countries: vec!["AE".to_string()],
            backend_timeout: Duration::from_secs(2),
            woo: WooConfig {
                api_url: "https://shop.test/wp-json/wc/v3".to_string(),
                consumer_key: "ck_test".to_string(),
                consumer_secret: SecretString::from("cs_test"),
            },
            stripe: StripeConfig {
                api_url: "https://api.stripe.test".to_string(),
                secret_key: SecretString::from("sk_test"),
                webhook_secret: SecretString::from("whsec_test"),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    fn test_request(lines: Vec<CartLine>) -> CheckoutRequest {
        CheckoutRequest {
            lines,
            coupon: None,
            customer_email: "aisha@example.net".to_string(),
            billing: ContactDetails {
                first_name: "Aisha".to_string(),
                country: "AE".to_string(),
                ..ContactDetails::default()
            },
            shipping: ContactDetails {
                first_name: "Aisha".to_string(),
                country: "AE".to_string(),
                ..ContactDetails::default()
            },
        }
    }

    fn line(unit_price: &str, quantity: u32) -> CartLine {
        CartLine {
            product_id: 7,
            quantity,
            unit_price: unit_price.parse().unwrap(),
            name: Some("Reef Tee".to_string()),
            cart_line_id: Some("line-1".to_string()),
            bundle: None,
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> &'a str {
        &params
            .iter()
            .find(|(k, _)| k == key)
            .unwrap_or_else(|| panic!("missing param {key}"))
            .1
    }

    #[test]
    fn test_params_round_half_up_to_minor_units() {
        let params = session_params(&test_config(), &test_request(vec![line("19.995", 1)])).unwrap();
        // 19.995 rounds to 2000 minor units, never truncates to 1999.
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), "2000");
    }

    #[test]
    fn test_params_carry_line_identity() {
        let params = session_params(&test_config(), &test_request(vec![line("100.00", 2)])).unwrap();
        assert_eq!(param(&params, "line_items[0][quantity]"), "2");
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), "10000");
        assert_eq!(param(&params, "line_items[0][price_data][currency]"), "aed");
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][name]"),
            "Reef Tee"
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][metadata][product_id]"),
            "7"
        );
        assert_eq!(
            param(&params, "line_items[0][price_data][product_data][metadata][cart_line_id]"),
            "line-1"
        );
    }

    #[test]
    fn test_params_serialize_contact_blobs() {
        let params = session_params(&test_config(), &test_request(vec![line("10.00", 1)])).unwrap();
        let blob = param(&params, "metadata[billing_details]");
        let parsed: ContactDetails = serde_json::from_str(blob).unwrap();
        assert_eq!(parsed.first_name, "Aisha");
        assert_eq!(parsed.country, "AE");
    }

    #[test]
    fn test_params_allowed_countries() {
        let mut config = test_config();
        config.allowed_countries = vec!["AE".to_string(), "SA".to_string()];
        let params = session_params(&config, &test_request(vec![line("10.00", 1)])).unwrap();
        assert_eq!(
            param(&params, "shipping_address_collection[allowed_countries][0]"),
            "AE"
        );
        assert_eq!(
            param(&params, "shipping_address_collection[allowed_countries][1]"),
            "SA"
        );
    }

    #[tokio::test]
    async fn test_unresolvable_coupon_fails_open() {
        let server = MockServer::start().await;
        let mut config = test_config();
        config.stripe.api_url = server.uri();
        let stripe = StripeClient::new(&config.stripe, Duration::from_secs(2)).unwrap();

        Mock::given(method("GET"))
            .and(path("/v1/promotion_codes"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/coupons/BROKEN"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;
        // Session creation must still happen, without any discounts param.
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_nodiscount",
                "url": "https://checkout.stripe.test/c/cs_test_nodiscount"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = test_request(vec![line("10.00", 1)]);
        request.coupon = Some("BROKEN".to_string());

        let created = build_session(&stripe, &config, &request).await.unwrap();
        assert_eq!(created.session_id, "cs_test_nodiscount");
    }

    #[tokio::test]
    async fn test_promotion_code_attached_as_discount() {
        let server = MockServer::start().await;
        let mut config = test_config();
        config.stripe.api_url = server.uri();
        let stripe = StripeClient::new(&config.stripe, Duration::from_secs(2)).unwrap();

        Mock::given(method("GET"))
            .and(path("/v1/promotion_codes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"id": "promo_123", "active": true}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("promo_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_test_promo",
                "url": "https://checkout.stripe.test/c/cs_test_promo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = test_request(vec![line("10.00", 1)]);
        request.coupon = Some("SAVE10".to_string());

        let created = build_session(&stripe, &config, &request).await.unwrap();
        assert_eq!(created.session_id, "cs_test_promo");
    }
}
