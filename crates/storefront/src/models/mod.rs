//! Request/response models for the checkout API.
//!
//! These are the shapes exchanged with the browser cart, so field names are
//! camelCase. Wire types for the external services live in [`crate::woo`]
//! and [`crate::stripe`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cart line as held by the client session.
///
/// Never persisted server-side; the client cart is the source of truth until
/// a payment session is created from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Backend product id.
    pub product_id: i64,
    /// Quantity, at least 1.
    pub quantity: u32,
    /// Unit price in major currency units.
    pub unit_price: Decimal,
    /// Display name for the payment-provider line item.
    #[serde(default)]
    pub name: Option<String>,
    /// Client-side cart line identifier, round-tripped through the
    /// payment session so the webhook can reconstruct the order.
    #[serde(default)]
    pub cart_line_id: Option<String>,
    /// Opaque bundle composition attached by the client cart.
    #[serde(default)]
    pub bundle: Option<serde_json::Value>,
}

impl CartLine {
    /// Display name, falling back to the product id.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Product #{}", self.product_id))
    }
}

/// A shipping destination. Only `country` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    /// ISO-3166 alpha-2 country code.
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
}

impl Destination {
    /// Whether this destination carries enough information to quote against.
    #[must_use]
    pub fn is_quotable(&self) -> bool {
        !self.country.trim().is_empty()
    }
}

/// Contact details for billing or shipping, as submitted at checkout and as
/// serialized into payment-session metadata.
///
/// The webhook handler treats the deserialized form of this struct as the
/// authoritative order address, so its shape is a serialization contract:
/// adding required fields breaks reconciliation of in-flight sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_1: String,
    #[serde(default)]
    pub address_2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    pub country: String,
}

/// Request body for `POST /api/checkout/quote`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub lines: Vec<CartLine>,
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub city: String,
}

impl QuoteRequest {
    /// The destination portion of the request.
    #[must_use]
    pub fn destination(&self) -> Destination {
        Destination {
            country: self.country.clone(),
            state: self.state.clone(),
            postcode: self.postcode.clone(),
            city: self.city.clone(),
        }
    }
}

/// A shipping method descriptor surfaced from the pricing oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    pub title: String,
    pub total: Decimal,
}

/// Result of a shipping/tax quote.
///
/// Derived, never persisted; recomputed on every destination or cart change.
/// A populated `error` means the pricing oracle was unreachable and the
/// zeroed amounts are provisional, not authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub shipping: Decimal,
    pub tax: Decimal,
    pub subtotal: Decimal,
    pub shipping_methods: Vec<ShippingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QuoteResult {
    /// Zeroed quote for carts that are not yet quotable.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            shipping_methods: Vec::new(),
            error: None,
        }
    }

    /// Zeroed quote carrying the reason the oracle was unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty()
        }
    }
}

/// Request body for `POST /api/checkout/coupon`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRequest {
    #[serde(default)]
    pub code: String,
    pub cart_total: Decimal,
}

/// Request body for `POST /api/checkout/session`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub coupon: Option<String>,
    pub customer_email: String,
    pub billing: ContactDetails,
    pub shipping: ContactDetails,
}

/// Response body for `POST /api/checkout/session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedSession {
    pub session_id: String,
    pub url: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_line_deserializes_camel_case() {
        let line: CartLine = serde_json::from_str(
            r#"{"productId": 7, "quantity": 2, "unitPrice": "100.00"}"#,
        )
        .unwrap();
        assert_eq!(line.product_id, 7);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, "100.00".parse().unwrap());
        assert!(line.cart_line_id.is_none());
    }

    #[test]
    fn test_destination_quotable() {
        let dest = Destination {
            country: "AE".to_string(),
            ..Destination::default()
        };
        assert!(dest.is_quotable());

        let dest = Destination {
            country: "   ".to_string(),
            ..Destination::default()
        };
        assert!(!dest.is_quotable());
    }

    #[test]
    fn test_quote_result_error_omitted_when_none() {
        let json = serde_json::to_value(QuoteResult::empty()).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["shipping"], "0");
    }

    #[test]
    fn test_quote_result_unavailable() {
        let quote = QuoteResult::unavailable("oracle down");
        assert_eq!(quote.shipping, Decimal::ZERO);
        assert_eq!(quote.error.as_deref(), Some("oracle down"));
    }

    #[test]
    fn test_contact_details_round_trip() {
        let details = ContactDetails {
            first_name: "Aisha".to_string(),
            last_name: "Rahman".to_string(),
            email: Some("aisha@example.net".to_string()),
            address_1: "1 Marina Walk".to_string(),
            city: "Dubai".to_string(),
            country: "AE".to_string(),
            ..ContactDetails::default()
        };
        let blob = serde_json::to_string(&details).unwrap();
        let parsed: ContactDetails = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed.first_name, "Aisha");
        assert_eq!(parsed.country, "AE");
    }
}
