//! WooCommerce REST wire types.
//!
//! Field names follow the backend's snake_case JSON. Monetary fields arrive
//! as decimal strings and are parsed into [`rust_decimal::Decimal`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::DiscountType;

use crate::models::{ContactDetails, Destination};

/// Order meta key holding the payment session id.
pub const META_PAYMENT_SESSION_ID: &str = "payment_session_id";
/// Order meta key holding the payment intent id.
pub const META_PAYMENT_INTENT_ID: &str = "payment_intent_id";
/// Line-item meta key for the client cart line id.
pub const META_CART_LINE_ID: &str = "cart_line_id";
/// Line-item meta key for bundle composition.
pub const META_BUNDLE: &str = "bundle";

/// A billing or shipping address block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WooAddress {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
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
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&Destination> for WooAddress {
    fn from(dest: &Destination) -> Self {
        Self {
            city: dest.city.clone(),
            state: dest.state.clone(),
            postcode: dest.postcode.clone(),
            country: dest.country.trim().to_uppercase(),
            ..Self::default()
        }
    }
}

impl From<&ContactDetails> for WooAddress {
    fn from(details: &ContactDetails) -> Self {
        Self {
            first_name: details.first_name.clone(),
            last_name: details.last_name.clone(),
            address_1: details.address_1.clone(),
            address_2: details.address_2.clone(),
            city: details.city.clone(),
            state: details.state.clone(),
            postcode: details.postcode.clone(),
            country: details.country.trim().to_uppercase(),
            email: details.email.clone(),
            phone: details.phone.clone(),
        }
    }
}

/// A key/value meta entry on an order or line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaData {
    pub key: String,
    pub value: serde_json::Value,
}

impl MetaData {
    /// Meta entry with a string value.
    #[must_use]
    pub fn string(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            value: serde_json::Value::String(value.into()),
        }
    }
}

/// A line item in an order-creation request.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLineItemRequest {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    pub status: String,
    pub set_paid: bool,
    pub billing: WooAddress,
    pub shipping: WooAddress,
    pub line_items: Vec<OrderLineItemRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub meta_data: Vec<MetaData>,
}

impl CreateOrderRequest {
    /// A provisional, unpaid order used only to read back computed totals.
    #[must_use]
    pub fn provisional(
        destination: &Destination,
        lines: impl IntoIterator<Item = OrderLineItemRequest>,
    ) -> Self {
        let address = WooAddress::from(destination);
        Self {
            status: "pending".to_string(),
            set_paid: false,
            billing: address.clone(),
            shipping: address,
            line_items: lines.into_iter().collect(),
            payment_method: None,
            payment_method_title: None,
            transaction_id: None,
            meta_data: Vec::new(),
        }
    }
}

/// A shipping line on a created order.
#[derive(Debug, Clone, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub method_title: String,
    #[serde(default)]
    pub total: Decimal,
}

/// An order record returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub total_tax: Decimal,
    #[serde(default)]
    pub shipping_total: Decimal,
    #[serde(default)]
    pub shipping_tax: Decimal,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub meta_data: Vec<OrderMetaData>,
}

/// Meta entry as returned on an order (includes the row id).
#[derive(Debug, Clone, Deserialize)]
pub struct OrderMetaData {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl Order {
    /// The payment session id stored in order meta, if any.
    #[must_use]
    pub fn payment_session_id(&self) -> Option<&str> {
        self.meta_data
            .iter()
            .find(|m| m.key == META_PAYMENT_SESSION_ID)
            .and_then(|m| m.value.as_str())
    }
}

/// A coupon record returned by the backend.
///
/// `minimum_amount`/`maximum_amount` of 0 mean "no constraint";
/// `usage_limit` of null means unlimited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub minimum_amount: Decimal,
    #[serde(default)]
    pub maximum_amount: Decimal,
    #[serde(default)]
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub usage_count: u32,
}
