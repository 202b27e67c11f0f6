//! Coupon validation against backend-supplied rules.
//!
//! Stateless: one read-only lookup per validation, no usage tracking here
//! (the backend increments usage when the order lands). Lookup failures are
//! fail-closed - an unreachable coupon store reads as an invalid code - but
//! logged so a coupon outage is observable rather than silent.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use driftwood_core::{format_amount, DiscountType};

use crate::woo::{Coupon, WooClient};

/// Result of validating a discount code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<AppliedCoupon>,
    pub message: String,
}

/// The coupon fields the client needs to redisplay an applied discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub amount: Decimal,
}

impl CouponValidation {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            discount: None,
            coupon: None,
            message: message.into(),
        }
    }

    fn applied(coupon: &Coupon, discount: Decimal) -> Self {
        Self {
            valid: true,
            discount: Some(discount),
            coupon: Some(AppliedCoupon {
                code: coupon.code.clone(),
                discount_type: coupon.discount_type,
                amount: coupon.amount,
            }),
            message: "Coupon applied".to_string(),
        }
    }
}

/// Validate a discount code against the backend's coupon rules and a cart
/// total.
///
/// Codes are matched case-insensitively; the backend stores them lower-case.
pub async fn validate_coupon(
    woo: &WooClient,
    currency: &str,
    code: &str,
    cart_total: Decimal,
) -> CouponValidation {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        return CouponValidation::invalid("Invalid coupon code");
    }

    let coupon = match woo.find_coupon(&code).await {
        Ok(Some(coupon)) => coupon,
        Ok(None) => return CouponValidation::invalid("Invalid coupon code"),
        Err(e) => {
            // Fail-closed for the customer, loud for operators: a coupon
            // store outage silently eating discounts is a revenue incident.
            tracing::warn!(code = %code, error = %e, "Coupon lookup failed");
            return CouponValidation::invalid("Invalid coupon code");
        }
    };

    if coupon.id == 0 {
        return CouponValidation::invalid("Invalid coupon code");
    }

    if coupon.minimum_amount > Decimal::ZERO && cart_total < coupon.minimum_amount {
        return CouponValidation::invalid(format!(
            "The minimum spend for this coupon is {}",
            format_amount(currency, coupon.minimum_amount)
        ));
    }

    if coupon.maximum_amount > Decimal::ZERO && cart_total > coupon.maximum_amount {
        return CouponValidation::invalid(format!(
            "The maximum spend for this coupon is {}",
            format_amount(currency, coupon.maximum_amount)
        ));
    }

    if let Some(limit) = coupon.usage_limit {
        if coupon.usage_count >= limit {
            return CouponValidation::invalid("This coupon has reached its usage limit");
        }
    }

    let discount = coupon.discount_type.discount_for(cart_total, coupon.amount);
    CouponValidation::applied(&coupon, discount)
}
