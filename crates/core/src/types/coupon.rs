//! Coupon discount types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount type of a backend coupon.
///
/// Matches the commerce backend's `discount_type` field. The backend may grow
/// new types; unknown values deserialize to [`DiscountType::Other`] and yield
/// no discount rather than failing the lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percentage of the cart total.
    Percent,
    /// Flat amount off the whole cart.
    #[default]
    FixedCart,
    /// Flat amount off each matching product. Not applied cart-wide.
    FixedProduct,
    /// Unrecognized backend discount type.
    #[serde(other)]
    Other,
}

impl DiscountType {
    /// Compute the discount this type grants against a cart total.
    ///
    /// Percent is `cart_total * amount / 100`; fixed-cart is the flat
    /// amount verbatim. The result is deliberately not floored at zero and
    /// not clamped to the cart total - the backend's semantics pass through
    /// unchanged, so an over-large fixed coupon can exceed the cart total.
    #[must_use]
    pub fn discount_for(self, cart_total: Decimal, amount: Decimal) -> Decimal {
        match self {
            Self::Percent => cart_total * amount / Decimal::ONE_HUNDRED,
            Self::FixedCart => amount,
            Self::FixedProduct | Self::Other => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_percent_discount() {
        let discount = DiscountType::Percent.discount_for(dec("200.00"), dec("10"));
        assert_eq!(discount, dec("20.00"));
    }

    #[test]
    fn test_fixed_cart_discount() {
        let discount = DiscountType::FixedCart.discount_for(dec("200.00"), dec("15"));
        assert_eq!(discount, dec("15"));
    }

    #[test]
    fn test_fixed_cart_can_exceed_total() {
        // Backend pass-through: no clamping to the cart total.
        let discount = DiscountType::FixedCart.discount_for(dec("10.00"), dec("50"));
        assert_eq!(discount, dec("50"));
    }

    #[test]
    fn test_unknown_type_yields_no_discount() {
        let discount = DiscountType::Other.discount_for(dec("100.00"), dec("10"));
        assert_eq!(discount, Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_known_and_unknown() {
        let t: DiscountType = serde_json::from_str("\"percent\"").unwrap();
        assert_eq!(t, DiscountType::Percent);
        let t: DiscountType = serde_json::from_str("\"fixed_cart\"").unwrap();
        assert_eq!(t, DiscountType::FixedCart);
        let t: DiscountType = serde_json::from_str("\"buy_x_get_y\"").unwrap();
        assert_eq!(t, DiscountType::Other);
    }
}
