//! Core types for Driftwood.
//!
//! This module provides money arithmetic and coupon domain types shared
//! between the storefront server and its tests.

pub mod coupon;
pub mod money;

pub use coupon::DiscountType;
pub use money::{format_amount, to_minor_units, MoneyError};
