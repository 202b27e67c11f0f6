//! The checkout price-reconciliation core.
//!
//! # Flow
//!
//! ```text
//! client cart
//!   -> quote      (provisional backend order round trip, display totals)
//!   -> coupon     (validate a discount code against backend rules)
//!   -> session    (build a hosted payment session from the cart)
//!   -> reconcile  (webhook turns a completed session into one backend order)
//! ```
//!
//! Quotes are informational only; the payment provider computes the
//! authoritative charge from the submitted line items, and the webhook
//! reconstructs the order from session metadata rather than any earlier
//! quote.

pub mod coupon;
pub mod quote;
pub mod reconcile;
pub mod session;

pub use coupon::{validate_coupon, CouponValidation};
pub use quote::quote;
pub use reconcile::{process_event, ReconcileOutcome};
pub use session::build_session;
