//! Checkout API route handlers.

use axum::{extract::State, Json};
use tracing::instrument;

use crate::checkout;
use crate::error::{AppError, Result};
use crate::models::{
    CheckoutRequest, CouponRequest, CreatedSession, QuoteRequest, QuoteResult,
};
use crate::state::AppState;

/// Quote shipping and tax for a cart + destination.
///
/// POST /api/checkout/quote
///
/// Always 200; an unreachable pricing oracle degrades to zeroed totals with
/// an in-band `error` message.
#[instrument(skip(state, request), fields(country = %request.country))]
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Json<QuoteResult> {
    let destination = request.destination();
    Json(checkout::quote(state.woo(), &request.lines, &destination).await)
}

/// Validate a discount code against the cart total.
///
/// POST /api/checkout/coupon
#[instrument(skip(state, request), fields(code = %request.code))]
pub async fn validate_coupon(
    State(state): State<AppState>,
    Json(request): Json<CouponRequest>,
) -> Json<checkout::CouponValidation> {
    Json(
        checkout::validate_coupon(
            state.woo(),
            &state.config().currency,
            &request.code,
            request.cart_total,
        )
        .await,
    )
}

/// Create a hosted payment session for the submitted cart.
///
/// POST /api/checkout/session
#[instrument(skip(state, request), fields(email = %request.customer_email))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CreatedSession>> {
    if request.lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }
    if !request.customer_email.contains('@') {
        return Err(AppError::BadRequest(
            "A valid email address is required".to_string(),
        ));
    }
    if request.shipping.country.trim().is_empty() {
        return Err(AppError::BadRequest(
            "A shipping country is required".to_string(),
        ));
    }

    let created =
        checkout::build_session(state.stripe(), state.config(), &request).await?;
    Ok(Json(created))
}
