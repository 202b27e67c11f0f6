//! End-to-end checkout flow tests: quote, coupon, payment session.

use axum::http::StatusCode;
use driftwood_integration_tests::TestContext;
use rust_decimal::Decimal;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn dec(value: &serde_json::Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn cart_json() -> serde_json::Value {
    serde_json::json!([
        {"productId": 7, "quantity": 2, "unitPrice": "100.00", "name": "Reef Tee"}
    ])
}

fn contact_json() -> serde_json::Value {
    serde_json::json!({
        "firstName": "Aisha", "lastName": "Rahman", "address1": "1 Marina Walk",
        "city": "Dubai", "country": "AE", "email": "aisha@example.net"
    })
}

// =============================================================================
// Quote
// =============================================================================

#[tokio::test]
async fn quote_with_empty_country_makes_no_backend_call() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&ctx.backend)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/quote",
            serde_json::json!({"lines": cart_json(), "country": ""}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shipping"], "0");
    assert_eq!(body["tax"], "0");
    assert_eq!(body["subtotal"], "0");
}

#[tokio::test]
async fn quote_round_trips_a_provisional_order() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 901,
            "total": "236.19",
            "total_tax": "11.19",
            "shipping_total": "25.00",
            "shipping_tax": "1.19",
            "shipping_lines": [{"method_title": "Standard Courier", "total": "25.00"}]
        })))
        .expect(1)
        .mount(&ctx.backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/orders/901"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 901})))
        .mount(&ctx.backend)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/quote",
            serde_json::json!({"lines": cart_json(), "country": "AE", "city": "Dubai"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shipping"], "25.00");
    assert_eq!(body["tax"], "11.19");
    assert_eq!(body["subtotal"], "200.00");
    assert_eq!(body["shippingMethods"][0]["title"], "Standard Courier");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn quote_degrades_to_zeros_when_backend_times_out() {
    let ctx = TestContext::new().await;
    // Longer than the 750ms client timeout configured by the harness.
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(
            ResponseTemplate::new(201).set_delay(std::time::Duration::from_secs(5)),
        )
        .mount(&ctx.backend)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/quote",
            serde_json::json!({"lines": cart_json(), "country": "AE"}),
        )
        .await;

    // Oracle failure is in-band: HTTP stays 200, error field is populated.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shipping"], "0");
    assert_eq!(body["subtotal"], "0");
    assert!(!body["error"].as_str().unwrap().is_empty());
}

// =============================================================================
// Coupon
// =============================================================================

#[tokio::test]
async fn coupon_endpoint_validates_percent_discount() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/coupons"))
        .and(query_param("code", "save10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 3, "code": "save10", "amount": "10", "discount_type": "percent"}
        ])))
        .mount(&ctx.backend)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/coupon",
            serde_json::json!({"code": "SAVE10", "cartTotal": "200.00"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(dec(&body["discount"]), "20.00".parse::<Decimal>().unwrap());
}

#[tokio::test]
async fn coupon_endpoint_fails_closed_when_backend_is_down() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/coupons"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.backend)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/coupon",
            serde_json::json!({"code": "SAVE10", "cartTotal": "200.00"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Invalid coupon code");
}

// =============================================================================
// Payment session
// =============================================================================

#[tokio::test]
async fn session_created_with_rounded_minor_units() {
    let ctx = TestContext::new().await;
    // 19.995 must arrive as 2000 minor units on the wire.
    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(body_string_contains("unit_amount%5D=2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cs_test_round",
            "url": "https://checkout.stripe.test/c/cs_test_round"
        })))
        .expect(1)
        .mount(&ctx.provider)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/session",
            serde_json::json!({
                "lines": [{"productId": 9, "quantity": 1, "unitPrice": "19.995"}],
                "customerEmail": "aisha@example.net",
                "billing": contact_json(),
                "shipping": contact_json()
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_test_round");
    assert_eq!(body["url"], "https://checkout.stripe.test/c/cs_test_round");
}

#[tokio::test]
async fn session_rejects_empty_cart() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post_json(
            "/api/checkout/session",
            serde_json::json!({
                "lines": [],
                "customerEmail": "aisha@example.net",
                "billing": contact_json(),
                "shipping": contact_json()
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn session_rejects_invalid_email() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post_json(
            "/api/checkout/session",
            serde_json::json!({
                "lines": cart_json(),
                "customerEmail": "not-an-email",
                "billing": contact_json(),
                "shipping": contact_json()
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn end_to_end_scenario_validate_quote_and_build() {
    let ctx = TestContext::new().await;

    // SAVE10: percent, 10, no minimum.
    Mock::given(method("GET"))
        .and(path("/coupons"))
        .and(query_param("code", "save10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 3, "code": "save10", "amount": "10", "discount_type": "percent"}
        ])))
        .mount(&ctx.backend)
        .await;
    // Provisional order for the AE destination.
    Mock::given(method("POST"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 905,
            "total": "230.00",
            "total_tax": "10.00",
            "shipping_total": "20.00",
            "shipping_tax": "0.95",
            "shipping_lines": [{"method_title": "Courier", "total": "20.00"}]
        })))
        .mount(&ctx.backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/orders/905"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 905})))
        .mount(&ctx.backend)
        .await;
    // No promotion code resolves; checkout proceeds without the discount.
    Mock::given(method("GET"))
        .and(path("/v1/promotion_codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&ctx.provider)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/coupons/SAVE10"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({})))
        .mount(&ctx.provider)
        .await;
    // quantity=2 at 100.00 -> unit_amount 10000.
    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(body_string_contains("unit_amount%5D=10000"))
        .and(body_string_contains("quantity%5D=2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "cs_test_e2e",
            "url": "https://checkout.stripe.test/c/cs_test_e2e"
        })))
        .expect(1)
        .mount(&ctx.provider)
        .await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout/coupon",
            serde_json::json!({"code": "SAVE10", "cartTotal": "200.00"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(dec(&body["discount"]), "20.00".parse::<Decimal>().unwrap());

    let (status, body) = ctx
        .post_json(
            "/api/checkout/quote",
            serde_json::json!({"lines": cart_json(), "country": "AE"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shipping"], "20.00");
    assert_eq!(body["tax"], "10.00");

    let (status, body) = ctx
        .post_json(
            "/api/checkout/session",
            serde_json::json!({
                "lines": cart_json(),
                "coupon": "SAVE10",
                "customerEmail": "aisha@example.net",
                "billing": contact_json(),
                "shipping": contact_json()
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], "cs_test_e2e");
}
