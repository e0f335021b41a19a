use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use repay::api::router;

async fn send(request: Request<Body>) -> (StatusCode, Value, Option<String>) {
    let response = router().oneshot(request).await.expect("router responds");
    let status = response.status();
    let cache = response
        .headers()
        .get(header::CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let body = serde_json::from_slice(&bytes).expect("json body");
    (status, body, cache)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

fn assert_approx(actual: &Value, expected: f64) {
    let actual = actual.as_f64().expect("number");
    assert!(
        (actual - expected).abs() <= 0.005,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn mortgage_post_returns_both_payments() {
    let (status, body, cache) = send(post_json(
        "/api/mortgage",
        json!({
            "principal": 200000,
            "initialAnnualRatePercent": 4.5,
            "secondaryAnnualRatePercent": 6.5,
            "loanTermYears": 25,
            "fixedTermYears": 5
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("no-store"));
    assert_approx(&body["initialMonthlyPayment"], 1111.66);
    assert_approx(&body["secondaryMonthlyPayment"], 1310.09);
    assert_approx(&body["remainingBalanceAfterFixedTerm"], 175_715.81);
    assert_eq!(body["yearsRemaining"], json!({"years": 25.0}));
}

#[tokio::test]
async fn mortgage_get_accepts_form_text() {
    let (status, body, _) = send(get(
        "/api/mortgage?principal=200%2C000&initialRate=4.5&loanTerm=25&fixedTerm=25&overpayment=",
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_approx(&body["initialMonthlyPayment"], 1111.66);
    assert!(body["secondaryMonthlyPayment"].is_null());
    assert!(body["remainingBalanceAfterFixedTerm"].is_null());
}

#[tokio::test]
async fn mortgage_missing_secondary_rate_is_bad_request() {
    let (status, body, _) = send(post_json(
        "/api/mortgage",
        json!({
            "principal": 200000,
            "initialRate": 4.5,
            "loanTerm": 25,
            "fixedTerm": 5
        }),
    ))
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "secondaryAnnualRatePercent");
}

#[tokio::test]
async fn payoff_defaults_apr_and_payment() {
    let (status, body, _) = send(post_json("/api/payoff", json!({"balance": "5,000"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["usedAPR"], 25.0);
    assert_approx(&body["monthlyPayment"], 229.17);
    assert_eq!(body["canPayOff"], true);
    assert_eq!(body["growingDebt"], false);
    assert_eq!(body["termination"], "paidOff");
    assert_eq!(body["payoffMonths"], 30);
    assert_approx(&body["breakdown"]["principal"], 5_000.0);
}

#[tokio::test]
async fn payoff_low_payment_reports_growing_debt() {
    let (status, body, _) = send(get(
        "/api/payoff?outstandingBalance=5000&apr=25&monthlyPayment=10",
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["growingDebt"], true);
    assert_eq!(body["canPayOff"], false);
    assert_eq!(body["belowSafeMinimum"], true);
    assert_eq!(body["termination"], "diverging");
}

#[tokio::test]
async fn payoff_rejects_non_positive_balance() {
    let (status, body, _) = send(post_json("/api/payoff", json!({"balance": 0}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "outstandingBalance");
}

#[tokio::test]
async fn health_and_fallback() {
    let (status, body, _) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body, cache) = send(get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not found");
    assert_eq!(cache.as_deref(), Some("no-store"));
}
