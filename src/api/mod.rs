use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::{
    CalcError, CalcResult, LoanInput, PayoffInput, compute_mortgage, compute_payoff,
    formula::parse_amount,
};

/// A form amount sent either as a JSON number or as user-typed text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum AmountField {
    Number(f64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MortgagePayload {
    principal: Option<AmountField>,
    #[serde(alias = "initialRate")]
    initial_annual_rate_percent: Option<AmountField>,
    #[serde(alias = "secondaryRate")]
    secondary_annual_rate_percent: Option<AmountField>,
    #[serde(alias = "loanTerm")]
    loan_term_years: Option<AmountField>,
    #[serde(alias = "fixedTerm")]
    fixed_term_years: Option<AmountField>,
    overpayment: Option<AmountField>,
    #[serde(alias = "target")]
    target_years: Option<AmountField>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PayoffPayload {
    #[serde(alias = "balance")]
    outstanding_balance: Option<AmountField>,
    #[serde(alias = "apr")]
    annual_rate_percent: Option<AmountField>,
    #[serde(alias = "target")]
    target_years: Option<AmountField>,
    overpayment: Option<AmountField>,
    monthly_payment: Option<AmountField>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    field: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn amount(field: &'static str, value: Option<AmountField>) -> CalcResult<Option<f64>> {
    match value {
        None => Ok(None),
        Some(AmountField::Number(v)) => Ok(Some(v)),
        Some(AmountField::Text(raw)) if raw.trim().is_empty() => Ok(None),
        Some(AmountField::Text(raw)) => parse_amount(&raw)
            .map(Some)
            .ok_or_else(|| CalcError::invalid(field, "must be a number")),
    }
}

fn required(field: &'static str, value: Option<AmountField>) -> CalcResult<f64> {
    amount(field, value)?.ok_or_else(|| CalcError::invalid(field, "is required"))
}

fn loan_input_from_payload(payload: MortgagePayload) -> CalcResult<LoanInput> {
    Ok(LoanInput {
        principal: required("principal", payload.principal)?,
        initial_annual_rate_percent: required(
            "initialAnnualRatePercent",
            payload.initial_annual_rate_percent,
        )?,
        secondary_annual_rate_percent: amount(
            "secondaryAnnualRatePercent",
            payload.secondary_annual_rate_percent,
        )?,
        loan_term_years: required("loanTermYears", payload.loan_term_years)?,
        fixed_term_years: required("fixedTermYears", payload.fixed_term_years)?,
        overpayment: amount("overpayment", payload.overpayment)?.unwrap_or(0.0),
        target_years: amount("targetYears", payload.target_years)?,
    })
}

fn payoff_input_from_payload(payload: PayoffPayload) -> CalcResult<PayoffInput> {
    Ok(PayoffInput {
        outstanding_balance: required("outstandingBalance", payload.outstanding_balance)?,
        annual_rate_percent: amount("annualRatePercent", payload.annual_rate_percent)?,
        target_years: amount("targetYears", payload.target_years)?,
        overpayment: amount("overpayment", payload.overpayment)?.unwrap_or(0.0),
        monthly_payment: amount("monthlyPayment", payload.monthly_payment)?,
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/mortgage",
            get(mortgage_get_handler).post(mortgage_post_handler),
        )
        .route(
            "/api/payoff",
            get(payoff_get_handler).post(payoff_post_handler),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_http_server(config: ServerConfig) -> std::io::Result<()> {
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    info!("repayment API listening on http://{addr}");

    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn mortgage_get_handler(Query(payload): Query<MortgagePayload>) -> Response {
    mortgage_handler_impl(payload)
}

async fn mortgage_post_handler(Json(payload): Json<MortgagePayload>) -> Response {
    mortgage_handler_impl(payload)
}

fn mortgage_handler_impl(payload: MortgagePayload) -> Response {
    match loan_input_from_payload(payload).and_then(|input| compute_mortgage(&input)) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(err) => calc_error_response(&err),
    }
}

async fn payoff_get_handler(Query(payload): Query<PayoffPayload>) -> Response {
    payoff_handler_impl(payload)
}

async fn payoff_post_handler(Json(payload): Json<PayoffPayload>) -> Response {
    payoff_handler_impl(payload)
}

fn payoff_handler_impl(payload: PayoffPayload) -> Response {
    match payoff_input_from_payload(payload).and_then(|input| compute_payoff(&input)) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(err) => calc_error_response(&err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str, field: Option<&'static str>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            field,
        },
    )
}

fn calc_error_response(err: &CalcError) -> Response {
    error_response(StatusCode::BAD_REQUEST, &err.to_string(), Some(err.field()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan_from_json(json: &str) -> CalcResult<LoanInput> {
        let payload = serde_json::from_str::<MortgagePayload>(json).expect("payload json");
        loan_input_from_payload(payload)
    }

    fn payoff_from_json(json: &str) -> CalcResult<PayoffInput> {
        let payload = serde_json::from_str::<PayoffPayload>(json).expect("payload json");
        payoff_input_from_payload(payload)
    }

    #[test]
    fn mortgage_payload_parses_numbers_and_form_text() {
        let input = loan_from_json(
            r#"{
              "principal": "200,000",
              "initialRate": 4.5,
              "secondaryRate": "6.5",
              "loanTerm": 25,
              "fixedTerm": "5",
              "overpayment": "",
              "targetYears": null
            }"#,
        )
        .expect("valid payload");

        assert_eq!(input.principal, 200_000.0);
        assert_eq!(input.initial_annual_rate_percent, 4.5);
        assert_eq!(input.secondary_annual_rate_percent, Some(6.5));
        assert_eq!(input.loan_term_years, 25.0);
        assert_eq!(input.fixed_term_years, 5.0);
        assert_eq!(input.overpayment, 0.0);
        assert_eq!(input.target_years, None);
    }

    #[test]
    fn mortgage_payload_requires_principal() {
        let err = loan_from_json(r#"{"initialRate": 4.5, "loanTerm": 25, "fixedTerm": 5}"#)
            .expect_err("principal missing");
        assert_eq!(err.field(), "principal");
        assert!(err.to_string().contains("is required"));
    }

    #[test]
    fn unparseable_text_is_invalid_input() {
        let err = loan_from_json(
            r#"{"principal": "lots", "initialRate": 4.5, "loanTerm": 25, "fixedTerm": 5}"#,
        )
        .expect_err("principal unparseable");
        assert_eq!(err.field(), "principal");
        assert!(err.to_string().contains("must be a number"));
    }

    #[test]
    fn payoff_payload_accepts_short_aliases() {
        let input = payoff_from_json(
            r#"{"balance": "£5,000", "apr": "", "target": 2, "monthlyPayment": null}"#,
        )
        .expect("valid payload");
        assert_eq!(input.outstanding_balance, 5_000.0);
        assert_eq!(input.annual_rate_percent, None);
        assert_eq!(input.target_years, Some(2.0));
        assert_eq!(input.overpayment, 0.0);
        assert_eq!(input.monthly_payment, None);
    }

    #[test]
    fn error_body_names_the_field() {
        let err = CalcError::invalid("loanTermYears", "must be > 0");
        let body = serde_json::to_value(ErrorResponse {
            error: err.to_string(),
            field: Some(err.field()),
        })
        .expect("serializes");
        assert_eq!(body["error"], "loanTermYears must be > 0");
        assert_eq!(body["field"], "loanTermYears");
    }
}
