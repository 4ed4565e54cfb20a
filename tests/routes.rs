use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;
use tower::ServiceExt;

use prorate_bill::{create_router, AppState, Config};

fn app() -> Router {
    create_router(AppState::new(Config::default()))
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/prorate-bill")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn percent_encode(raw: &str) -> String {
    raw.bytes()
        .map(|b| {
            if b.is_ascii_alphanumeric() {
                (b as char).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn json_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/prorate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

const SCENARIO_FORM: &str = "total_amount_before_discount=1000\
&fees-0-id=f&fees-0-name=Tax&fees-0-amount=100&fees-0-method=prorated\
&items-0-id=a&items-0-name=X&items-0-amount=600\
&items-1-id=b&items-1-name=Y&items-1-amount=400\
&total_amount_after_discount=900";

const SCENARIO_BILL: &str = r#"{"total_amount_before_discount":"1000","total_amount_after_discount":"900","items":[{"id":"a","name":"X","amount":"600"},{"id":"b","name":"Y","amount":"400"}],"other_fees":[{"id":"f","name":"Tax","amount":"100","method":"prorated"}]}"#;

// ==================== page ====================

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_home_redirects_to_calculator() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/prorate-bill");
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let response = app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_page_renders_form() {
    let response = app()
        .oneshot(Request::get("/prorate-bill").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Prorate Bill"));
    assert!(html.contains("Add Other Fee"));
    assert!(html.contains("Add New Item"));
    assert!(!html.contains("Final Amount"));
}

#[tokio::test]
async fn test_calculate_renders_results() {
    let body = format!("{SCENARIO_FORM}&action=calculate");
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("X (60.00%)"));
    assert!(html.contains("Y (40.00%)"));
    assert!(html.contains("RM 540.00"));
    assert!(html.contains("(Tax) RM 60.00"));
    assert!(html.contains("RM 600.00"));
    assert!(html.contains("RM 1000.00"));
    assert!(html.contains(r#"name="last_bill""#));
}

#[tokio::test]
async fn test_add_item_keeps_existing_rows() {
    let body = format!("{SCENARIO_FORM}&action=add_item");
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains(r#"name="items-2-amount""#));
    assert!(html.contains(r#"value="600""#));
    assert!(!html.contains("Final Amount"));
    assert!(!html.contains(r#"name="last_bill""#));
}

#[tokio::test]
async fn test_add_item_keeps_previous_result() {
    let body = format!(
        "{SCENARIO_FORM}&last_bill={}&action=add_item",
        percent_encode(SCENARIO_BILL)
    );
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains(r#"name="items-2-amount""#));
    assert!(html.contains("Final Amount"));
    assert!(html.contains("X (60.00%)"));
    assert!(html.contains("(Tax) RM 60.00"));
    assert!(html.contains(r#"name="last_bill""#));
}

#[tokio::test]
async fn test_invalid_fields_keep_previous_result() {
    let body = format!(
        "total_amount_before_discount=abc&total_amount_after_discount=900\
&items-0-name=X&items-0-amount=600&last_bill={}&action=calculate",
        percent_encode(SCENARIO_BILL)
    );
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Total amount before discount must be a number"));
    assert!(html.contains("Y (40.00%)"));
}

#[tokio::test]
async fn test_calculation_error_clears_previous_result() {
    let body = format!(
        "total_amount_before_discount=0&total_amount_after_discount=0\
&items-0-name=X&items-0-amount=0&last_bill={}&action=calculate",
        percent_encode(SCENARIO_BILL)
    );
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Cannot prorate: total amount before discount is zero"));
    assert!(!html.contains("Final Amount"));
    assert!(!html.contains(r#"name="last_bill""#));
}

#[tokio::test]
async fn test_remove_fee_drops_row() {
    let body = format!("{SCENARIO_FORM}&action=remove_fee:0");
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(!html.contains(r#"name="fees-0-amount""#));
    assert!(html.contains(r#"name="items-1-amount""#));
}

#[tokio::test]
async fn test_remove_out_of_range_is_bad_request() {
    let body = format!("{SCENARIO_FORM}&action=remove_item:9");
    let response = app().oneshot(form_post(&body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_fields_are_listed() {
    let body = "total_amount_before_discount=&total_amount_after_discount=abc&action=calculate";
    let response = app().oneshot(form_post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Total amount before discount is required"));
    assert!(html.contains("Total amount after discount must be a number"));
}

#[tokio::test]
async fn test_zero_total_shows_calculation_error() {
    let body = "total_amount_before_discount=0&total_amount_after_discount=0\
&items-0-name=X&items-0-amount=0&action=calculate";
    let response = app().oneshot(form_post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_string(response).await;
    assert!(html.contains("Cannot prorate: total amount before discount is zero"));
    assert!(!html.contains("Final Amount"));
}

// ==================== JSON API ====================

#[tokio::test]
async fn test_api_equal_fee_scenario() {
    let body = r#"{
        "total_amount_before_discount": "1000",
        "total_amount_after_discount": "900",
        "items": [
            {"id": "a", "name": "X", "amount": "600"},
            {"id": "b", "name": "Y", "amount": "400"}
        ],
        "other_fees": [{"id": "f", "name": "Service", "amount": "100", "method": "equally"}]
    }"#;

    let response = app().oneshot(json_post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], "a");
    assert_eq!(items[0]["other_fees"][0]["fee_id"], "f");
    assert_eq!(decimal(&items[0]["other_fees"][0]["amount"]), dec!(50));
    assert_eq!(decimal(&items[0]["prorated_percentage"]), dec!(60));
    assert_eq!(decimal(&items[0]["final_amount"]), dec!(590));
    assert_eq!(decimal(&items[1]["final_amount"]), dec!(410));
    assert_eq!(decimal(&json["total_amount_before_discount"]), dec!(1000));
    assert_eq!(decimal(&json["total_final_amount"]), dec!(1000));
}

#[tokio::test]
async fn test_api_division_by_zero() {
    let body = r#"{
        "total_amount_before_discount": "0",
        "total_amount_after_discount": "0",
        "items": [{"id": "a", "name": "X", "amount": "0"}]
    }"#;

    let response = app().oneshot(json_post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error_type"], "division_by_zero");
    assert_eq!(json["details"]["denominator"], "total amount before discount");
}

#[tokio::test]
async fn test_api_rejects_negative_amount() {
    let body = r#"{
        "total_amount_before_discount": "10",
        "total_amount_after_discount": "10",
        "items": [{"amount": "-10"}]
    }"#;

    let response = app().oneshot(json_post(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error_type"], "invalid_request");
}
