/// End-to-end tests for POST /submit-loan
/// Drives the real router with a recording warehouse in place of the database
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use loan_risk_api::app::build_router;
use loan_risk_api::data::loan_storage::{InsertStatement, LoanWriter, Warehouse};
use loan_risk_api::errors::AppError;
use loan_risk_api::handlers::AppState;
use loan_risk_api::schema::{ColumnValue, ID_COLUMN, SUBMITTED_AT_COLUMN};

const ORIGIN: &str = "http://localhost:3000";
const TABLE: &str = "DRRSCHEMA.LoanApplications";

/// Records every statement it is asked to run; optionally fails like an unreachable warehouse.
#[derive(Default)]
struct SpyWarehouse {
    statements: Mutex<Vec<InsertStatement>>,
    fail_with: Option<String>,
}

impl SpyWarehouse {
    fn failing(message: &str) -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    fn calls(&self) -> usize {
        self.statements.lock().unwrap().len()
    }

    fn last(&self) -> InsertStatement {
        self.statements.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Warehouse for SpyWarehouse {
    async fn execute_insert(&self, statement: &InsertStatement) -> Result<(), AppError> {
        self.statements.lock().unwrap().push(statement.clone());
        match &self.fail_with {
            Some(message) => Err(AppError::WithContext {
                source: Box::new(AppError::Warehouse(message.clone())),
                context: "Failed to connect to warehouse".to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn app(warehouse: Arc<SpyWarehouse>) -> Router {
    let writer = LoanWriter::new(warehouse, TABLE);
    build_router(Arc::new(AppState { writer }), ORIGIN).unwrap()
}

fn scenario_one_payload() -> Value {
    json!({
        "lineOfBusiness": "CRE",
        "propertyType": "Office",
        "loanType": "Fixed",
        "dscr": 1.25,
        "occupancy": 0.92,
        "ltv": 0.65,
        "quantitative_brg": 3.1,
        "adjustment_score_brg": 0.2,
        "q_adjusted_brg": 3.3,
        "weighted_brg": 3.3,
        "final_brg": 3,
        "quantitative_frg": 2.8,
        "adjustment_score_frg": 0.1,
        "q_adjusted_frg": 2.9,
        "final_frg": 3,
        "overrideEnabled": false
    })
}

async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/submit-loan")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn column_set(statement: &InsertStatement) -> BTreeSet<&'static str> {
    statement.columns().iter().copied().collect()
}

fn expected_base_columns() -> BTreeSet<&'static str> {
    scenario_one_keys()
        .into_iter()
        .chain([ID_COLUMN, SUBMITTED_AT_COLUMN])
        .collect()
}

fn scenario_one_keys() -> Vec<&'static str> {
    vec![
        "lineOfBusiness",
        "propertyType",
        "loanType",
        "dscr",
        "occupancy",
        "ltv",
        "quantitative_brg",
        "adjustment_score_brg",
        "q_adjusted_brg",
        "weighted_brg",
        "final_brg",
        "quantitative_frg",
        "adjustment_score_frg",
        "q_adjusted_frg",
        "final_frg",
        "overrideEnabled",
    ]
}

#[tokio::test]
async fn test_scenario_minimal_submission_stores_sixteen_fields() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let (status, body) = post_json(app(warehouse.clone()), scenario_one_payload().to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Loan application submitted successfully");
    let loan_id = body["loan_id"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(loan_id).is_ok());

    assert_eq!(warehouse.calls(), 1);
    let statement = warehouse.last();
    assert_eq!(statement.columns().len(), 18);
    assert_eq!(column_set(&statement), expected_base_columns());
    assert_eq!(
        statement.value_of(ID_COLUMN),
        Some(&ColumnValue::Text(loan_id.to_string()))
    );
    assert!(matches!(
        statement.value_of(SUBMITTED_AT_COLUMN),
        Some(ColumnValue::Timestamp(_))
    ));
    assert_eq!(statement.value_of("dscr"), Some(&ColumnValue::Float(1.25)));
    assert_eq!(
        statement.value_of("propertyType"),
        Some(&ColumnValue::Text("Office".to_string()))
    );
}

#[tokio::test]
async fn test_scenario_optional_rating_adds_exactly_two_columns() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let mut payload = scenario_one_payload();
    payload["TenantRating"] = json!(4);
    payload["TenantRating_Value"] = json!(3.5);

    let (status, _) = post_json(app(warehouse.clone()), payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let statement = warehouse.last();
    let mut expected = expected_base_columns();
    expected.insert("TenantRating");
    expected.insert("TenantRating_Value");
    assert_eq!(column_set(&statement), expected);
    assert_eq!(
        statement.value_of("TenantRating"),
        Some(&ColumnValue::Ordinal(4))
    );
    assert_eq!(
        statement.value_of("TenantRating_Value"),
        Some(&ColumnValue::Float(3.5))
    );
    assert_eq!(statement.value_of("LeaseExpiration"), None);
}

#[tokio::test]
async fn test_scenario_override_fields_are_persisted() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let mut payload = scenario_one_payload();
    payload["overrideEnabled"] = json!(true);
    payload["override_brg"] = json!(3.0);
    payload["justification"] = json!("manual review");

    let (status, _) = post_json(app(warehouse.clone()), payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let statement = warehouse.last();
    assert_eq!(
        statement.value_of("overrideEnabled"),
        Some(&ColumnValue::Flag(true))
    );
    assert_eq!(
        statement.value_of("override_brg"),
        Some(&ColumnValue::Float(3.0))
    );
    assert_eq!(
        statement.value_of("justification"),
        Some(&ColumnValue::Text("manual review".to_string()))
    );
    assert_eq!(statement.value_of("override_frg"), None);
}

#[tokio::test]
async fn test_scenario_warehouse_failure_returns_server_error() {
    let warehouse = Arc::new(SpyWarehouse::failing("connection refused"));
    let (status, body) = post_json(app(warehouse.clone()), scenario_one_payload().to_string()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("loan_id").is_none());
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
    // Validation passed, so exactly one write was attempted
    assert_eq!(warehouse.calls(), 1);
}

#[tokio::test]
async fn test_missing_required_field_never_reaches_warehouse() {
    for key in scenario_one_keys() {
        let warehouse = Arc::new(SpyWarehouse::default());
        let mut payload = scenario_one_payload();
        payload.as_object_mut().unwrap().remove(key);

        let (status, body) = post_json(app(warehouse.clone()), payload.to_string()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "removed {}", key);
        assert_eq!(body["details"][0]["field"], key);
        assert_eq!(warehouse.calls(), 0, "write issued without {}", key);
    }
}

#[tokio::test]
async fn test_wrong_type_is_rejected_with_field_details() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let mut payload = scenario_one_payload();
    payload["ltv"] = json!("0.65");
    payload["overrideEnabled"] = json!("false");

    let (status, body) = post_json(app(warehouse.clone()), payload.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["ltv", "overrideEnabled"]);
    assert_eq!(warehouse.calls(), 0);
}

#[tokio::test]
async fn test_explicit_null_optional_is_not_stored() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let mut payload = scenario_one_payload();
    payload["override_brg"] = Value::Null;
    payload["MarketRent"] = Value::Null;
    payload["borrowerName"] = Value::Null;

    let (status, _) = post_json(app(warehouse.clone()), payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(column_set(&warehouse.last()), expected_base_columns());
}

#[tokio::test]
async fn test_identical_submissions_get_distinct_ids() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let router = app(warehouse.clone());

    let (_, first) = post_json(router.clone(), scenario_one_payload().to_string()).await;
    let (_, second) = post_json(router, scenario_one_payload().to_string()).await;

    assert_ne!(first["loan_id"], second["loan_id"]);
    assert_eq!(warehouse.calls(), 2);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let (status, body) = post_json(app(warehouse.clone()), "{\"dscr\": ".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(warehouse.calls(), 0);
}

#[tokio::test]
async fn test_health() {
    let response = app(Arc::new(SpyWarehouse::default()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let response = app(Arc::new(SpyWarehouse::default()))
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/submit-loan")
                .header(header::ORIGIN, ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_ignores_other_origins() {
    let response = app(Arc::new(SpyWarehouse::default()))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn test_cors_simple_request_from_configured_origin() {
    let response = app(Arc::new(SpyWarehouse::default()))
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, ORIGIN)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN);
}

fn oversized_body() -> String {
    format!("{{\"justification\": \"{}\"}}", "x".repeat(1024 * 1024))
}

#[tokio::test]
async fn test_oversized_streamed_body_is_payload_too_large() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let (status, body) = post_json(app(warehouse.clone()), oversized_body()).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
    assert_eq!(warehouse.calls(), 0);
}

#[tokio::test]
async fn test_oversized_declared_length_is_payload_too_large() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let body = oversized_body();
    let response = app(warehouse.clone())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/submit-loan")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, body.len())
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(warehouse.calls(), 0);
}

#[tokio::test]
async fn test_missing_content_type_keeps_rejection_status() {
    let warehouse = Arc::new(SpyWarehouse::default());
    let response = app(warehouse.clone())
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/submit-loan")
                .body(Body::from(scenario_one_payload().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(warehouse.calls(), 0);
}
