/// Integration tests with a mocked calculator service
/// Drives the HTTP router end to end against an in-memory client store
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use mortgage_application_service::application_service::MortgageApplicationService;
use mortgage_application_service::calculator_client::CalculatorClient;
use mortgage_application_service::db_storage::{ClientStore, InMemoryClientStore};
use mortgage_application_service::handlers::{app, router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to build the router against a mock calculator
fn create_test_app(calculator_url: String, store: Arc<InMemoryClientStore>) -> Router {
    let calculator = CalculatorClient::new(calculator_url).unwrap();
    let state = Arc::new(AppState {
        service: MortgageApplicationService::new(store, calculator),
    });
    router(state)
}

fn ivan() -> Value {
    json!({
        "firstName": "Ivan",
        "secondName": "Ivanovich",
        "lastName": "Ivanov",
        "passport": "9410123456",
        "birthDate": "1990-10-23",
        "gender": "MALE",
        "salary": 80000,
        "creditAmount": 3000000,
        "durationInMonths": 120
    })
}

async fn mock_payment(server: &MockServer, monthly_payment: f64) {
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "creditAmount": 3000000.0,
            "durationInMonths": 120,
            "monthlyPayment": monthly_payment
        })))
        .mount(server)
        .await;
}

async fn post_application(app: &Router, body: &Value) -> (StatusCode, Option<String>, Value) {
    send(
        app,
        Request::post("/mortgage/application")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
    )
    .await
}

async fn get_application(app: &Router, id: &str) -> (StatusCode, Option<String>, Value) {
    send(
        app,
        Request::get(format!("/mortgage/application/{}", id))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, location, body)
}

#[tokio::test]
async fn test_approved_application_reports_processing_then_approved() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .and(body_json(json!({
            "creditAmount": 3000000.0,
            "durationInMonths": 120
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "creditAmount": 3000000.0,
            "durationInMonths": 120,
            "monthlyPayment": 35610.53
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryClientStore::new());
    let app = create_test_app(mock_server.uri(), store.clone());

    let (status, location, body) = post_application(&app, &ivan()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PROCESSING");
    assert!(body.get("monthlyPayment").is_none());
    assert_eq!(body["firstName"], "Ivan");
    assert_eq!(body["birthDate"], "1990-10-23");

    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 36);
    assert_eq!(location, Some(format!("/mortgage/application/{}", id)));

    let (status, _, body) = get_application(&app, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");
    assert_eq!(body["monthlyPayment"], 35610.53);
    assert_eq!(body["salary"], 80000.0);

    let stored = store
        .find_by_id(Uuid::parse_str(&id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.monthly_payment, Some(35610.53));
}

#[tokio::test]
async fn test_low_salary_is_denied() {
    let mock_server = MockServer::start().await;
    mock_payment(&mock_server, 35610.53).await;

    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let mut application = ivan();
    application["salary"] = json!(71221.06);

    let (status, _, body) = post_application(&app, &application).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PROCESSING");

    let (status, _, body) = get_application(&app, body["id"].as_str().unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "DENIED");
    assert!(body.get("monthlyPayment").is_none());
}

#[tokio::test]
async fn test_calculator_failure_defaults_to_denial() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let (status, _, body) = post_application(&app, &ivan()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PROCESSING");

    let (_, _, body) = get_application(&app, body["id"].as_str().unwrap()).await;
    assert_eq!(body["status"], "DENIED");
    assert!(body.get("monthlyPayment").is_none());
}

#[tokio::test]
async fn test_calculator_without_payment_defaults_to_denial() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "creditAmount": 3000000.0,
            "durationInMonths": 120
        })))
        .mount(&mock_server)
        .await;

    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let (_, _, body) = post_application(&app, &ivan()).await;
    let (_, _, body) = get_application(&app, body["id"].as_str().unwrap()).await;
    assert_eq!(body["status"], "DENIED");
}

#[tokio::test]
async fn test_duplicate_application_conflicts() {
    let mock_server = MockServer::start().await;
    mock_payment(&mock_server, 35610.53).await;

    let store = Arc::new(InMemoryClientStore::new());
    let app = create_test_app(mock_server.uri(), store.clone());

    let (status, _, _) = post_application(&app, &ivan()).await;
    assert_eq!(status, StatusCode::CREATED);

    // Same natural key, different financial details.
    let mut again = ivan();
    again["salary"] = json!(10);
    let (status, _, body) = post_application(&app, &again).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({ "error": "Client duplicate" }));
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_different_passport_is_not_a_duplicate() {
    let mock_server = MockServer::start().await;
    mock_payment(&mock_server, 35610.53).await;

    let store = Arc::new(InMemoryClientStore::new());
    let app = create_test_app(mock_server.uri(), store.clone());

    post_application(&app, &ivan()).await;
    let mut other = ivan();
    other["passport"] = json!("9410654321");
    let (status, _, _) = post_application(&app, &other).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_validation_errors_skip_the_calculator() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryClientStore::new());
    let app = create_test_app(mock_server.uri(), store.clone());

    let mut missing_name = ivan();
    missing_name.as_object_mut().unwrap().remove("firstName");
    let (status, _, body) = post_application(&app, &missing_name).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "firstName cannot be empty" }));

    let mut bad_date = ivan();
    bad_date["birthDate"] = json!("23-10-1990");
    let (status, _, body) = post_application(&app, &bad_date).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "date format yyyy-mm-dd, example 1999-01-21" })
    );

    let mut bad_gender = ivan();
    bad_gender["gender"] = json!("UNKNOWN");
    let (status, _, body) = post_application(&app, &bad_gender).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "gender should be MALE or FEMALE" }));

    let mut long_term = ivan();
    long_term["durationInMonths"] = json!(1201);
    let (status, _, body) = post_application(&app, &long_term).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "durationInMonths max value = 1200" }));

    assert!(store.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let (status, _, body) = send(
        &app,
        Request::post("/mortgage/application")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"firstName": "Ivan", "salary": "lots"}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_lookup_rejects_malformed_id() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let (status, _, body) = get_application(&app, "not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "invalid id" }));

    let (status, _, body) =
        get_application(&app, "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "invalid id" }));
}

#[tokio::test]
async fn test_lookup_unknown_id_is_not_found() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let (status, _, body) = get_application(&app, &Uuid::new_v4().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_health() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let (status, _, body) = send(
        &app,
        Request::get("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_calculator_client_reports_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&mock_server)
        .await;

    let client = CalculatorClient::new(mock_server.uri()).unwrap();
    let result = client.calculate(1000.0, 12).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_calculator_client_returns_payment() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate"))
        .and(body_json(json!({ "creditAmount": 1000.0, "durationInMonths": 12 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "creditAmount": 1000.0,
            "durationInMonths": 12,
            "monthlyPayment": 88.85
        })))
        .mount(&mock_server)
        .await;

    let client = CalculatorClient::new(mock_server.uri()).unwrap();
    assert_eq!(client.calculate(1000.0, 12).await.unwrap(), 88.85);
}

#[tokio::test]
async fn test_non_string_typed_fields_report_fixed_hints() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(mock_server.uri(), Arc::new(InMemoryClientStore::new()));

    let mut numeric_gender = ivan();
    numeric_gender["gender"] = json!(1);
    let (status, _, body) = post_application(&app, &numeric_gender).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "gender should be MALE or FEMALE" }));

    let mut numeric_date = ivan();
    numeric_date["birthDate"] = json!(19901023);
    let (status, _, body) = post_application(&app, &numeric_date).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "date format yyyy-mm-dd, example 1999-01-21" })
    );
}

#[tokio::test]
async fn test_served_app_applies_middleware() {
    let mock_server = MockServer::start().await;
    mock_payment(&mock_server, 35610.53).await;

    let calculator = CalculatorClient::new(mock_server.uri()).unwrap();
    let state = Arc::new(AppState {
        service: MortgageApplicationService::new(Arc::new(InMemoryClientStore::new()), calculator),
    });
    let served = app(state, 1024);

    let (status, _, body) = post_application(&served, &ivan()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PROCESSING");

    let oversized = vec![b' '; 4096];
    let response = served
        .clone()
        .oneshot(
            Request::post("/mortgage/application")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, oversized.len())
                .body(Body::from(oversized))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let response = served
        .clone()
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "http://example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
