use std::sync::Arc;

use async_trait::async_trait;
use fleet_estimator::api::build_router;
use fleet_estimator::config::ServerConfig;
use fleet_estimator::contact::{ContactStore, ContactSubmission, InMemoryContactStore};
use fleet_estimator::error::StoreError;
use fleet_estimator::models::CalculationResult;
use fleet_estimator::token::encode_result_token;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    body: Option<&Value>,
) -> (u16, String) {
    let payload = body.map(Value::to_string).unwrap_or_default();
    let content_type = body.map(|_| "application/json");
    send_text(addr, method, path, content_type, &payload).await
}

async fn send_text(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    content_type: Option<&str>,
    payload: &str,
) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(content_type) = content_type {
        req.push_str(&format!("Content-Type: {content_type}\r\n"));
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n", payload.len()));
    req.push_str(payload);
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok())
        .expect("status code");
    (status, body.to_string())
}

async fn spawn_app(store: Arc<dyn ContactStore>) -> std::net::SocketAddr {
    let (app, _state) = build_router(ServerConfig::default(), store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).expect("json body")
}

#[tokio::test]
async fn estimate_returns_full_result() {
    let addr = spawn_app(Arc::new(InMemoryContactStore::new())).await;
    let form = json!({
        "fleetSize": "25",
        "routeKmPerDay": "150",
        "dieselCost": "1.45",
        "maintenanceSpend": "5000",
        "vehicleType": "truck",
        "operationType": "intermediate"
    });
    let (status, body) = send_raw(addr, "POST", "/api/estimate", Some(&form)).await;
    assert_eq!(status, 200, "{body}");
    let json = parse(&body);
    let infra = &json["chargingInfrastructure"];
    assert_eq!(infra["chargerPowerKw"], 30);
    assert_eq!(infra["chargersPerStation"], 2);
    assert_eq!(infra["dailyEnergyPerVehicle"].as_f64(), Some(45.0));
    assert_eq!(infra["totalDailyEnergy"].as_f64(), Some(1125.0));
    assert_eq!(json["savingsPct"], 15);
    assert_eq!(json["paybackMonths"], Value::Null);
    assert_eq!(json["vehicleType"], "truck");
    assert_eq!(json["batteryCapacityMin"], 80);
}

#[tokio::test]
async fn estimate_applies_defaults_and_rejects_bad_values() {
    let addr = spawn_app(Arc::new(InMemoryContactStore::new())).await;

    let (status, body) = send_raw(addr, "POST", "/api/estimate", Some(&json!({}))).await;
    assert_eq!(status, 200, "{body}");
    let json = parse(&body);
    assert_eq!(json["fleetSize"], 1);
    assert_eq!(json["operationType"], "intermediate");

    let (status, body) = send_raw(
        addr,
        "POST",
        "/api/estimate",
        Some(&json!({"routeKmPerDay": -10})),
    )
    .await;
    assert_eq!(status, 400);
    assert!(parse(&body)["error"].as_str().unwrap().contains("routeKmPerDay"));

    let (status, body) = send_raw(
        addr,
        "POST",
        "/api/estimate",
        Some(&json!({"vehicleType": "bus"})),
    )
    .await;
    assert_eq!(status, 400);
    assert!(parse(&body)["error"].as_str().unwrap().contains("bus"));
}

fn error_text(body: &str) -> String {
    parse(body)["error"]
        .as_str()
        .expect("error envelope")
        .to_string()
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let addr = spawn_app(Arc::new(InMemoryContactStore::new())).await;

    let (status, body) =
        send_text(addr, "POST", "/api/estimate", Some("application/json"), "{oops").await;
    assert_eq!(status, 400, "{body}");
    assert!(!error_text(&body).is_empty());

    let (status, body) =
        send_text(addr, "POST", "/api/dashboard", Some("application/json"), "[1,2,3]").await;
    assert_eq!(status, 422, "{body}");
    assert!(!error_text(&body).is_empty());

    let (status, body) =
        send_text(addr, "POST", "/api/estimate", Some("application/json"), "[1,2,3]").await;
    assert_eq!(status, 422, "{body}");
    assert!(!error_text(&body).is_empty());

    let (status, body) = send_text(addr, "POST", "/api/estimate/batch", None, "[]").await;
    assert_eq!(status, 415, "{body}");
    assert!(!error_text(&body).is_empty());

    let request = json!({
        "contact": {"fullName": "Ana", "email": "a@b.c"},
        "preliminaryData": {"fleetSize": "25"}
    });
    let (status, body) = send_raw(addr, "POST", "/api/contact", Some(&request)).await;
    assert_eq!(status, 422, "{body}");
    assert!(!error_text(&body).is_empty());

    let (status, body) = send_raw(addr, "GET", "/api/result", None).await;
    assert_eq!(status, 400, "{body}");
    assert!(!error_text(&body).is_empty());
}

#[tokio::test]
async fn batch_reports_each_scenario() {
    let addr = spawn_app(Arc::new(InMemoryContactStore::new())).await;
    let forms = json!([
        {"fleetSize": 1, "vehicleType": "sedan", "operationType": "relaxed"},
        {"fleetSize": 2, "dieselCost": -1},
        {"fleetSize": 10, "routeKmPerDay": 120, "operationType": "intensive"}
    ]);
    let (status, body) = send_raw(addr, "POST", "/api/estimate/batch", Some(&forms)).await;
    assert_eq!(status, 200, "{body}");
    let entries = parse(&body);
    let entries = entries.as_array().expect("array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["result"]["chargingInfrastructure"]["chargerPowerKw"], 7);
    assert!(entries[1]["error"].as_str().unwrap().contains("dieselCost"));
    assert_eq!(entries[2]["result"]["fleetSize"], 10);
}

#[tokio::test]
async fn dashboard_token_feeds_result_endpoint() {
    let addr = spawn_app(Arc::new(InMemoryContactStore::new())).await;
    let form = json!({"fleetSize": 5, "routeKmPerDay": 100, "dieselCost": 1, "vehicleType": "van"});
    let (status, body) = send_raw(addr, "POST", "/api/dashboard", Some(&form)).await;
    assert_eq!(status, 200, "{body}");
    let json = parse(&body);
    assert_eq!(json["monthly"]["savings"].as_array().map(Vec::len), Some(12));
    assert_eq!(json["fleetStatus"].as_array().map(Vec::len), Some(3));

    let result: CalculationResult =
        serde_json::from_value(json["result"].clone()).expect("result");
    let token = json["resultToken"].as_str().expect("token");
    assert_eq!(token, encode_result_token(&result).expect("encode"));

    // '+', '/' and '=' must be percent-encoded inside a query string.
    let encoded: String = token
        .chars()
        .map(|c| match c {
            '+' => "%2B".to_string(),
            '/' => "%2F".to_string(),
            '=' => "%3D".to_string(),
            other => other.to_string(),
        })
        .collect();
    let (status, body) = send_raw(addr, "GET", &format!("/api/result?d={encoded}"), None).await;
    assert_eq!(status, 200, "{body}");
    let decoded: CalculationResult = serde_json::from_str(&body).expect("decoded result");
    assert_eq!(decoded, result);

    let (status, _) = send_raw(addr, "GET", "/api/result?d=@@@", None).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn contact_capture_and_status() {
    let store = Arc::new(InMemoryContactStore::new());
    let addr = spawn_app(store.clone()).await;

    let (status, body) = send_raw(
        addr,
        "POST",
        "/api/contact",
        Some(&json!({"contact": {"fullName": "Ana"}, "preliminaryData": {}})),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(parse(&body)["error"], "Missing required contact information");

    let request = json!({
        "contact": {
            "fullName": "Ana Ruiz",
            "company": "Logistica Sur",
            "position": "COO",
            "email": "ana@example.com",
            "phone": "600000000"
        },
        "preliminaryData": {"fleetSize": 25, "co2": 259, "chargingWindow": 9}
    });
    let (status, body) = send_raw(addr, "POST", "/api/contact", Some(&request)).await;
    assert_eq!(status, 200, "{body}");
    let json = parse(&body);
    assert_eq!(json["success"], true);
    assert_eq!(json["contactId"], 1);

    let rows = store.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].submission.co2_avoided, Some(259));
    assert_eq!(rows[0].submission.charging_window, Some(9.0));

    let (status, body) = send_raw(addr, "GET", "/api/contact", None).await;
    assert_eq!(status, 200);
    let json = parse(&body);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["totalSubmissions"], 1);
}

struct BrokenStore;

#[async_trait]
impl ContactStore for BrokenStore {
    async fn insert(&self, _submission: ContactSubmission) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[tokio::test]
async fn store_failures_become_500s() {
    let addr = spawn_app(Arc::new(BrokenStore)).await;
    let request = json!({"contact": {"fullName": "Ana", "email": "a@b.c"}});
    let (status, body) = send_raw(addr, "POST", "/api/contact", Some(&request)).await;
    assert_eq!(status, 500);
    let json = parse(&body);
    assert_eq!(json["error"], "Error saving contact information");
    assert!(json["details"].as_str().unwrap().contains("connection refused"));

    let (status, body) = send_raw(addr, "GET", "/api/contact", None).await;
    assert_eq!(status, 500);
    assert_eq!(parse(&body)["status"], "ERROR");
}

#[tokio::test]
async fn health_reports_environment() {
    let addr = spawn_app(Arc::new(InMemoryContactStore::new())).await;
    let (status, body) = send_raw(addr, "GET", "/api/health", None).await;
    assert_eq!(status, 200);
    let json = parse(&body);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["environment"], "development");
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
}
