//! Remote client and session gate against an in-process mock backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use hivekeep::clients::{BackendClient, RemoteSessionGate};
use hivekeep::config::BackendConfig;
use hivekeep::models::{HealthStatus, NewBeehive, ProfilePatch, Session};
use hivekeep::services::{AuthError, BeehiveError, BeehiveService, SessionGate, bulk};
use hivekeep::store::Store;
use serde_json::{Value, json};

const TOKEN: &str = "tok-123";

#[derive(Clone, Default)]
struct Mock {
    created: Arc<Mutex<Vec<Value>>>,
}

fn hive_json(serial: &str, token: &str, sold: bool) -> Value {
    let sold_date = if sold { json!("2024-05-01") } else { Value::Null };
    json!({
        "serial_number": serial,
        "qr_token": token,
        "import_date": "2024-01-15",
        "split_date": null,
        "health_status": "Tốt",
        "species": "Apis cerana",
        "notes": null,
        "is_sold": sold,
        "sold_date": sold_date,
        "user_id": 1,
        "created_at": "2024-01-15T08:00:00",
        "updated_at": null
    })
}

fn user_json() -> Value {
    json!({
        "id": 1,
        "username": "admin",
        "email": "admin@kbee.vn",
        "farmName": null,
        "farmAddress": null,
        "farmPhone": null,
        "qrDisplaySettings": {
            "showFarmInfo": true,
            "showOwnerContact": false,
            "showBeehiveHistory": true,
            "showHealthStatus": true,
            "customMessage": null,
            "footerText": "Cảm ơn"
        },
        "createdAt": "2024-01-01T00:00:00"
    })
}

fn error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": status.canonical_reason(),
            "message": message,
            "status_code": status.as_u16(),
        })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "admin123" {
        Json(json!({ "token": TOKEN, "user": user_json() })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    let mut user = user_json();
    user["farmName"] = json!("Refreshed Farm");
    Json(user).into_response()
}

async fn update_profile(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    let mut user = user_json();
    if let Some(name) = body.get("farmName") {
        user["farmName"] = name.clone();
    }
    Json(json!({ "message": "Profile updated successfully", "user": user })).into_response()
}

async fn list_active(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    let page = params.get("page").map_or("1", String::as_str);
    let (hives, has_next) = if page == "1" {
        (vec![hive_json("TO001", "ABC123DEF456", false)], true)
    } else {
        (vec![hive_json("TO002", "GHI789JKL012", false)], false)
    };
    Json(json!({
        "beehives": hives,
        "pagination": { "page": page, "per_page": 1, "total": 2, "total_pages": 2, "has_prev": page != "1", "has_next": has_next },
        "health_stats": { "Tốt": 2 }
    }))
    .into_response()
}

async fn list_sold(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    Json(json!({
        "beehives": [hive_json("TO003", "MNO345PQR678", true)],
        "pagination": { "page": 1, "per_page": 100, "total": 1, "total_pages": 1, "has_prev": false, "has_next": false }
    }))
    .into_response()
}

async fn create(State(mock): State<Mock>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    if body["notes"] == "reject me" {
        return error(StatusCode::BAD_REQUEST, "Split date must be after import date");
    }
    let mut created = mock.created.lock().unwrap();
    created.push(body.clone());
    let serial = format!("TO{:03}", created.len() + 3);
    let mut hive = hive_json(&serial, &format!("NEWTOKEN{:04}", created.len()), false);
    hive["health_status"] = body["health_status"].clone();
    (StatusCode::CREATED, Json(hive)).into_response()
}

async fn show(headers: HeaderMap, Path(serial): Path<String>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    if serial == "TO001" {
        Json(hive_json("TO001", "ABC123DEF456", false)).into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Beehive not found")
    }
}

async fn by_token(Path(token): Path<String>) -> Response {
    if token == "ABC123DEF456" {
        Json(json!({
            "beehive": hive_json("TO001", "ABC123DEF456", false),
            "owner": { "id": 1, "username": "admin", "email": "admin@kbee.vn" },
            "business_info": null
        }))
        .into_response()
    } else {
        error(StatusCode::NOT_FOUND, "Beehive not found")
    }
}

async fn sell(headers: HeaderMap, Path(serial): Path<String>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    Json(hive_json(&serial, "ABC123DEF456", true)).into_response()
}

async fn stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    Json(json!({ "total": 3, "active": 2, "sold": 1, "healthy": 2 })).into_response()
}

async fn export_pdf(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return error(StatusCode::UNAUTHORIZED, "Token has expired");
    }
    if body["serial_numbers"].as_array().is_none_or(Vec::is_empty) {
        return error(StatusCode::BAD_REQUEST, "No serial numbers provided");
    }
    ([("content-type", "application/pdf")], b"%PDF-1.4 mock".to_vec()).into_response()
}

async fn spawn_backend() -> (BackendClient, Mock) {
    let mock = Mock::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/auth/profile", axum::routing::put(update_profile))
        .route("/api/beehives", get(list_active).post(create))
        .route("/api/sold-beehives", get(list_sold))
        .route("/api/beehives/{serial}", get(show))
        .route("/api/beehives/{serial}/sell", post(sell))
        .route("/api/beehive/{token}", get(by_token))
        .route("/api/stats", get(stats))
        .route("/api/export_bulk_qr_pdf", post(export_pdf))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = BackendConfig {
        base_url: format!("http://{addr}/api"),
        ..BackendConfig::default()
    };
    (BackendClient::new(&config).unwrap(), mock)
}

async fn logged_in(client: &BackendClient) -> Session {
    client.login("admin", "admin123").await.unwrap()
}

fn new_hive(notes: &str) -> NewBeehive {
    NewBeehive {
        import_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
        split_date: None,
        health_status: HealthStatus::Weak,
        notes: Some(notes.to_string()),
    }
}

#[tokio::test]
async fn test_login_returns_token_and_numeric_user_id() {
    let (client, _) = spawn_backend().await;

    let session = logged_in(&client).await;
    assert_eq!(session.token.as_deref(), Some(TOKEN));
    assert_eq!(session.user.id, "1");
    assert!(!session.user.qr_display.show_owner_contact);
    assert_eq!(session.user.business_name, None);
}

#[tokio::test]
async fn test_list_walks_pages_and_includes_sold() {
    let (client, _) = spawn_backend().await;
    let session = logged_in(&client).await;

    let hives = client.list(&session).await.unwrap();
    let serials: Vec<&str> = hives.iter().map(|h| h.serial_number.as_str()).collect();
    assert_eq!(serials, ["TO001", "TO002", "TO003"]);
    assert_eq!(hives[0].health_status, HealthStatus::Good);
    assert_eq!(hives[0].updated_at, "");
    assert!(hives[2].is_sold && hives[2].sold_date.is_some());

    let stats = client.stats(&session).await.unwrap();
    assert_eq!((stats.total, stats.active, stats.sold, stats.healthy), (3, 2, 1, 2));
}

#[tokio::test]
async fn test_stale_token_is_unauthorized() {
    let (client, _) = spawn_backend().await;
    let mut session = logged_in(&client).await;
    session.token = Some("stale".to_string());

    let err = client.list(&session).await.unwrap_err();
    assert!(err.is_auth_failure());

    session.token = None;
    assert!(matches!(
        client.stats(&session).await,
        Err(BeehiveError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_lookups_map_missing_to_none() {
    let (client, _) = spawn_backend().await;
    let session = logged_in(&client).await;

    assert!(client.find_by_serial(&session, "TO001").await.unwrap().is_some());
    assert!(client.find_by_serial(&session, "TO404").await.unwrap().is_none());

    let hive = client.find_by_token("ABC123DEF456").await.unwrap().unwrap();
    assert_eq!(hive.serial_number, "TO001");
    assert_eq!(hive.species.as_deref(), Some("Apis cerana"));
    assert!(client.find_by_token("UNKNOWN00000").await.unwrap().is_none());

    let sold = client.sell(&session, "TO001").await.unwrap();
    assert!(sold.sold_state_consistent());
}

#[tokio::test]
async fn test_create_sends_backend_health_label() {
    let (client, mock) = spawn_backend().await;
    let session = logged_in(&client).await;

    let hive = client.create(&session, new_hive("fresh")).await.unwrap();
    assert_eq!(hive.serial_number, "TO004");
    assert_eq!(hive.health_status, HealthStatus::Weak);

    let sent = mock.created.lock().unwrap();
    assert_eq!(sent[0]["health_status"], "Yếu");
    assert_eq!(sent[0]["import_date"], "2024-04-01");
}

#[tokio::test]
async fn test_bulk_continues_past_remote_rejection() {
    let (client, mock) = spawn_backend().await;
    let session = logged_in(&client).await;

    let mut inputs: Vec<NewBeehive> = (0..4).map(|i| new_hive(&format!("hive {i}"))).collect();
    inputs.insert(1, new_hive("reject me"));

    let report = bulk::create_many(&client, &session, inputs).await.unwrap();
    assert_eq!(report.succeeded(), 4);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(report.failures[0].error.contains("Split date"));
    assert_eq!(mock.created.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_bulk_stops_when_session_is_rejected() {
    let (client, mock) = spawn_backend().await;
    let mut session = logged_in(&client).await;
    session.token = Some("stale".to_string());

    let inputs = vec![new_hive("a"), new_hive("b"), new_hive("c")];
    let report = bulk::create_many(&client, &session, inputs).await.unwrap();

    assert!(report.session_rejected);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 0);
    assert!(mock.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_export_pdf_returns_bytes() {
    let (client, _) = spawn_backend().await;
    let session = logged_in(&client).await;

    let bytes = client
        .export_qr_pdf(&session, &["TO001".to_string(), "TO002".to_string()])
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let err = client.export_qr_pdf(&session, &[]).await.unwrap_err();
    assert!(matches!(err, BeehiveError::Validation(ref m) if m.contains("No serial")));
}

#[tokio::test]
async fn test_remote_gate_persists_session_locally() {
    let (client, _) = spawn_backend().await;
    let store = Store::in_memory();
    let gate = RemoteSessionGate::new(client, store.clone());

    assert!(matches!(
        gate.login("admin", "letmein").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(store.current_session().await.unwrap().is_none());

    let session = gate.login("admin", "admin123").await.unwrap();
    assert_eq!(store.current_session().await.unwrap(), Some(session.clone()));

    let refreshed = gate.refresh(&session).await.unwrap();
    assert_eq!(refreshed.user.business_name.as_deref(), Some("Refreshed Farm"));
    assert_eq!(store.current_session().await.unwrap(), Some(refreshed));

    let patch = ProfilePatch {
        business_name: Some("Saigon Bees".to_string()),
        ..ProfilePatch::default()
    };
    let updated = gate.update_profile(&session, patch).await.unwrap();
    assert_eq!(updated.user.business_name.as_deref(), Some("Saigon Bees"));
    assert_eq!(updated.token.as_deref(), Some(TOKEN));

    let mut stale = updated.clone();
    stale.token = Some("stale".to_string());
    assert!(matches!(
        gate.update_profile(&stale, ProfilePatch {
            email: Some("new@kbee.vn".to_string()),
            ..ProfilePatch::default()
        })
        .await,
        Err(AuthError::SessionExpired)
    ));
    assert!(store.current_session().await.unwrap().is_none());
}
