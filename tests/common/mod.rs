//! Utilitários dos testes de integração contra um Postgres real.
//!
//! `TEST_DATABASE_URL` aponta para um banco descartável. Sem a variável os
//! testes que dependem dele retornam cedo.

#![allow(dead_code)]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;
use uuid::Uuid;

use sales_crm::{app::create_app, config::AppState};

/// Pool do banco de teste com as migrations aplicadas.
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL não definida, pulando teste com banco");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

pub fn test_app(pool: &PgPool) -> Router {
    create_app(AppState::with_pool(pool.clone()), &[])
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"].as_str().and_then(|s| s.parse().ok()).expect("id")
}

/// Um dia bem no futuro, diferente a cada chamada, para que relatórios por
/// data não vejam dados de outros testes nem de execuções anteriores.
pub fn isolated_day() -> NaiveDate {
    let offset = (Uuid::new_v4().as_u128() % 30_000) as u64;
    NaiveDate::from_ymd_opt(2100, 1, 1)
        .and_then(|d| d.checked_add_days(chrono::Days::new(offset)))
        .expect("date")
}

/// Meio-dia local do dia, para cair na janela do dia no fuso do servidor.
pub fn local_noon(date: NaiveDate) -> DateTime<Utc> {
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("time"));
    Local
        .from_local_datetime(&noon)
        .earliest()
        .expect("local noon")
        .with_timezone(&Utc)
}

pub async fn create_closer(app: &Router) -> Uuid {
    let payload = json!({
        "name": "Lena Vogt",
        "email": format!("lena.{}@vertrieb.de", Uuid::new_v4().simple()),
        "role": "CLOSER"
    });
    let (status, body) = send(app, json_request(Method::POST, "/api/admin/users", &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

pub async fn create_lead(app: &Router) -> Uuid {
    let campaign = json!({
        "name": "Frühjahr Facebook",
        "budget": 1500,
        "startDate": "2025-03-01T00:00:00Z"
    });
    let (status, body) = send(app, json_request(Method::POST, "/api/campaigns", &campaign)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let lead = json!({
        "campaignId": id_of(&body),
        "firstName": "Jonas",
        "lastName": "Becker",
        "phone": "+49 151 2345678"
    });
    let (status, body) = send(app, json_request(Method::POST, "/api/leads", &lead)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

/// Lead novo com consulta agendada para `scheduled_at`.
pub async fn create_appointment(app: &Router, closer_id: Uuid, scheduled_at: DateTime<Utc>) -> Uuid {
    let lead_id = create_lead(app).await;
    let payload = json!({
        "leadId": lead_id,
        "closerId": closer_id,
        "scheduledAt": scheduled_at
    });
    let (status, body) = send(app, json_request(Method::POST, "/api/appointments", &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    id_of(&body)
}

pub async fn fetch_closer(app: &Router, closer_id: Uuid) -> Value {
    let (status, body) = send(app, get(&format!("/api/admin/closer/{closer_id}"))).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}
