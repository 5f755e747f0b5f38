// Fluxos completos contra o Postgres de `TEST_DATABASE_URL`.

mod common;

use axum::http::{Method, StatusCode};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{
    create_appointment, create_closer, create_test_pool, fetch_closer, get, id_of, isolated_day,
    json_request, local_noon, send, test_app,
};
use sales_crm::{
    config::AppState,
    models::deal::{DealStatus, PaymentPlan, PaymentType},
    services::deal_service::CreateDeal,
};

#[tokio::test]
async fn generic_no_show_is_classified_and_grouped_by_reason() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let day = isolated_day();

    let reasons = ["Ghosting, nicht erreichbar", "Ghosting, nicht erreichbar", "Forgot the call"];
    for reason in reasons {
        let appointment_id = create_appointment(&app, closer_id, local_noon(day)).await;
        let (status, body) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/appointments/{appointment_id}/status"),
                &json!({ "status": "NO_SHOW", "noShowReason": reason }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["noShowReason"], reason);
        assert_eq!(body["showedUp"], false);
    }

    // Sem motivo: subtipo OTHER e agrupado como "No reason given"
    let appointment_id = create_appointment(&app, closer_id, local_noon(day)).await;
    let (status, body) = send(
        &app,
        json_request(
            Method::PUT,
            &format!("/api/appointments/{appointment_id}/status"),
            &json!({ "status": "NO_SHOW" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "NO_SHOW_OTHER");

    let (status, report) = send(&app, get(&format!("/api/reports/no-shows?startDate={day}&endDate={day}"))).await;
    assert_eq!(status, StatusCode::OK, "{report}");
    assert_eq!(report["total"], 4);
    assert_eq!(report["byReason"]["Ghosting, nicht erreichbar"], 2);
    assert_eq!(report["byReason"]["Forgot the call"], 1);
    assert_eq!(report["byReason"]["No reason given"], 1);

    let statuses: Vec<&str> = report["details"]
        .as_array()
        .expect("details")
        .iter()
        .filter_map(|d| d["status"].as_str())
        .collect();
    assert_eq!(statuses.iter().filter(|s| **s == "NO_SHOW_GHOSTING").count(), 2);
    assert_eq!(statuses.iter().filter(|s| **s == "NO_SHOW_FORGOT").count(), 1);
}

#[tokio::test]
async fn installment_deal_records_down_payment_and_later_payments() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let payload = json!({
        "appointmentId": appointment_id,
        "productPrice": 1500,
        "paymentType": "INSTALLMENTS",
        "downPayment": 500,
        "monthlyRate": 200,
        "numberOfRates": 5,
        "downPaymentReceived": true
    });
    let (status, deal) = send(&app, json_request(Method::POST, "/api/deals", &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{deal}");
    assert_eq!(deal["status"], "WON");
    assert_eq!(deal["totalValue"].as_f64(), Some(1500.0));
    assert_eq!(deal["payments"][0]["note"], "Down payment");
    assert_eq!(deal["paidTotal"].as_f64(), Some(500.0));

    let deal_id = id_of(&deal);
    let (status, payment) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/deals/{deal_id}/payments"),
            &json!({ "amount": 200, "note": "Rate 1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{payment}");

    let (status, detail) = send(&app, get(&format!("/api/deals/{deal_id}"))).await;
    assert_eq!(status, StatusCode::OK, "{detail}");
    assert_eq!(detail["payments"].as_array().map(Vec::len), Some(2));
    assert_eq!(detail["paidTotal"].as_f64(), Some(700.0));
    assert_eq!(detail["closer"]["id"], closer_id.to_string());

    // O contador do closer soma o valor total, não o que já foi pago
    let closer = fetch_closer(&app, closer_id).await;
    assert_eq!(closer["totalWins"], 1);
    assert_eq!(closer["totalRevenue"].as_f64(), Some(1500.0));
}

#[tokio::test]
async fn installment_total_beyond_the_money_column_is_a_400() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let payload = json!({
        "appointmentId": appointment_id,
        "productPrice": 1500,
        "paymentType": "INSTALLMENTS",
        "downPayment": 0,
        "monthlyRate": 9_000_000_000u64,
        "numberOfRates": 120
    });
    let (status, body) = send(&app, json_request(Method::POST, "/api/deals", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert!(body["details"]["total_value"].is_array());

    let closer = fetch_closer(&app, closer_id).await;
    assert_eq!(closer["deals"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn won_deal_cannot_go_back_to_pending() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let payload = json!({
        "appointmentId": appointment_id,
        "productPrice": 1200,
        "paymentType": "FULL"
    });
    let (status, deal) = send(&app, json_request(Method::POST, "/api/deals", &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{deal}");
    assert!(deal["closedAt"].is_string());

    let deal_id = id_of(&deal);
    let (status, body) = send(
        &app,
        json_request(Method::PUT, &format!("/api/deals/{deal_id}"), &json!({ "status": "PENDING" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (_, detail) = send(&app, get(&format!("/api/deals/{deal_id}"))).await;
    assert_eq!(detail["status"], "WON");
}

#[tokio::test]
async fn status_change_replaces_follow_up_date_and_lost_reason() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let payload = json!({
        "appointmentId": appointment_id,
        "status": "FOLLOW_UP",
        "productPrice": 1200,
        "paymentType": "FULL",
        "followUpDate": "2100-01-10T09:00:00Z",
        "lostReason": "Will mit Partnerin sprechen"
    });
    let (status, deal) = send(&app, json_request(Method::POST, "/api/deals", &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{deal}");
    assert!(deal["followUpDate"].is_string());
    assert!(deal["payments"].as_array().is_some_and(Vec::is_empty));

    let deal_id = id_of(&deal);
    let (status, updated) = send(
        &app,
        json_request(Method::PUT, &format!("/api/deals/{deal_id}"), &json!({ "status": "LOST_NO_NEED" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert!(updated["followUpDate"].is_null());
    assert!(updated["lostReason"].is_null());
    assert!(updated["closedAt"].is_null());
}

#[tokio::test]
async fn daily_stats_upsert_keeps_one_row_per_day() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let day = isolated_day();

    let appointment_id = create_appointment(&app, closer_id, local_noon(day)).await;
    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/closer/appointment/{appointment_id}/complete"),
            &json!({ "status": "COMPLETED", "callDuration": 40 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({ "date": day });
    let (status, first) = send(&app, json_request(Method::POST, "/api/admin/update-daily-stats", &body)).await;
    assert_eq!(status, StatusCode::OK, "{first}");
    let (status, second) = send(&app, json_request(Method::POST, "/api/admin/update-daily-stats", &body)).await;
    assert_eq!(status, StatusCode::OK, "{second}");

    assert_eq!(first["id"], second["id"]);
    assert_eq!(second["totalCalls"], 1);
    assert_eq!(second["showUpRate"].as_f64(), Some(100.0));
    assert_eq!(first["totalCalls"], second["totalCalls"]);

    let (status, rows) =
        send(&app, get(&format!("/api/reports/daily-stats?startDate={day}&endDate={day}"))).await;
    assert_eq!(status, StatusCode::OK, "{rows}");
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn closer_counters_follow_completed_calls_and_wins() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/closer/appointment/{appointment_id}/complete"),
            &json!({ "status": "COMPLETED", "showedUp": true }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetch_closer(&app, closer_id).await["totalCalls"], 1);

    let payload = json!({
        "appointmentId": appointment_id,
        "status": "PENDING",
        "productPrice": 2400,
        "paymentType": "FULL"
    });
    let (status, deal) = send(&app, json_request(Method::POST, "/api/closer/deal/create", &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "{deal}");
    assert_eq!(fetch_closer(&app, closer_id).await["totalWins"], 0);

    let deal_id = id_of(&deal);
    let (status, _) = send(
        &app,
        json_request(Method::PUT, &format!("/api/deals/{deal_id}"), &json!({ "status": "WON" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let closer = fetch_closer(&app, closer_id).await;
    assert_eq!(closer["totalCalls"], 1);
    assert_eq!(closer["totalWins"], 1);
    assert_eq!(closer["totalRevenue"].as_f64(), Some(2400.0));

    // Segundo deal na mesma consulta falha e não mexe nos contadores
    let (status, _) = send(&app, json_request(Method::POST, "/api/deals", &payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(fetch_closer(&app, closer_id).await["totalWins"], 1);
}

#[tokio::test]
async fn rolled_back_deal_takes_the_counters_with_it() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let state = AppState::with_pool(pool.clone());
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let input = CreateDeal {
        appointment_id,
        status: DealStatus::Won,
        product_price: dec!(900),
        plan: PaymentPlan {
            payment_type: PaymentType::Full,
            full_amount: None,
            down_payment: None,
            monthly_rate: None,
            number_of_rates: None,
        },
        follow_up_date: None,
        lost_reason: None,
        down_payment_received: false,
    };

    let mut tx = pool.begin().await.expect("begin");
    let created = state.deal_service.create_deal(&mut *tx, input).await.expect("deal");
    assert_eq!(created.paid_total, dec!(900));
    let (wins,): (i32,) = sqlx::query_as("SELECT total_wins FROM users WHERE id = $1")
        .bind(closer_id)
        .fetch_one(&mut *tx)
        .await
        .expect("counters");
    assert_eq!(wins, 1);
    tx.rollback().await.expect("rollback");

    let closer = fetch_closer(&app, closer_id).await;
    assert_eq!(closer["totalWins"], 0);
    assert_eq!(closer["totalRevenue"].as_f64(), Some(0.0));
    assert_eq!(closer["deals"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn recompute_counters_repairs_drift() {
    let Some(pool) = create_test_pool().await else { return };
    let app = test_app(&pool);
    let closer_id = create_closer(&app).await;
    let appointment_id = create_appointment(&app, closer_id, local_noon(isolated_day())).await;

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            &format!("/api/closer/appointment/{appointment_id}/complete"),
            &json!({ "status": "COMPLETED" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let payload = json!({
        "appointmentId": appointment_id,
        "productPrice": 3000,
        "paymentType": "FULL"
    });
    let (status, _) = send(&app, json_request(Method::POST, "/api/deals", &payload)).await;
    assert_eq!(status, StatusCode::CREATED);

    sqlx::query("UPDATE users SET total_calls = 42, total_wins = 7, total_revenue = 1 WHERE id = $1")
        .bind(closer_id)
        .execute(&pool)
        .await
        .expect("drift");

    let (status, closers) =
        send(&app, json_request(Method::POST, "/api/admin/closers/recompute-counters", &json!({}))).await;
    assert_eq!(status, StatusCode::OK, "{closers}");
    let repaired = closers
        .as_array()
        .and_then(|list| list.iter().find(|c| c["id"] == closer_id.to_string()))
        .expect("closer in response");
    assert_eq!(repaired["totalCalls"], 1);
    assert_eq!(repaired["totalWins"], 1);
    assert_eq!(repaired["totalRevenue"].as_f64(), Some(3000.0));

    let unknown = Uuid::new_v4();
    let (status, _) = send(&app, get(&format!("/api/admin/closer/{unknown}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
