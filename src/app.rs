// src/app.rs

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

/// Monta o router completo da API.
pub fn create_app(app_state: AppState, cors_origins: &[String]) -> Router {
    let campaign_routes = Router::new()
        .route("/"
               ,get(handlers::campaigns::list_campaigns)
               .post(handlers::campaigns::create_campaign)
        )
        .route("/{id}", put(handlers::campaigns::update_campaign))
        .route("/{id}/stats", get(handlers::campaigns::campaign_stats));

    let lead_routes = Router::new()
        .route("/"
               ,get(handlers::leads::list_leads)
               .post(handlers::leads::create_lead)
        )
        .route("/{id}", get(handlers::leads::get_lead));

    let appointment_routes = Router::new()
        .route("/"
               ,get(handlers::appointments::list_appointments)
               .post(handlers::appointments::create_appointment)
        )
        .route("/today", get(handlers::appointments::todays_appointments))
        .route("/{id}/status", put(handlers::appointments::update_appointment_status));

    let deal_routes = Router::new()
        .route("/"
               ,get(handlers::deals::list_deals)
               .post(handlers::deals::create_deal)
        )
        .route("/{id}"
               ,get(handlers::deals::get_deal)
               .put(handlers::deals::update_deal)
        )
        .route("/{id}/payments", post(handlers::deals::add_payment));

    let report_routes = Router::new()
        .route("/closer-stats", get(handlers::reports::closer_stats))
        .route("/revenue", get(handlers::reports::revenue))
        .route("/no-shows", get(handlers::reports::no_shows))
        .route("/daily-stats", get(handlers::reports::daily_stats));

    let admin_routes = Router::new()
        .route("/dashboard", get(handlers::admin::dashboard))
        .route("/closer/{id}", get(handlers::admin::closer_detail))
        .route("/update-daily-stats", post(handlers::admin::update_daily_stats))
        .route("/users"
               ,get(handlers::admin::list_users)
               .post(handlers::admin::create_user)
        )
        .route("/closers/recompute-counters", post(handlers::admin::recompute_counters));

    let closer_routes = Router::new()
        .route("/dashboard/{closer_id}", get(handlers::closer::dashboard))
        .route("/appointment/{id}/complete", post(handlers::closer::complete_appointment))
        .route("/deal/create", post(handlers::closer::create_deal))
        .route("/lead/{id}", get(handlers::closer::get_lead));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .merge(SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/campaigns", campaign_routes)
        .nest("/api/leads", lead_routes)
        .nest("/api/appointments", appointment_routes)
        .nest("/api/deals", deal_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/closer", closer_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(app_state)
}

// Sem origens configuradas, libera qualquer uma.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<_> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Origem CORS ignorada: {}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
