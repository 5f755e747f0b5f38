// src/handlers/reports.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::{error::ApiError, extract::AppQuery},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        reports::{CloserStatsEntry, NoShowReport, RevenueReport},
        stats::DailyStats,
    },
    services::report_service::DateRange,
};

/// Datas do calendário, ambas inclusivas.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReportRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<ReportRangeQuery> for DateRange {
    fn from(query: ReportRangeQuery) -> Self {
        Self {
            start: query.start_date,
            end: query.end_date,
        }
    }
}

// GET /api/reports/closer-stats
#[utoipa::path(
    get,
    path = "/api/reports/closer-stats",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Desempenho por closer no período", body = Vec<CloserStatsEntry>),
        (status = 400, description = "Intervalo inválido")
    )
)]
pub async fn closer_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ReportRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .report_service
        .closer_stats(&app_state.db_pool, query.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/reports/revenue
#[utoipa::path(
    get,
    path = "/api/reports/revenue",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Receita reconhecida dos deals ganhos", body = RevenueReport),
        (status = 400, description = "Intervalo inválido")
    )
)]
pub async fn revenue(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ReportRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .revenue(&app_state.db_pool, query.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/no-shows
#[utoipa::path(
    get,
    path = "/api/reports/no-shows",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "No-shows agrupados por motivo", body = NoShowReport),
        (status = 400, description = "Intervalo inválido")
    )
)]
pub async fn no_shows(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ReportRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .report_service
        .no_shows(&app_state.db_pool, query.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(report)))
}

// GET /api/reports/daily-stats
#[utoipa::path(
    get,
    path = "/api/reports/daily-stats",
    tag = "Reports",
    params(ReportRangeQuery),
    responses(
        (status = 200, description = "Linhas diárias gravadas, por data", body = Vec<DailyStats>),
        (status = 400, description = "Intervalo inválido")
    )
)]
pub async fn daily_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ReportRangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .report_service
        .daily_stats(&app_state.db_pool, query.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rows)))
}
