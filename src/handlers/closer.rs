// src/handlers/closer.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath},
        validation::field_error,
    },
    config::AppState,
    handlers::deals::CreateDealPayload,
    middleware::i18n::Locale,
    models::{
        appointment::{Appointment, AppointmentOutcome, AppointmentStatusInput},
        dashboard::CloserDashboard,
        deal::{DealStatus, DealWithPayments},
        lead::CloserLeadView,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAppointmentPayload {
    #[schema(example = "COMPLETED")]
    pub status: AppointmentStatusInput,
    pub showed_up: Option<bool>,

    /// Minutos
    #[validate(range(min = 0, max = 1440))]
    #[schema(example = 45)]
    pub call_duration: Option<i32>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    #[validate(length(max = 500))]
    pub no_show_reason: Option<String>,
}

// O closer sempre informa o status do deal.
fn require_status(payload: &CreateDealPayload) -> Result<DealStatus, ValidationErrors> {
    payload
        .status
        .ok_or_else(|| field_error("status", "required", "O status é obrigatório."))
}

// GET /api/closer/dashboard/{closerId}
#[utoipa::path(
    get,
    path = "/api/closer/dashboard/{closerId}",
    tag = "Closer",
    params(("closerId" = Uuid, Path, description = "ID do closer")),
    responses(
        (status = 200, description = "Agenda de hoje, follow-ups e números do closer", body = CloserDashboard),
        (status = 404, description = "Closer não encontrado")
    )
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(closer_id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = app_state
        .closer_service
        .dashboard(&app_state.db_pool, closer_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(dashboard)))
}

// POST /api/closer/appointment/{id}/complete
#[utoipa::path(
    post,
    path = "/api/closer/appointment/{id}/complete",
    tag = "Closer",
    request_body = CompleteAppointmentPayload,
    params(("id" = Uuid, Path, description = "ID da consulta")),
    responses(
        (status = 200, description = "Consulta encerrada", body = Appointment),
        (status = 400, description = "Dados inválidos ou transição não permitida"),
        (status = 404, description = "Consulta não encontrada")
    )
)]
pub async fn complete_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<CompleteAppointmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let status = payload.status.resolve(payload.no_show_reason.as_deref());
    let outcome = AppointmentOutcome {
        no_show_reason: payload.no_show_reason,
        showed_up: payload.showed_up,
        call_duration: payload.call_duration,
        notes: payload.notes,
    };

    let appointment = app_state
        .appointment_service
        .change_status(&app_state.db_pool, id, status, outcome)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(appointment)))
}

// POST /api/closer/deal/create
#[utoipa::path(
    post,
    path = "/api/closer/deal/create",
    tag = "Closer",
    request_body = CreateDealPayload,
    responses(
        (status = 201, description = "Deal criado", body = DealWithPayments),
        (status = 400, description = "Dados inválidos ou consulta já tem deal"),
        (status = 404, description = "Consulta não encontrada")
    )
)]
pub async fn create_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateDealPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let status = require_status(&payload)
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let deal = app_state
        .deal_service
        .create_deal(&app_state.db_pool, payload.into_input(status))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(deal)))
}

// GET /api/closer/lead/{id}
#[utoipa::path(
    get,
    path = "/api/closer/lead/{id}",
    tag = "Closer",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Ficha do lead para a ligação", body = CloserLeadView),
        (status = 404, description = "Lead não encontrado")
    )
)]
pub async fn get_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = app_state
        .lead_service
        .closer_view(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}
