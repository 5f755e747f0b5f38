// src/handlers/appointments.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath, AppQuery},
        time,
    },
    config::AppState,
    db::AppointmentFilter,
    middleware::i18n::Locale,
    models::appointment::{Appointment, AppointmentDetail, AppointmentOutcome, AppointmentStatus, AppointmentStatusInput},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListAppointmentsQuery {
    /// Dia do agendamento (AAAA-MM-DD), no fuso do servidor
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub closer_id: Option<Uuid>,
}

impl ListAppointmentsQuery {
    pub fn into_filter(self) -> AppointmentFilter {
        let (from, to) = match self.date {
            Some(date) => {
                let (start, end) = time::day_window(date, &Local);
                (Some(start), Some(end))
            }
            None => (None, None),
        };
        AppointmentFilter {
            from,
            to,
            status: self.status,
            closer_id: self.closer_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentPayload {
    pub lead_id: Uuid,
    pub closer_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentStatusPayload {
    /// `NO_SHOW` genérico é resolvido pelo motivo
    pub status: AppointmentStatusInput,
    #[validate(length(max = 500))]
    #[schema(example = "Ghosting")]
    pub no_show_reason: Option<String>,
}

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    params(ListAppointmentsQuery),
    responses(
        (status = 200, description = "Consultas filtradas, por horário", body = Vec<AppointmentDetail>),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ListAppointmentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.into_filter();

    let appointments = app_state
        .appointment_service
        .list_appointments(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(appointments)))
}

// GET /api/appointments/today
#[utoipa::path(
    get,
    path = "/api/appointments/today",
    tag = "Appointments",
    responses(
        (status = 200, description = "Consultas de hoje", body = Vec<AppointmentDetail>)
    )
)]
pub async fn todays_appointments(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let appointments = app_state
        .appointment_service
        .todays_appointments(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(appointments)))
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Consulta agendada", body = Appointment),
        (status = 400, description = "Dados inválidos ou lead já agendado"),
        (status = 404, description = "Lead ou closer não encontrado")
    )
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let appointment = app_state
        .appointment_service
        .create_appointment(
            &app_state.db_pool,
            payload.lead_id,
            payload.closer_id,
            payload.scheduled_at,
            payload.notes.as_deref(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

// PUT /api/appointments/{id}/status
#[utoipa::path(
    put,
    path = "/api/appointments/{id}/status",
    tag = "Appointments",
    request_body = UpdateAppointmentStatusPayload,
    params(("id" = Uuid, Path, description = "ID da consulta")),
    responses(
        (status = 200, description = "Status atualizado", body = Appointment),
        (status = 400, description = "Dados inválidos ou transição não permitida"),
        (status = 404, description = "Consulta não encontrada")
    )
)]
pub async fn update_appointment_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateAppointmentStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let status = payload.status.resolve(payload.no_show_reason.as_deref());
    let outcome = AppointmentOutcome {
        no_show_reason: payload.no_show_reason,
        ..Default::default()
    };

    let appointment = app_state
        .appointment_service
        .change_status(&app_state.db_pool, id, status, outcome)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(appointment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_filter_becomes_a_day_window() {
        let query = ListAppointmentsQuery {
            date: NaiveDate::from_ymd_opt(2025, 3, 14),
            status: Some(AppointmentStatus::Scheduled),
            closer_id: None,
        };
        let filter = query.into_filter();
        let (from, to) = (filter.from.unwrap(), filter.to.unwrap());
        assert!(from < to);
        assert_eq!(filter.status, Some(AppointmentStatus::Scheduled));
    }

    #[test]
    fn no_filters_means_everything() {
        let filter = ListAppointmentsQuery::default().into_filter();
        assert!(filter.from.is_none() && filter.to.is_none());
        assert!(filter.status.is_none() && filter.closer_id.is_none());
    }
}
