// src/handlers/leads.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath},
    },
    config::AppState,
    db::NewLead,
    middleware::i18n::Locale,
    models::lead::{Lead, LeadDetail},
};

pub const DEFAULT_LEAD_SOURCE: &str = "FACEBOOK";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    pub campaign_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    #[schema(example = "Anna")]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "O sobrenome é obrigatório."))]
    #[schema(example = "Schmidt")]
    pub last_name: String,

    #[validate(length(min = 3, max = 40, message = "Telefone inválido."))]
    #[schema(example = "+49 170 1234567")]
    pub phone: String,

    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,

    /// Padrão: FACEBOOK
    #[validate(length(min = 1, max = 50))]
    pub source: Option<String>,

    pub facebook_id: Option<String>,
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    responses(
        (status = 200, description = "Leads com campanha, consulta e deal", body = Vec<LeadDetail>)
    )
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let leads = app_state
        .lead_service
        .list_leads(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(leads)))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Campanha não encontrada")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateLeadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let input = NewLead {
        campaign_id: payload.campaign_id,
        first_name: payload.first_name.trim(),
        last_name: payload.last_name.trim(),
        phone: payload.phone.trim(),
        email: payload.email.as_deref(),
        source: payload.source.as_deref().unwrap_or(DEFAULT_LEAD_SOURCE),
        facebook_id: payload.facebook_id.as_deref(),
    };

    let lead = app_state
        .lead_service
        .create_lead(&app_state.db_pool, &input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads/{id}
#[utoipa::path(
    get,
    path = "/api/leads/{id}",
    tag = "Leads",
    params(("id" = Uuid, Path, description = "ID do lead")),
    responses(
        (status = 200, description = "Lead com campanha, consulta, closer, deal e pagamentos", body = LeadDetail),
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
        .get_lead(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(lead)))
}
