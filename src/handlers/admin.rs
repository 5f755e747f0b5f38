// src/handlers/admin.rs

use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath, AppQuery},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{
        dashboard::{AdminDashboard, CloserDetail},
        stats::DailyStats,
        user::{User, UserRole},
    },
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDailyStatsPayload {
    /// Padrão: hoje
    pub date: Option<NaiveDate>,
}

impl UpdateDailyStatsPayload {
    /// Corpo vazio vale como `{}`.
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    pub role: Option<UserRole>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 100, message = "O nome é obrigatório."))]
    #[schema(example = "Max Mustermann")]
    pub name: String,

    #[validate(email(message = "E-mail inválido."))]
    #[schema(example = "max@vertrieb.de")]
    pub email: String,

    pub role: UserRole,
}

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Ranking, números de hoje e show-up rate de 7 dias", body = AdminDashboard)
    )
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = app_state
        .admin_service
        .dashboard(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(dashboard)))
}

// GET /api/admin/closer/{id}
#[utoipa::path(
    get,
    path = "/api/admin/closer/{id}",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID do closer")),
    responses(
        (status = 200, description = "Closer com as últimas consultas e deals", body = CloserDetail),
        (status = 404, description = "Closer não encontrado")
    )
)]
pub async fn closer_detail(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .admin_service
        .closer_detail(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/admin/update-daily-stats
#[utoipa::path(
    post,
    path = "/api/admin/update-daily-stats",
    tag = "Admin",
    request_body(content = UpdateDailyStatsPayload, description = "Opcional; sem corpo vale hoje"),
    responses(
        (status = 200, description = "Linha do dia recalculada", body = DailyStats),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn update_daily_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let payload = UpdateDailyStatsPayload::from_body(&body).map_err(|e| {
        tracing::debug!("Corpo rejeitado: {}", e);
        ApiError::new(
            StatusCode::BAD_REQUEST,
            app_state.i18n_store.message(&locale.0, "invalid_data"),
        )
    })?;

    let row = app_state
        .admin_service
        .update_daily_stats(&app_state.db_pool, payload.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(row)))
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Usuários, por receita", body = Vec<User>)
    )
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ListUsersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .admin_service
        .list_users(&app_state.db_pool, query.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "Admin",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Dados inválidos ou e-mail já cadastrado")
    )
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let email = payload.email.trim().to_lowercase();
    let user = app_state
        .admin_service
        .create_user(&app_state.db_pool, payload.name.trim(), &email, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/admin/closers/recompute-counters
#[utoipa::path(
    post,
    path = "/api/admin/closers/recompute-counters",
    tag = "Admin",
    responses(
        (status = 200, description = "Closers com os contadores recalculados", body = Vec<User>)
    )
)]
pub async fn recompute_counters(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let closers = app_state
        .admin_service
        .recompute_counters(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(closers)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_means_today() {
        assert!(UpdateDailyStatsPayload::from_body(b"").unwrap().date.is_none());
        assert!(UpdateDailyStatsPayload::from_body(b"  \n").unwrap().date.is_none());
        assert!(UpdateDailyStatsPayload::from_body(b"{}").unwrap().date.is_none());
    }

    #[test]
    fn explicit_date_is_parsed() {
        let payload = UpdateDailyStatsPayload::from_body(br#"{"date":"2025-03-14"}"#).unwrap();
        assert_eq!(payload.date, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert!(UpdateDailyStatsPayload::from_body(br#"{"date":"gestern"}"#).is_err());
    }

    #[test]
    fn user_payload_requires_a_valid_email() {
        let payload = CreateUserPayload {
            name: "Max".into(),
            email: "max".into(),
            role: UserRole::Closer,
        };
        assert!(payload.validate().unwrap_err().field_errors().contains_key("email"));
    }
}
