// src/handlers/campaigns.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath},
        validation::{cross_field, positive_amount},
    },
    config::AppState,
    db::{CampaignChanges, NewCampaign},
    middleware::i18n::Locale,
    models::campaign::{Campaign, CampaignStatsResponse, CampaignStatus, CampaignWithLeadCount},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateCampaignPayload {
    #[validate(length(min = 1, max = 200, message = "O nome é obrigatório."))]
    #[schema(example = "Frühjahrsaktion Coaching")]
    pub name: String,

    #[validate(custom(function = "positive_amount"))]
    #[schema(example = "1500.00")]
    pub budget: Decimal,

    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub facebook_id: Option<String>,
}

fn validate_create_dates(payload: &CreateCampaignPayload) -> Result<(), ValidationError> {
    match payload.end_date {
        Some(end) if end < payload.start_date => Err(cross_field(
            "date_order",
            "endDate must not be before startDate",
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_budget"))]
pub struct UpdateCampaignPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub budget: Option<Decimal>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<CampaignStatus>,
    pub facebook_id: Option<String>,
}

fn validate_update_budget(payload: &UpdateCampaignPayload) -> Result<(), ValidationError> {
    match payload.budget {
        Some(budget) => positive_amount(&budget),
        None => Ok(()),
    }
}

// GET /api/campaigns
#[utoipa::path(
    get,
    path = "/api/campaigns",
    tag = "Campaigns",
    responses(
        (status = 200, description = "Campanhas com o número de leads", body = Vec<CampaignWithLeadCount>)
    )
)]
pub async fn list_campaigns(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let campaigns = app_state
        .campaign_service
        .list_campaigns(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(campaigns)))
}

// POST /api/campaigns
#[utoipa::path(
    post,
    path = "/api/campaigns",
    tag = "Campaigns",
    request_body = CreateCampaignPayload,
    responses(
        (status = 201, description = "Campanha criada", body = Campaign),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_campaign(
    State(app_state): State<AppState>,
    locale: Locale,
    AppJson(payload): AppJson<CreateCampaignPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let input = NewCampaign {
        name: payload.name.trim(),
        budget: payload.budget,
        start_date: payload.start_date,
        end_date: payload.end_date,
        facebook_id: payload.facebook_id.as_deref(),
    };

    let campaign = app_state
        .campaign_service
        .create_campaign(&app_state.db_pool, &input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(campaign)))
}

// PUT /api/campaigns/{id}
#[utoipa::path(
    put,
    path = "/api/campaigns/{id}",
    tag = "Campaigns",
    request_body = UpdateCampaignPayload,
    params(("id" = Uuid, Path, description = "ID da campanha")),
    responses(
        (status = 200, description = "Campanha atualizada", body = Campaign),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Campanha não encontrada")
    )
)]
pub async fn update_campaign(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateCampaignPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let changes = CampaignChanges {
        name: payload.name.as_deref().map(str::trim),
        budget: payload.budget,
        end_date: payload.end_date,
        status: payload.status,
        facebook_id: payload.facebook_id.as_deref(),
    };

    let campaign = app_state
        .campaign_service
        .update_campaign(&app_state.db_pool, id, &changes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(campaign)))
}

// GET /api/campaigns/{id}/stats
#[utoipa::path(
    get,
    path = "/api/campaigns/{id}/stats",
    tag = "Campaigns",
    params(("id" = Uuid, Path, description = "ID da campanha")),
    responses(
        (status = 200, description = "Funil da campanha", body = CampaignStatsResponse),
        (status = 404, description = "Campanha não encontrada")
    )
)]
pub async fn campaign_stats(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .campaign_service
        .campaign_stats(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn payload() -> CreateCampaignPayload {
        CreateCampaignPayload {
            name: "Frühjahrsaktion".into(),
            budget: dec!(1500),
            start_date: Utc::now(),
            end_date: None,
            facebook_id: None,
        }
    }

    #[test]
    fn valid_campaign_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn budget_must_be_positive() {
        let p = CreateCampaignPayload { budget: dec!(0), ..payload() };
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("budget"));
    }

    #[test]
    fn budget_must_fit_the_money_column() {
        let p = CreateCampaignPayload { budget: dec!(100000000000), ..payload() };
        assert!(p.validate().unwrap_err().field_errors().contains_key("budget"));

        let p = UpdateCampaignPayload {
            name: None,
            budget: Some(dec!(100000000000)),
            end_date: None,
            status: None,
            facebook_id: None,
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let base = payload();
        let p = CreateCampaignPayload {
            end_date: Some(base.start_date - Duration::days(1)),
            ..base
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn update_rejects_non_positive_budget() {
        let p = UpdateCampaignPayload {
            name: None,
            budget: Some(dec!(-10)),
            end_date: None,
            status: None,
            facebook_id: None,
        };
        assert!(p.validate().is_err());
    }
}
