// src/handlers/deals.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        error::{ApiError, AppError},
        extract::{AppJson, AppPath, AppQuery},
        validation::{cross_field, non_negative_amount, positive_amount},
    },
    config::AppState,
    db::DealFilter,
    middleware::i18n::Locale,
    models::deal::{Deal, DealDetail, DealStatus, DealWithPayments, Payment, PaymentPlan, PaymentType},
    services::deal_service::{CreateDeal, UpdateDealStatus},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListDealsQuery {
    pub status: Option<DealStatus>,
    pub closer_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_payment_plan"))]
pub struct CreateDealPayload {
    pub appointment_id: Uuid,

    /// Padrão: WON
    pub status: Option<DealStatus>,

    #[validate(custom(function = "positive_amount"))]
    #[schema(example = "2500.00")]
    pub product_price: Decimal,

    #[schema(example = "FULL")]
    pub payment_type: PaymentType,

    // À vista
    pub full_amount: Option<Decimal>,

    // Parcelado
    #[schema(example = "500.00")]
    pub down_payment: Option<Decimal>,
    #[schema(example = "200.00")]
    pub monthly_rate: Option<Decimal>,
    #[validate(range(min = 1, max = 120))]
    #[schema(example = 5)]
    pub number_of_rates: Option<i32>,

    pub follow_up_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub lost_reason: Option<String>,

    /// A entrada já foi paga (registra um pagamento junto com o deal)
    #[serde(default)]
    pub down_payment_received: bool,
}

// Parcelado exige entrada, parcela e número de parcelas. Valores nunca negativos
// e dentro do limite da coluna.
fn validate_payment_plan(payload: &CreateDealPayload) -> Result<(), ValidationError> {
    for amount in [payload.full_amount, payload.down_payment, payload.monthly_rate]
        .into_iter()
        .flatten()
    {
        non_negative_amount(&amount)?;
    }

    if payload.payment_type == PaymentType::Installments
        && (payload.down_payment.is_none()
            || payload.monthly_rate.is_none()
            || payload.number_of_rates.is_none())
    {
        return Err(cross_field(
            "incomplete_plan",
            "installments need downPayment, monthlyRate and numberOfRates",
        ));
    }
    Ok(())
}

impl CreateDealPayload {
    pub fn into_input(self, default_status: DealStatus) -> CreateDeal {
        CreateDeal {
            appointment_id: self.appointment_id,
            status: self.status.unwrap_or(default_status),
            product_price: self.product_price,
            plan: PaymentPlan {
                payment_type: self.payment_type,
                full_amount: self.full_amount,
                down_payment: self.down_payment,
                monthly_rate: self.monthly_rate,
                number_of_rates: self.number_of_rates,
            },
            follow_up_date: self.follow_up_date,
            lost_reason: self.lost_reason,
            down_payment_received: self.down_payment_received,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealPayload {
    pub status: DealStatus,
    #[validate(length(max = 500))]
    pub lost_reason: Option<String>,
    pub follow_up_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentPayload {
    #[validate(custom(function = "positive_amount"))]
    #[schema(example = "200.00")]
    pub amount: Decimal,
    #[validate(length(max = 200))]
    #[schema(example = "Rate 1")]
    pub note: Option<String>,
}

// GET /api/deals
#[utoipa::path(
    get,
    path = "/api/deals",
    tag = "Deals",
    params(ListDealsQuery),
    responses(
        (status = 200, description = "Deals com lead, closer e pagamentos", body = Vec<DealDetail>),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn list_deals(
    State(app_state): State<AppState>,
    locale: Locale,
    AppQuery(query): AppQuery<ListDealsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = DealFilter {
        status: query.status,
        closer_id: query.closer_id,
    };

    let deals = app_state
        .deal_service
        .list_deals(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deals)))
}

// GET /api/deals/{id}
#[utoipa::path(
    get,
    path = "/api/deals/{id}",
    tag = "Deals",
    params(("id" = Uuid, Path, description = "ID do deal")),
    responses(
        (status = 200, description = "Deal com lead, closer e pagamentos", body = DealDetail),
        (status = 404, description = "Deal não encontrado")
    )
)]
pub async fn get_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deal = app_state
        .deal_service
        .get_deal(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deal)))
}

// POST /api/deals
#[utoipa::path(
    post,
    path = "/api/deals",
    tag = "Deals",
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
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let deal = app_state
        .deal_service
        .create_deal(&app_state.db_pool, payload.into_input(DealStatus::Won))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(deal)))
}

// PUT /api/deals/{id}
#[utoipa::path(
    put,
    path = "/api/deals/{id}",
    tag = "Deals",
    request_body = UpdateDealPayload,
    params(("id" = Uuid, Path, description = "ID do deal")),
    responses(
        (status = 200, description = "Status atualizado", body = Deal),
        (status = 400, description = "Dados inválidos ou transição não permitida"),
        (status = 404, description = "Deal não encontrado")
    )
)]
pub async fn update_deal(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateDealPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let input = UpdateDealStatus {
        status: payload.status,
        lost_reason: payload.lost_reason,
        follow_up_date: payload.follow_up_date,
    };

    let deal = app_state
        .deal_service
        .update_status(&app_state.db_pool, id, &input)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deal)))
}

// POST /api/deals/{id}/payments
#[utoipa::path(
    post,
    path = "/api/deals/{id}/payments",
    tag = "Deals",
    request_body = AddPaymentPayload,
    params(("id" = Uuid, Path, description = "ID do deal")),
    responses(
        (status = 201, description = "Pagamento registrado", body = Payment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Deal não encontrado")
    )
)]
pub async fn add_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<AddPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .deal_service
        .add_payment(&app_state.db_pool, id, payload.amount, payload.note.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}
