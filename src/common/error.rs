// src/common/error.rs

use std::collections::HashMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Erros de domínio. Cada variante vira um ApiError com mensagem traduzida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Transição de status inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Intervalo de datas inválido")]
    InvalidDateRange,

    #[error("Registro duplicado: {0}")]
    UniqueConstraintViolation(String),

    #[error("Campanha não encontrada")]
    CampaignNotFound,

    #[error("Lead não encontrado")]
    LeadNotFound,

    #[error("Consulta não encontrada")]
    AppointmentNotFound,

    #[error("Deal não encontrado")]
    DealNotFound,

    #[error("Closer não encontrado")]
    CloserNotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// O erro que efetivamente sai na resposta HTTP.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
        }
    }
}

impl AppError {
    /// Traduz o erro de domínio para a resposta, no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let (status, key) = self.status_and_key();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        } else {
            tracing::debug!("Requisição rejeitada: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError {
            status,
            message: i18n.message(lang, key).to_string(),
            details,
        }
    }

    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "invalid_data"),
            AppError::InvalidTransition { .. } => (StatusCode::BAD_REQUEST, "invalid_transition"),
            AppError::InvalidDateRange => (StatusCode::BAD_REQUEST, "invalid_date_range"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::BAD_REQUEST, "already_exists"),
            AppError::CampaignNotFound => (StatusCode::NOT_FOUND, "campaign_not_found"),
            AppError::LeadNotFound => (StatusCode::NOT_FOUND, "lead_not_found"),
            AppError::AppointmentNotFound => (StatusCode::NOT_FOUND, "appointment_not_found"),
            AppError::DealNotFound => (StatusCode::NOT_FOUND, "deal_not_found"),
            AppError::CloserNotFound => (StatusCode::NOT_FOUND, "closer_not_found"),
            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

fn validation_details(errors: &validator::ValidationErrors) -> HashMap<String, Vec<String>> {
    let mut details = HashMap::new();
    for (field, field_errors) in errors.field_errors() {
        let codes: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), codes);
    }
    details
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// JSON malformado ou de tipo errado não chega no handler: vira 400 genérico.
// Aqui ainda não temos o Locale, então a mensagem sai no idioma padrão.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("JSON rejeitado: {}", rejection.body_text());
        ApiError::new(
            StatusCode::BAD_REQUEST,
            I18nStore::default_message("invalid_data"),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Query string rejeitada: {}", rejection.body_text());
        ApiError::new(
            StatusCode::BAD_REQUEST,
            I18nStore::default_message("invalid_data"),
        )
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Parâmetro de rota rejeitado: {}", rejection.body_text());
        ApiError::new(
            StatusCode::BAD_REQUEST,
            I18nStore::default_message("invalid_data"),
        )
    }
}

/// Converte violação de chave única num erro amigável; o resto segue como erro de banco.
pub fn map_unique_violation(e: sqlx::Error, what: impl Into<String>) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(what.into());
        }
    }
    AppError::DatabaseError(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn not_found_errors_map_to_404() {
        let store = I18nStore::new();
        for err in [
            AppError::CampaignNotFound,
            AppError::LeadNotFound,
            AppError::AppointmentNotFound,
            AppError::DealNotFound,
            AppError::CloserNotFound,
        ] {
            assert_eq!(err.to_api_error(&en(), &store).status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn invalid_input_maps_to_400_with_generic_message() {
        let store = I18nStore::new();
        let err = AppError::InvalidTransition {
            from: "WON".into(),
            to: "PENDING".into(),
        };
        let api = err.to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(!api.message.contains("WON"));

        let api = AppError::InvalidDateRange.to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, store.message("en", "invalid_date_range"));
    }

    #[test]
    fn unexpected_errors_map_to_500_without_leaking_details() {
        let store = I18nStore::new();
        let err = AppError::DatabaseError(sqlx::Error::PoolTimedOut);
        let api = err.to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.to_lowercase().contains("pool"));

        let err = AppError::InternalServerError(anyhow::anyhow!("segredo"));
        let api = err.to_api_error(&en(), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.message.contains("segredo"));
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 1, message = "required"))]
        name: String,
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let store = I18nStore::new();
        let errors = Probe { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&en(), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details.get("name"), Some(&vec!["required".to_string()]));
    }

    #[test]
    fn messages_follow_the_locale() {
        let store = I18nStore::new();
        let de = Locale("de".to_string());
        let api = AppError::LeadNotFound.to_api_error(&de, &store);
        assert_eq!(api.message, "Lead nicht gefunden");
    }
}
