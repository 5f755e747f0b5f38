// src/models/user.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Closer,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Max Mustermann")]
    pub name: String,
    #[schema(example = "max@vertrieb.de")]
    pub email: String,
    pub role: UserRole,

    // Contadores em cache. Só mudam junto com a escrita que os dispara.
    pub total_calls: i32,
    pub total_wins: i32,
    #[schema(example = "12500.00")]
    pub total_revenue: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Forma reduzida do closer embutida em outras respostas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for CloserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Contadores recalculados a partir das tabelas de origem.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CloserCounters {
    pub closer_id: Uuid,
    pub total_calls: i64,
    pub total_wins: i64,
    pub total_revenue: Decimal,
}
