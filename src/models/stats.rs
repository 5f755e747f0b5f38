// src/models/stats.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Uma linha por dia do calendário, gravada via upsert pela data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-03-14")]
    pub date: NaiveDate,
    pub total_leads: i32,
    pub total_calls: i32,
    pub total_wins: i32,
    pub total_revenue: Decimal,
    pub show_up_rate: f64,
    pub conversion_rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Os valores calculados de um dia, sem os metadados da linha.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatsValues {
    pub total_leads: i32,
    pub total_calls: i32,
    pub total_wins: i32,
    pub total_revenue: Decimal,
    pub show_up_rate: f64,
    pub conversion_rate: f64,
}

impl From<&DailyStats> for DailyStatsValues {
    fn from(row: &DailyStats) -> Self {
        Self {
            total_leads: row.total_leads,
            total_calls: row.total_calls,
            total_wins: row.total_wins,
            total_revenue: row.total_revenue,
            show_up_rate: row.show_up_rate,
            conversion_rate: row.conversion_rate,
        }
    }
}
