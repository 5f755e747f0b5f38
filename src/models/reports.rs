// src/models/reports.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::appointment::AppointmentDetail;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserStatsEntry {
    pub id: Uuid,
    pub name: String,
    pub total_deals: i64,
    pub won: i64,
    pub lost: i64,
    pub follow_up: i64,
    /// Percentual com uma casa decimal
    #[schema(example = 42.9)]
    pub conversion_rate: f64,
    #[schema(example = "7500.00")]
    pub revenue: Decimal,
    #[schema(example = "2500.00")]
    pub avg_deal_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub total_revenue: Decimal,
    pub total_deals: i64,
    pub avg_deal_value: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoShowReport {
    pub total: i64,
    pub by_reason: BTreeMap<String, i64>,
    pub details: Vec<AppointmentDetail>,
}
