// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    appointment::{AppointmentDetail, AppointmentStatus},
    deal::Deal,
    stats::DailyStatsValues,
    user::User,
};

// --- Painel do admin ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserRankingEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub total_calls: i32,
    pub total_wins: i32,
    pub total_revenue: Decimal,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayDeal {
    pub id: Uuid,
    pub value: Decimal,
    pub closer: String,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub closer_ranking: Vec<CloserRankingEntry>,
    /// Zeros quando ainda não houve upsert do dia
    pub today_stats: DailyStatsValues,
    /// Soma do valor total dos deals ganhos hoje
    pub today_cashflow: Decimal,
    /// Últimos 7 dias
    pub show_up_rate: f64,
    pub today_deals: Vec<TodayDeal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserDetail {
    #[serde(flatten)]
    pub closer: User,
    pub appointments: Vec<AppointmentDetail>,
    pub deals: Vec<Deal>,
}

// --- Painel do closer ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentLeadInfo {
    pub name: String,
    pub phone: String,
    pub campaign: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayAppointmentEntry {
    pub id: Uuid,
    pub time: DateTime<Utc>,
    pub lead: AppointmentLeadInfo,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpEntry {
    pub id: Uuid,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub lead_name: String,
    pub product_price: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserOwnStats {
    pub total_calls: i32,
    pub total_wins: i32,
    pub total_revenue: Decimal,
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserDashboard {
    pub todays_appointments: Vec<TodayAppointmentEntry>,
    pub follow_ups: Vec<FollowUpEntry>,
    pub stats: CloserOwnStats,
}
