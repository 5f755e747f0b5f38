// src/models/deal.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{lead::LeadContact, user::CloserSummary};

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deal_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealStatus {
    Pending,
    Won,
    Lost,
    FollowUp,
    LostTooExpensive,
    LostNoNeed,
    LostCompetitor,
    LostOther,
}

impl DealStatus {
    pub fn is_lost(self) -> bool {
        matches!(
            self,
            Self::Lost
                | Self::LostTooExpensive
                | Self::LostNoNeed
                | Self::LostCompetitor
                | Self::LostOther
        )
    }

    /// WON e LOST* são finais.
    pub fn is_terminal(self) -> bool {
        self == Self::Won || self.is_lost()
    }

    /// PENDING | FOLLOW_UP -> WON | LOST* | FOLLOW_UP
    pub fn can_transition_to(self, next: Self) -> bool {
        !self.is_terminal() && next != Self::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    #[serde(alias = "PAYMENT_FULL")]
    Full,
    #[serde(alias = "PAYMENT_INSTALLMENTS")]
    Installments,
}

/// Plano de pagamento de um deal. O valor total é sempre derivado daqui.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentPlan {
    pub payment_type: PaymentType,
    pub full_amount: Option<Decimal>,
    pub down_payment: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub number_of_rates: Option<i32>,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub closer_id: Uuid,
    pub status: DealStatus,
    pub payment_type: PaymentType,
    #[schema(example = "2500.00")]
    pub product_price: Decimal,

    // Pagamento à vista
    pub full_amount: Option<Decimal>,
    // Parcelado
    pub down_payment: Option<Decimal>,
    pub monthly_rate: Option<Decimal>,
    pub number_of_rates: Option<i32>,

    #[schema(example = "2500.00")]
    pub total_value: Decimal,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub lost_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub deal_id: Uuid,
    #[schema(example = "500.00")]
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    #[schema(example = "Down payment")]
    pub note: Option<String>,
}

/// Dados de um deal novo, já com o valor total calculado.
#[derive(Debug, Clone)]
pub struct NewDeal {
    pub appointment_id: Uuid,
    pub closer_id: Uuid,
    pub status: DealStatus,
    pub product_price: Decimal,
    pub plan: PaymentPlan,
    pub total_value: Decimal,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub lost_reason: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

// --- Respostas compostas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealWithPayments {
    #[serde(flatten)]
    pub deal: Deal,
    pub payments: Vec<Payment>,
    /// Soma dos pagamentos registrados
    pub paid_total: Decimal,
}

impl DealWithPayments {
    pub fn new(deal: Deal, payments: Vec<Payment>) -> Self {
        let paid_total = payments.iter().map(|p| p.amount).sum();
        Self {
            deal,
            payments,
            paid_total,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DealDetail {
    #[serde(flatten)]
    pub deal: DealWithPayments,
    pub lead: Option<LeadContact>,
    pub closer: Option<CloserSummary>,
}
