// src/models/lead.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{
    appointment::{Appointment, AppointmentStatus},
    campaign::Campaign,
    deal::{DealStatus, DealWithPayments},
    user::CloserSummary,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub campaign_id: Uuid,
    #[schema(example = "Anna")]
    pub first_name: String,
    #[schema(example = "Schmidt")]
    pub last_name: String,
    #[schema(example = "+49 170 1234567")]
    pub phone: String,
    pub email: Option<String>,
    #[schema(example = "FACEBOOK")]
    pub source: String,
    pub facebook_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Apenas o contato do lead, para listas de deals.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadContact {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl From<&Lead> for LeadContact {
    fn from(lead: &Lead) -> Self {
        Self {
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            phone: lead.phone.clone(),
        }
    }
}

// --- Respostas compostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadAppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub closer: Option<CloserSummary>,
    pub deal: Option<DealWithPayments>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeadDetail {
    #[serde(flatten)]
    pub lead: Lead,
    pub campaign: Option<Campaign>,
    pub appointment: Option<LeadAppointmentView>,
}

/// O mínimo que o closer precisa durante a ligação.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloserLeadView {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub campaign: Option<String>,
    pub source: String,
    pub notes: String,
}

/// Uma linha do funil de uma campanha: o lead e, se houver, a consulta e o deal.
#[derive(Debug, Clone, FromRow)]
pub struct LeadFunnelRow {
    pub appointment_status: Option<AppointmentStatus>,
    pub deal_status: Option<DealStatus>,
}
