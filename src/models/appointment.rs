// src/models/appointment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{deal::Deal, lead::Lead, user::CloserSummary};

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    NoShowForgot,
    NoShowSick,
    NoShowGhosting,
    NoShowOther,
}

impl AppointmentStatus {
    pub fn is_no_show(self) -> bool {
        matches!(
            self,
            Self::NoShowForgot | Self::NoShowSick | Self::NoShowGhosting | Self::NoShowOther
        )
    }

    /// SCHEDULED -> COMPLETED | NO_SHOW_*. Nenhuma outra transição é aceita.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == Self::Scheduled && next != Self::Scheduled
    }

    /// Deduz o subtipo de no-show a partir do motivo digitado.
    pub fn no_show_from_reason(reason: Option<&str>) -> Self {
        let reason = reason.map(str::to_lowercase).unwrap_or_default();
        if reason.contains("ghost") {
            Self::NoShowGhosting
        } else if reason.contains("forgot") || reason.contains("vergessen") {
            Self::NoShowForgot
        } else if reason.contains("sick") || reason.contains("krank") {
            Self::NoShowSick
        } else {
            Self::NoShowOther
        }
    }
}

/// Status aceito na entrada. `NO_SHOW` genérico é resolvido pelo motivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatusInput {
    Scheduled,
    Completed,
    NoShow,
    NoShowForgot,
    NoShowSick,
    NoShowGhosting,
    NoShowOther,
}

impl AppointmentStatusInput {
    pub fn resolve(self, reason: Option<&str>) -> AppointmentStatus {
        match self {
            Self::Scheduled => AppointmentStatus::Scheduled,
            Self::Completed => AppointmentStatus::Completed,
            Self::NoShow => AppointmentStatus::no_show_from_reason(reason),
            Self::NoShowForgot => AppointmentStatus::NoShowForgot,
            Self::NoShowSick => AppointmentStatus::NoShowSick,
            Self::NoShowGhosting => AppointmentStatus::NoShowGhosting,
            Self::NoShowOther => AppointmentStatus::NoShowOther,
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub lead_id: Uuid,
    pub closer_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    #[schema(example = "Ghosting")]
    pub no_show_reason: Option<String>,
    pub showed_up: Option<bool>,
    /// Duração da ligação em minutos
    #[schema(example = 25)]
    pub call_duration: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Alterações aplicadas numa transição de status.
#[derive(Debug, Clone, Default)]
pub struct AppointmentOutcome {
    pub no_show_reason: Option<String>,
    pub showed_up: Option<bool>,
    pub call_duration: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub lead: Option<Lead>,
    pub closer: Option<CloserSummary>,
    pub deal: Option<Deal>,
}
