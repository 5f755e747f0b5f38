// src/services/appointment_service.rs

use chrono::{DateTime, Local, Utc};
use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::{AppointmentFilter, AppointmentRepository, DealRepository, LeadRepository, UserRepository},
    models::{
        appointment::{Appointment, AppointmentDetail, AppointmentOutcome, AppointmentStatus},
        user::CloserSummary,
    },
    services::lookup::{index_by, unique_ids},
};

#[derive(Clone)]
pub struct AppointmentService {
    appointments: AppointmentRepository,
    leads: LeadRepository,
    users: UserRepository,
    deals: DealRepository,
}

impl AppointmentService {
    pub fn new(
        appointments: AppointmentRepository,
        leads: LeadRepository,
        users: UserRepository,
        deals: DealRepository,
    ) -> Self {
        Self {
            appointments,
            leads,
            users,
            deals,
        }
    }

    pub async fn list_appointments<'e, E>(
        &self,
        executor: E,
        filter: &AppointmentFilter,
    ) -> Result<Vec<AppointmentDetail>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let appointments = self.appointments.list(&mut *tx, filter).await?;
        let details = self.details(&mut tx, appointments).await?;
        tx.commit().await?;
        Ok(details)
    }

    pub async fn todays_appointments<'e, E>(&self, executor: E) -> Result<Vec<AppointmentDetail>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let (from, to) = time::day_window(time::today_local(), &Local);
        let filter = AppointmentFilter {
            from: Some(from),
            to: Some(to),
            ..Default::default()
        };
        self.list_appointments(executor, &filter).await
    }

    pub async fn create_appointment<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        closer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Appointment, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.leads
            .find_by_id(&mut *tx, lead_id)
            .await?
            .ok_or(AppError::LeadNotFound)?;
        self.users
            .find_closer(&mut *tx, closer_id)
            .await?
            .ok_or(AppError::CloserNotFound)?;

        let appointment = self
            .appointments
            .create(&mut *tx, lead_id, closer_id, scheduled_at, notes)
            .await?;
        tx.commit().await?;

        tracing::info!("Consulta agendada: {} (lead {})", appointment.id, lead_id);
        Ok(appointment)
    }

    /// Aplica a transição e, se o cliente apareceu, conta a ligação do closer
    /// na mesma transação.
    pub async fn change_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AppointmentStatus,
        outcome: AppointmentOutcome,
    ) -> Result<Appointment, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .appointments
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::AppointmentNotFound)?;

        if !current.status.can_transition_to(status) {
            return Err(AppError::InvalidTransition {
                from: format!("{:?}", current.status),
                to: format!("{:?}", status),
            });
        }

        let outcome = settle_outcome(status, outcome);
        let updated = self
            .appointments
            .update_status(&mut *tx, id, status, &outcome)
            .await?;

        if counts_as_call(&updated) {
            self.users.increment_calls(&mut *tx, updated.closer_id).await?;
        }

        tx.commit().await?;

        tracing::info!("Consulta {}: {:?} -> {:?}", id, current.status, updated.status);
        Ok(updated)
    }

    async fn details(
        &self,
        conn: &mut PgConnection,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentDetail>, AppError> {
        assemble_details(conn, &self.leads, &self.users, &self.deals, appointments).await
    }
}

/// Anexa lead, closer e deal a cada consulta.
pub(crate) async fn assemble_details(
    conn: &mut PgConnection,
    leads: &LeadRepository,
    users: &UserRepository,
    deals: &DealRepository,
    appointments: Vec<Appointment>,
) -> Result<Vec<AppointmentDetail>, AppError> {
    let lead_ids = unique_ids(appointments.iter().map(|a| a.lead_id));
    let closer_ids = unique_ids(appointments.iter().map(|a| a.closer_id));
    let appointment_ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();

    let lead_rows = leads.find_many(&mut *conn, &lead_ids).await?;
    let closer_rows = users.find_many(&mut *conn, &closer_ids).await?;
    let deal_rows = deals.find_by_appointments(&mut *conn, &appointment_ids).await?;

    let lead_map = index_by(lead_rows, |l| l.id);
    let closer_map = index_by(closer_rows, |u| u.id);
    let mut deal_map = index_by(deal_rows, |d| d.appointment_id);

    Ok(appointments
        .into_iter()
        .map(|appointment| AppointmentDetail {
            lead: lead_map.get(&appointment.lead_id).cloned(),
            closer: closer_map.get(&appointment.closer_id).map(CloserSummary::from),
            deal: deal_map.remove(&appointment.id),
            appointment,
        })
        .collect())
}

// COMPLETED sem `showedUp` explícito conta como comparecimento; no-show nunca.
fn settle_outcome(status: AppointmentStatus, mut outcome: AppointmentOutcome) -> AppointmentOutcome {
    if status == AppointmentStatus::Completed {
        outcome.showed_up = outcome.showed_up.or(Some(true));
    } else if status.is_no_show() {
        outcome.showed_up = Some(false);
    }
    outcome
}

fn counts_as_call(appointment: &Appointment) -> bool {
    appointment.status == AppointmentStatus::Completed && appointment.showed_up == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_defaults_to_showed_up() {
        let outcome = settle_outcome(AppointmentStatus::Completed, AppointmentOutcome::default());
        assert_eq!(outcome.showed_up, Some(true));

        let explicit = AppointmentOutcome {
            showed_up: Some(false),
            ..Default::default()
        };
        let outcome = settle_outcome(AppointmentStatus::Completed, explicit);
        assert_eq!(outcome.showed_up, Some(false));
    }

    #[test]
    fn no_show_never_counts_as_showed_up() {
        let claimed = AppointmentOutcome {
            showed_up: Some(true),
            no_show_reason: Some("Ghosting".into()),
            ..Default::default()
        };
        let outcome = settle_outcome(AppointmentStatus::NoShowGhosting, claimed);
        assert_eq!(outcome.showed_up, Some(false));
        assert_eq!(outcome.no_show_reason.as_deref(), Some("Ghosting"));
    }
}
