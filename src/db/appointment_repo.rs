// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::appointment::{Appointment, AppointmentOutcome, AppointmentStatus},
};

/// Filtros da listagem. Todos são opcionais.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<AppointmentStatus>,
    pub closer_id: Option<Uuid>,
}

#[derive(Clone, Default)]
pub struct AppointmentRepository;

impl AppointmentRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        lead_id: Uuid,
        closer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (id, lead_id, closer_id, scheduled_at, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(lead_id)
        .bind(closer_id)
        .bind(scheduled_at)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, format!("appointment for lead {}", lead_id)))
    }

    /// Trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(appointment)
    }

    pub async fn find_by_lead<'e, E>(&self, executor: E, lead_id: Uuid) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE lead_id = $1")
                .bind(lead_id)
                .fetch_optional(executor)
                .await?;
        Ok(appointment)
    }

    pub async fn find_by_leads<'e, E>(&self, executor: E, lead_ids: &[Uuid]) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE lead_id = ANY($1)")
                .bind(lead_ids)
                .fetch_all(executor)
                .await?;
        Ok(appointments)
    }

    pub async fn find_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments =
            sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(executor)
                .await?;
        Ok(appointments)
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE ($1::timestamptz IS NULL OR scheduled_at >= $1)
              AND ($2::timestamptz IS NULL OR scheduled_at < $2)
              AND ($3::appointment_status IS NULL OR status = $3)
              AND ($4::uuid IS NULL OR closer_id = $4)
            ORDER BY scheduled_at ASC
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.status)
        .bind(filter.closer_id)
        .fetch_all(executor)
        .await?;
        Ok(appointments)
    }

    pub async fn recent_for_closer<'e, E>(
        &self,
        executor: E,
        closer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE closer_id = $1
            ORDER BY scheduled_at DESC
            LIMIT $2
            "#,
        )
        .bind(closer_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(appointments)
    }

    /// Todos os no-shows, com data de agendamento opcionalmente limitada.
    pub async fn no_shows<'e, E>(
        &self,
        executor: E,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE status::text LIKE 'NO_SHOW%'
              AND ($1::timestamptz IS NULL OR scheduled_at >= $1)
              AND ($2::timestamptz IS NULL OR scheduled_at < $2)
            ORDER BY scheduled_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(appointments)
    }

    pub async fn statuses_between<'e, E>(
        &self,
        executor: E,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AppointmentStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let statuses = sqlx::query_scalar::<_, AppointmentStatus>(
            "SELECT status FROM appointments WHERE scheduled_at >= $1 AND scheduled_at < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(statuses)
    }

    /// Grava o novo status. Campos `None` do resultado mantêm o valor atual,
    /// exceto `no_show_reason`, que é limpo fora de no-shows.
    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: AppointmentStatus,
        outcome: &AppointmentOutcome,
    ) -> Result<Appointment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let no_show_reason = if status.is_no_show() {
            outcome.no_show_reason.as_deref()
        } else {
            None
        };

        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET status = $2,
                no_show_reason = $3,
                showed_up = COALESCE($4, showed_up),
                call_duration = COALESCE($5, call_duration),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(no_show_reason)
        .bind(outcome.showed_up)
        .bind(outcome.call_duration)
        .bind(outcome.notes.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(appointment)
    }
}
