// src/db/deal_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::deal::{Deal, DealStatus, NewDeal, Payment},
};

#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    pub status: Option<DealStatus>,
    pub closer_id: Option<Uuid>,
}

/// Nova situação de um deal numa transição.
#[derive(Debug, Clone)]
pub struct DealStatusChange<'a> {
    pub status: DealStatus,
    pub lost_reason: Option<&'a str>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct DealRepository;

impl DealRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, input: &NewDeal) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Deal>(
            r#"
            INSERT INTO deals (
                id, appointment_id, closer_id, status, payment_type, product_price,
                full_amount, down_payment, monthly_rate, number_of_rates,
                total_value, follow_up_date, lost_reason, closed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.appointment_id)
        .bind(input.closer_id)
        .bind(input.status)
        .bind(input.plan.payment_type)
        .bind(input.product_price)
        .bind(input.plan.full_amount)
        .bind(input.plan.down_payment)
        .bind(input.plan.monthly_rate)
        .bind(input.plan.number_of_rates)
        .bind(input.total_value)
        .bind(input.follow_up_date)
        .bind(input.lost_reason.as_deref())
        .bind(input.closed_at)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, format!("deal for appointment {}", input.appointment_id)))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(deal)
    }

    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(deal)
    }

    pub async fn find_by_appointments<'e, E>(
        &self,
        executor: E,
        appointment_ids: &[Uuid],
    ) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>("SELECT * FROM deals WHERE appointment_id = ANY($1)")
            .bind(appointment_ids)
            .fetch_all(executor)
            .await?;
        Ok(deals)
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &DealFilter) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE ($1::deal_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR closer_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filter.status)
        .bind(filter.closer_id)
        .fetch_all(executor)
        .await?;
        Ok(deals)
    }

    /// Deals fechados no intervalo. Sem limites, retorna todos os deals.
    pub async fn closed_between<'e, E>(
        &self,
        executor: E,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE ($1::timestamptz IS NULL OR closed_at >= $1)
              AND ($2::timestamptz IS NULL OR closed_at < $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(deals)
    }

    pub async fn won_values_between<'e, E>(
        &self,
        executor: E,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Decimal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let values = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT total_value FROM deals
            WHERE status = 'WON' AND closed_at >= $1 AND closed_at < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(values)
    }

    pub async fn won_between<'e, E>(
        &self,
        executor: E,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE status = 'WON' AND closed_at >= $1 AND closed_at < $2
            ORDER BY closed_at DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await?;
        Ok(deals)
    }

    pub async fn recent_for_closer<'e, E>(
        &self,
        executor: E,
        closer_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE closer_id = $1
            ORDER BY closed_at DESC NULLS LAST, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(closer_id)
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(deals)
    }

    /// Follow-ups do closer a partir de `from`, em ordem de data.
    pub async fn follow_ups_for_closer<'e, E>(
        &self,
        executor: E,
        closer_id: Uuid,
        from: DateTime<Utc>,
    ) -> Result<Vec<Deal>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deals = sqlx::query_as::<_, Deal>(
            r#"
            SELECT * FROM deals
            WHERE closer_id = $1 AND status = 'FOLLOW_UP' AND follow_up_date >= $2
            ORDER BY follow_up_date ASC
            "#,
        )
        .bind(closer_id)
        .bind(from)
        .fetch_all(executor)
        .await?;
        Ok(deals)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        change: &DealStatusChange<'_>,
    ) -> Result<Deal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deal = sqlx::query_as::<_, Deal>(
            r#"
            UPDATE deals
            SET status = $2,
                lost_reason = $3,
                follow_up_date = $4,
                closed_at = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.status)
        .bind(change.lost_reason)
        .bind(change.follow_up_date)
        .bind(change.closed_at)
        .fetch_one(executor)
        .await?;
        Ok(deal)
    }

    // --- Pagamentos ---

    pub async fn add_payment<'e, E>(
        &self,
        executor: E,
        deal_id: Uuid,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, deal_id, amount, note)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(deal_id)
        .bind(amount)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn payments_for<'e, E>(&self, executor: E, deal_ids: &[Uuid]) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE deal_id = ANY($1) ORDER BY paid_at ASC",
        )
        .bind(deal_ids)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }
}
