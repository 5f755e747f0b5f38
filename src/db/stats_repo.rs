// src/db/stats_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stats::{DailyStats, DailyStatsValues},
};

#[derive(Clone, Default)]
pub struct StatsRepository;

impl StatsRepository {
    pub fn new() -> Self {
        Self
    }

    /// Uma linha por data: grava por cima se o dia já existir.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        date: NaiveDate,
        values: &DailyStatsValues,
    ) -> Result<DailyStats, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DailyStats>(
            r#"
            INSERT INTO daily_stats (
                id, date, total_leads, total_calls, total_wins,
                total_revenue, show_up_rate, conversion_rate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (date) DO UPDATE SET
                total_leads = EXCLUDED.total_leads,
                total_calls = EXCLUDED.total_calls,
                total_wins = EXCLUDED.total_wins,
                total_revenue = EXCLUDED.total_revenue,
                show_up_rate = EXCLUDED.show_up_rate,
                conversion_rate = EXCLUDED.conversion_rate,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(date)
        .bind(values.total_leads)
        .bind(values.total_calls)
        .bind(values.total_wins)
        .bind(values.total_revenue)
        .bind(values.show_up_rate)
        .bind(values.conversion_rate)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn find_by_date<'e, E>(&self, executor: E, date: NaiveDate) -> Result<Option<DailyStats>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, DailyStats>("SELECT * FROM daily_stats WHERE date = $1")
            .bind(date)
            .fetch_optional(executor)
            .await?;
        Ok(row)
    }

    pub async fn list_between<'e, E>(
        &self,
        executor: E,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<DailyStats>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, DailyStats>(
            r#"
            SELECT * FROM daily_stats
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
            ORDER BY date ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
