// src/services/admin_service.rs

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::{AppointmentRepository, DealRepository, LeadRepository, StatsRepository, UserRepository},
    models::{
        appointment::AppointmentStatus,
        dashboard::{AdminDashboard, CloserDetail, CloserRankingEntry, TodayDeal},
        stats::{DailyStats, DailyStatsValues},
        user::{User, UserRole},
    },
    services::{
        appointment_service::assemble_details,
        lookup::index_by,
        metrics::{self, DayFacts},
    },
};

/// Janela do show-up rate do painel, em dias antes de hoje.
const SHOW_UP_WINDOW_DAYS: u64 = 7;
const CLOSER_HISTORY_LIMIT: i64 = 10;
const UNKNOWN_CLOSER: &str = "Unknown";

#[derive(Clone)]
pub struct AdminService {
    users: UserRepository,
    leads: LeadRepository,
    appointments: AppointmentRepository,
    deals: DealRepository,
    stats: StatsRepository,
}

impl AdminService {
    pub fn new(
        users: UserRepository,
        leads: LeadRepository,
        appointments: AppointmentRepository,
        deals: DealRepository,
        stats: StatsRepository,
    ) -> Self {
        Self {
            users,
            leads,
            appointments,
            deals,
            stats,
        }
    }

    pub async fn dashboard<'e, E>(&self, executor: E) -> Result<AdminDashboard, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let today = time::today_local();
        let (day_start, day_end) = time::day_window(today, &Local);
        let (window_start, window_end) = time::trailing_window(today, SHOW_UP_WINDOW_DAYS, &Local);

        let mut tx = executor.begin().await?;
        let closers = self.users.list(&mut *tx, Some(UserRole::Closer)).await?;
        let today_row = self.stats.find_by_date(&mut *tx, today).await?;
        let won_today = self.deals.won_between(&mut *tx, day_start, day_end).await?;
        let recent = self
            .appointments
            .statuses_between(&mut *tx, window_start, window_end)
            .await?;
        tx.commit().await?;

        let completed = recent.iter().filter(|s| **s == AppointmentStatus::Completed).count() as i64;
        let no_shows = recent.iter().filter(|s| s.is_no_show()).count() as i64;

        let today_cashflow: Decimal = won_today.iter().map(|d| d.total_value).sum();
        let closer_ranking: Vec<CloserRankingEntry> = closers.iter().map(ranking_entry).collect();
        let names = index_by(closers, |u| u.id);

        let today_deals = won_today
            .into_iter()
            .map(|deal| TodayDeal {
                id: deal.id,
                value: deal.total_value,
                closer: names
                    .get(&deal.closer_id)
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CLOSER.to_string()),
                closed_at: deal.closed_at,
            })
            .collect();

        Ok(AdminDashboard {
            closer_ranking,
            today_stats: today_row.as_ref().map(DailyStatsValues::from).unwrap_or_default(),
            today_cashflow,
            show_up_rate: metrics::show_up_rate(completed, no_shows),
            today_deals,
        })
    }

    pub async fn closer_detail<'e, E>(&self, executor: E, id: Uuid) -> Result<CloserDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let closer = self
            .users
            .find_closer(&mut *tx, id)
            .await?
            .ok_or(AppError::CloserNotFound)?;
        let recent = self
            .appointments
            .recent_for_closer(&mut *tx, id, CLOSER_HISTORY_LIMIT)
            .await?;
        let appointments = assemble_details(&mut tx, &self.leads, &self.users, &self.deals, recent).await?;
        let deals = self.deals.recent_for_closer(&mut *tx, id, CLOSER_HISTORY_LIMIT).await?;

        tx.commit().await?;

        Ok(CloserDetail {
            closer,
            appointments,
            deals,
        })
    }

    /// Recalcula e grava a linha do dia. Repetir a chamada só sobrescreve a linha.
    pub async fn update_daily_stats<'e, E>(&self, executor: E, date: Option<NaiveDate>) -> Result<DailyStats, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let date = date.unwrap_or_else(time::today_local);
        let (from, to) = time::day_window(date, &Local);

        let mut tx = executor.begin().await?;
        let facts = DayFacts {
            leads_created: self.leads.count_created_between(&mut *tx, from, to).await?,
            appointment_statuses: self.appointments.statuses_between(&mut *tx, from, to).await?,
            won_deal_values: self.deals.won_values_between(&mut *tx, from, to).await?,
        };
        let row = self.stats.upsert(&mut *tx, date, &metrics::daily_stats(&facts)).await?;
        tx.commit().await?;

        tracing::info!("Estatísticas do dia {} atualizadas", date);
        Ok(row)
    }

    pub async fn list_users<'e, E>(&self, executor: E, role: Option<UserRole>) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.users.list(executor, role).await
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = self.users.create(executor, name, email, role).await?;
        tracing::info!("Usuário criado: {} ({:?})", user.id, user.role);
        Ok(user)
    }

    /// Regrava os contadores de todos os closers a partir das tabelas de origem.
    pub async fn recompute_counters<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // Trava os closers para não perder incrementos concorrentes
        sqlx::query("SELECT id FROM users WHERE role = 'CLOSER' FOR UPDATE")
            .execute(&mut *tx)
            .await?;

        let counters = self.users.compute_counters(&mut *tx).await?;
        for entry in &counters {
            self.users.set_counters(&mut *tx, entry).await?;
        }
        let closers = self.users.list(&mut *tx, Some(UserRole::Closer)).await?;

        tx.commit().await?;

        tracing::info!("Contadores recalculados para {} closers", counters.len());
        Ok(closers)
    }
}

fn ranking_entry(closer: &User) -> CloserRankingEntry {
    CloserRankingEntry {
        id: closer.id,
        name: closer.name.clone(),
        email: closer.email.clone(),
        total_calls: closer.total_calls,
        total_wins: closer.total_wins,
        total_revenue: closer.total_revenue,
        conversion_rate: metrics::conversion_rate(closer.total_wins.into(), closer.total_calls.into()),
    }
}
