// src/services/report_service.rs

use chrono::{Local, NaiveDate};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::{AppointmentRepository, DealRepository, LeadRepository, StatsRepository, UserRepository},
    models::{
        deal::DealStatus,
        reports::{CloserStatsEntry, NoShowReport, RevenueReport},
        stats::DailyStats,
        user::UserRole,
    },
    services::{appointment_service::assemble_details, metrics},
};

/// Intervalo inclusivo de datas do calendário; cada lado é opcional.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn check(&self) -> Result<(), AppError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(AppError::InvalidDateRange),
            _ => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct ReportService {
    users: UserRepository,
    deals: DealRepository,
    appointments: AppointmentRepository,
    leads: LeadRepository,
    stats: StatsRepository,
}

impl ReportService {
    pub fn new(
        users: UserRepository,
        deals: DealRepository,
        appointments: AppointmentRepository,
        leads: LeadRepository,
        stats: StatsRepository,
    ) -> Self {
        Self {
            users,
            deals,
            appointments,
            leads,
            stats,
        }
    }

    pub async fn closer_stats<'e, E>(&self, executor: E, range: DateRange) -> Result<Vec<CloserStatsEntry>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        range.check()?;
        let (from, to) = time::date_range_bounds(range.start, range.end, &Local);

        let mut tx = executor.begin().await?;
        let closers = self.users.list(&mut *tx, Some(UserRole::Closer)).await?;
        let deals = self.deals.closed_between(&mut *tx, from, to).await?;
        let deal_ids: Vec<Uuid> = deals.iter().map(|d| d.id).collect();
        let payments = self.deals.payments_for(&mut *tx, &deal_ids).await?;
        tx.commit().await?;

        Ok(closers
            .iter()
            .map(|closer| metrics::closer_stats(closer, &deals, &payments))
            .collect())
    }

    pub async fn revenue<'e, E>(&self, executor: E, range: DateRange) -> Result<RevenueReport, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        range.check()?;
        let (from, to) = time::date_range_bounds(range.start, range.end, &Local);

        let mut tx = executor.begin().await?;
        let won: Vec<_> = self
            .deals
            .closed_between(&mut *tx, from, to)
            .await?
            .into_iter()
            .filter(|d| d.status == DealStatus::Won)
            .collect();
        let deal_ids: Vec<Uuid> = won.iter().map(|d| d.id).collect();
        let payments = self.deals.payments_for(&mut *tx, &deal_ids).await?;
        tx.commit().await?;

        Ok(metrics::revenue_report(&won, &payments))
    }

    pub async fn no_shows<'e, E>(&self, executor: E, range: DateRange) -> Result<NoShowReport, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        range.check()?;
        let (from, to) = time::date_range_bounds(range.start, range.end, &Local);

        let mut tx = executor.begin().await?;
        let no_shows = self.appointments.no_shows(&mut *tx, from, to).await?;
        let by_reason = metrics::no_shows_by_reason(&no_shows);
        let details = assemble_details(&mut tx, &self.leads, &self.users, &self.deals, no_shows).await?;
        tx.commit().await?;

        Ok(NoShowReport {
            total: details.len() as i64,
            by_reason,
            details,
        })
    }

    pub async fn daily_stats<'e, E>(&self, executor: E, range: DateRange) -> Result<Vec<DailyStats>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        range.check()?;
        self.stats.list_between(executor, range.start, range.end).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_and_single_day_ranges_are_valid() {
        assert!(DateRange::default().check().is_ok());
        assert!(DateRange { start: Some(date(2025, 3, 1)), end: None }.check().is_ok());
        assert!(DateRange { start: Some(date(2025, 3, 1)), end: Some(date(2025, 3, 1)) }.check().is_ok());
    }

    #[test]
    fn reversed_range_is_rejected() {
        let range = DateRange {
            start: Some(date(2025, 3, 10)),
            end: Some(date(2025, 3, 1)),
        };
        assert!(matches!(range.check(), Err(AppError::InvalidDateRange)));
    }
}
