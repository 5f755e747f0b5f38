// src/services/campaign_service.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CampaignChanges, CampaignRepository, NewCampaign},
    models::campaign::{Campaign, CampaignStatsResponse, CampaignWithLeadCount},
    services::metrics,
};

#[derive(Clone)]
pub struct CampaignService {
    repo: CampaignRepository,
}

impl CampaignService {
    pub fn new(repo: CampaignRepository) -> Self {
        Self { repo }
    }

    pub async fn list_campaigns<'e, E>(&self, executor: E) -> Result<Vec<CampaignWithLeadCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_with_lead_count(executor).await
    }

    pub async fn create_campaign<'e, E>(
        &self,
        executor: E,
        input: &NewCampaign<'_>,
    ) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        check_date_order(input.start_date, input.end_date)?;

        let campaign = self.repo.create(executor, input).await?;
        tracing::info!("Campanha criada: {} ({})", campaign.name, campaign.id);
        Ok(campaign)
    }

    /// Atualização parcial. A ordem das datas é checada contra o valor gravado.
    pub async fn update_campaign<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &CampaignChanges<'_>,
    ) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let current = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::CampaignNotFound)?;

        check_date_order(current.start_date, changes.end_date.or(current.end_date))?;

        let updated = self
            .repo
            .update(&mut *tx, id, changes)
            .await?
            .ok_or(AppError::CampaignNotFound)?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn campaign_stats<'e, E>(&self, executor: E, id: Uuid) -> Result<CampaignStatsResponse, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Snapshot consistente entre a campanha e o funil
        let mut tx = executor.begin().await?;

        let campaign = self
            .repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::CampaignNotFound)?;
        let rows = self.repo.funnel(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(CampaignStatsResponse {
            campaign,
            stats: metrics::campaign_stats(&rows),
        })
    }
}

fn check_date_order(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), AppError> {
    match end {
        Some(end) if end < start => Err(AppError::InvalidDateRange),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn end_date_may_not_precede_start_date() {
        let start = Utc::now();
        assert!(check_date_order(start, None).is_ok());
        assert!(check_date_order(start, Some(start)).is_ok());
        assert!(check_date_order(start, Some(start + Duration::days(30))).is_ok());
        assert!(matches!(
            check_date_order(start, Some(start - Duration::days(1))),
            Err(AppError::InvalidDateRange)
        ));
    }
}
