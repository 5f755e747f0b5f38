// src/db/campaign_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        campaign::{Campaign, CampaignStatus, CampaignWithLeadCount},
        lead::LeadFunnelRow,
    },
};

#[derive(Debug, Clone)]
pub struct NewCampaign<'a> {
    pub name: &'a str,
    pub budget: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub facebook_id: Option<&'a str>,
}

/// Campos opcionais: `None` mantém o valor atual.
#[derive(Debug, Clone, Default)]
pub struct CampaignChanges<'a> {
    pub name: Option<&'a str>,
    pub budget: Option<Decimal>,
    pub end_date: Option<DateTime<Utc>>,
    pub status: Option<CampaignStatus>,
    pub facebook_id: Option<&'a str>,
}

#[derive(Clone, Default)]
pub struct CampaignRepository;

impl CampaignRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create<'e, E>(&self, executor: E, input: &NewCampaign<'_>) -> Result<Campaign, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (id, name, budget, start_date, end_date, facebook_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.name)
        .bind(input.budget)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.facebook_id)
        .fetch_one(executor)
        .await?;
        Ok(campaign)
    }

    pub async fn list_with_lead_count<'e, E>(&self, executor: E) -> Result<Vec<CampaignWithLeadCount>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaigns = sqlx::query_as::<_, CampaignWithLeadCount>(
            r#"
            SELECT c.*, COUNT(l.id) AS lead_count
            FROM campaigns c
            LEFT JOIN leads l ON l.campaign_id = c.id
            GROUP BY c.id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(campaigns)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Campaign>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(campaign)
    }

    pub async fn find_many<'e, E>(&self, executor: E, ids: &[Uuid]) -> Result<Vec<Campaign>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaigns = sqlx::query_as::<_, Campaign>("SELECT * FROM campaigns WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(executor)
            .await?;
        Ok(campaigns)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        changes: &CampaignChanges<'_>,
    ) -> Result<Option<Campaign>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            UPDATE campaigns
            SET name = COALESCE($2, name),
                budget = COALESCE($3, budget),
                end_date = COALESCE($4, end_date),
                status = COALESCE($5, status),
                facebook_id = COALESCE($6, facebook_id),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.budget)
        .bind(changes.end_date)
        .bind(changes.status)
        .bind(changes.facebook_id)
        .fetch_optional(executor)
        .await?;
        Ok(campaign)
    }

    /// Cada lead da campanha com o status da consulta e do deal, se existirem.
    pub async fn funnel<'e, E>(&self, executor: E, campaign_id: Uuid) -> Result<Vec<LeadFunnelRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, LeadFunnelRow>(
            r#"
            SELECT a.status AS appointment_status, d.status AS deal_status
            FROM leads l
            LEFT JOIN appointments a ON a.lead_id = l.id
            LEFT JOIN deals d ON d.appointment_id = a.id
            WHERE l.campaign_id = $1
            "#,
        )
        .bind(campaign_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }
}
