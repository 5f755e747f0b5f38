// src/services/lead_service.rs

use sqlx::{Acquire, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AppointmentRepository, CampaignRepository, DealRepository, LeadRepository, NewLead, UserRepository},
    models::{
        deal::DealWithPayments,
        lead::{CloserLeadView, Lead, LeadAppointmentView, LeadDetail},
        user::CloserSummary,
    },
    services::lookup::{group_by, index_by, unique_ids},
};

#[derive(Clone)]
pub struct LeadService {
    leads: LeadRepository,
    campaigns: CampaignRepository,
    appointments: AppointmentRepository,
    users: UserRepository,
    deals: DealRepository,
}

impl LeadService {
    pub fn new(
        leads: LeadRepository,
        campaigns: CampaignRepository,
        appointments: AppointmentRepository,
        users: UserRepository,
        deals: DealRepository,
    ) -> Self {
        Self {
            leads,
            campaigns,
            appointments,
            users,
            deals,
        }
    }

    pub async fn list_leads<'e, E>(&self, executor: E) -> Result<Vec<LeadDetail>, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let leads = self.leads.list(&mut *tx).await?;
        let details = self.details(&mut tx, leads).await?;
        tx.commit().await?;
        Ok(details)
    }

    pub async fn get_lead<'e, E>(&self, executor: E, id: Uuid) -> Result<LeadDetail, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let lead = self
            .leads
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::LeadNotFound)?;
        let mut details = self.details(&mut tx, vec![lead]).await?;
        tx.commit().await?;

        details.pop().ok_or(AppError::LeadNotFound)
    }

    pub async fn create_lead<'e, E>(&self, executor: E, input: &NewLead<'_>) -> Result<Lead, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.campaigns
            .find_by_id(&mut *tx, input.campaign_id)
            .await?
            .ok_or(AppError::CampaignNotFound)?;

        let lead = self.leads.create(&mut *tx, input).await?;
        tx.commit().await?;

        tracing::info!("Lead criado: {} (campanha {})", lead.id, lead.campaign_id);
        Ok(lead)
    }

    /// Visão reduzida para a ligação do closer.
    pub async fn closer_view<'e, E>(&self, executor: E, id: Uuid) -> Result<CloserLeadView, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let lead = self
            .leads
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::LeadNotFound)?;
        let campaign = self.campaigns.find_by_id(&mut *tx, lead.campaign_id).await?;
        let appointment = self.appointments.find_by_lead(&mut *tx, lead.id).await?;

        tx.commit().await?;

        Ok(CloserLeadView {
            id: lead.id,
            name: lead.full_name(),
            phone: lead.phone,
            email: lead.email,
            campaign: campaign.map(|c| c.name),
            source: lead.source,
            notes: appointment.and_then(|a| a.notes).unwrap_or_default(),
        })
    }

    // Monta campanha, consulta, closer, deal e pagamentos de cada lead.
    async fn details(&self, conn: &mut PgConnection, leads: Vec<Lead>) -> Result<Vec<LeadDetail>, AppError> {
        let lead_ids: Vec<Uuid> = leads.iter().map(|l| l.id).collect();
        let campaign_ids = unique_ids(leads.iter().map(|l| l.campaign_id));

        let campaigns = self.campaigns.find_many(&mut *conn, &campaign_ids).await?;
        let appointments = self.appointments.find_by_leads(&mut *conn, &lead_ids).await?;

        let closer_ids = unique_ids(appointments.iter().map(|a| a.closer_id));
        let appointment_ids: Vec<Uuid> = appointments.iter().map(|a| a.id).collect();

        let closers = self.users.find_many(&mut *conn, &closer_ids).await?;
        let deals = self.deals.find_by_appointments(&mut *conn, &appointment_ids).await?;
        let deal_ids: Vec<Uuid> = deals.iter().map(|d| d.id).collect();
        let payments = self.deals.payments_for(&mut *conn, &deal_ids).await?;

        let campaigns = index_by(campaigns, |c| c.id);
        let closers = index_by(closers, |u| u.id);
        let mut appointments = index_by(appointments, |a| a.lead_id);
        let mut deals = index_by(deals, |d| d.appointment_id);
        let mut payments = group_by(payments, |p| p.deal_id);

        let details = leads
            .into_iter()
            .map(|lead| {
                let appointment = appointments.remove(&lead.id).map(|appointment| {
                    let deal = deals.remove(&appointment.id).map(|deal| {
                        let deal_payments = payments.remove(&deal.id).unwrap_or_default();
                        DealWithPayments::new(deal, deal_payments)
                    });
                    LeadAppointmentView {
                        closer: closers.get(&appointment.closer_id).map(CloserSummary::from),
                        deal,
                        appointment,
                    }
                });
                LeadDetail {
                    campaign: campaigns.get(&lead.campaign_id).cloned(),
                    appointment,
                    lead,
                }
            })
            .collect();

        Ok(details)
    }
}
