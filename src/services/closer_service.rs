// src/services/closer_service.rs

use chrono::Local;
use sqlx::{Acquire, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, time},
    db::{AppointmentFilter, AppointmentRepository, CampaignRepository, DealRepository, LeadRepository, UserRepository},
    models::dashboard::{AppointmentLeadInfo, CloserDashboard, CloserOwnStats, FollowUpEntry, TodayAppointmentEntry},
    services::{
        lookup::{index_by, unique_ids},
        metrics,
    },
};

const UNKNOWN: &str = "Unknown";

#[derive(Clone)]
pub struct CloserService {
    users: UserRepository,
    appointments: AppointmentRepository,
    leads: LeadRepository,
    campaigns: CampaignRepository,
    deals: DealRepository,
}

impl CloserService {
    pub fn new(
        users: UserRepository,
        appointments: AppointmentRepository,
        leads: LeadRepository,
        campaigns: CampaignRepository,
        deals: DealRepository,
    ) -> Self {
        Self {
            users,
            appointments,
            leads,
            campaigns,
            deals,
        }
    }

    /// Só o necessário para o dia do closer: consultas de hoje, follow-ups
    /// em aberto e os próprios contadores.
    pub async fn dashboard<'e, E>(&self, executor: E, closer_id: Uuid) -> Result<CloserDashboard, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let (day_start, day_end) = time::day_window(time::today_local(), &Local);

        let mut tx = executor.begin().await?;

        let closer = self
            .users
            .find_closer(&mut *tx, closer_id)
            .await?
            .ok_or(AppError::CloserNotFound)?;

        let filter = AppointmentFilter {
            from: Some(day_start),
            to: Some(day_end),
            closer_id: Some(closer_id),
            ..Default::default()
        };
        let todays = self.appointments.list(&mut *tx, &filter).await?;
        let follow_ups = self
            .deals
            .follow_ups_for_closer(&mut *tx, closer_id, day_start)
            .await?;

        // Leads das consultas de hoje e dos follow-ups
        let follow_up_appointment_ids = unique_ids(follow_ups.iter().map(|d| d.appointment_id));
        let follow_up_appointments = self
            .appointments
            .find_many(&mut *tx, &follow_up_appointment_ids)
            .await?;
        let lead_ids = unique_ids(
            todays
                .iter()
                .chain(follow_up_appointments.iter())
                .map(|a| a.lead_id),
        );
        let leads = self.leads.find_many(&mut *tx, &lead_ids).await?;
        let campaign_ids = unique_ids(leads.iter().map(|l| l.campaign_id));
        let campaigns = self.campaigns.find_many(&mut *tx, &campaign_ids).await?;

        tx.commit().await?;

        let leads = index_by(leads, |l| l.id);
        let campaigns = index_by(campaigns, |c| c.id);
        let follow_up_appointments = index_by(follow_up_appointments, |a| a.id);

        let todays_appointments = todays
            .into_iter()
            .map(|appointment| {
                let lead = leads.get(&appointment.lead_id);
                TodayAppointmentEntry {
                    id: appointment.id,
                    time: appointment.scheduled_at,
                    lead: AppointmentLeadInfo {
                        name: lead.map(|l| l.full_name()).unwrap_or_default(),
                        phone: lead.map(|l| l.phone.clone()).unwrap_or_default(),
                        campaign: lead
                            .and_then(|l| campaigns.get(&l.campaign_id))
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| UNKNOWN.to_string()),
                    },
                    status: appointment.status,
                }
            })
            .collect();

        let follow_ups = follow_ups
            .into_iter()
            .map(|deal| FollowUpEntry {
                id: deal.id,
                follow_up_date: deal.follow_up_date,
                lead_name: follow_up_appointments
                    .get(&deal.appointment_id)
                    .and_then(|a| leads.get(&a.lead_id))
                    .map(|l| l.full_name())
                    .unwrap_or_default(),
                product_price: deal.product_price,
            })
            .collect();

        Ok(CloserDashboard {
            todays_appointments,
            follow_ups,
            stats: CloserOwnStats {
                total_calls: closer.total_calls,
                total_wins: closer.total_wins,
                total_revenue: closer.total_revenue,
                conversion_rate: metrics::conversion_rate(closer.total_wins.into(), closer.total_calls.into()),
            },
        })
    }
}
