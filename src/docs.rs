// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Campaigns ---
        handlers::campaigns::list_campaigns,
        handlers::campaigns::create_campaign,
        handlers::campaigns::update_campaign,
        handlers::campaigns::campaign_stats,

        // --- Leads ---
        handlers::leads::list_leads,
        handlers::leads::create_lead,
        handlers::leads::get_lead,

        // --- Appointments ---
        handlers::appointments::list_appointments,
        handlers::appointments::todays_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::update_appointment_status,

        // --- Deals ---
        handlers::deals::list_deals,
        handlers::deals::get_deal,
        handlers::deals::create_deal,
        handlers::deals::update_deal,
        handlers::deals::add_payment,

        // --- Reports ---
        handlers::reports::closer_stats,
        handlers::reports::revenue,
        handlers::reports::no_shows,
        handlers::reports::daily_stats,

        // --- Admin ---
        handlers::admin::dashboard,
        handlers::admin::closer_detail,
        handlers::admin::update_daily_stats,
        handlers::admin::list_users,
        handlers::admin::create_user,
        handlers::admin::recompute_counters,

        // --- Closer ---
        handlers::closer::dashboard,
        handlers::closer::complete_appointment,
        handlers::closer::create_deal,
        handlers::closer::get_lead,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,

            // --- Users ---
            models::user::UserRole,
            models::user::User,
            models::user::CloserSummary,

            // --- Campaigns ---
            models::campaign::CampaignStatus,
            models::campaign::Campaign,
            models::campaign::CampaignWithLeadCount,
            models::campaign::CampaignStats,
            models::campaign::CampaignStatsResponse,

            // --- Leads ---
            models::lead::Lead,
            models::lead::LeadContact,
            models::lead::LeadAppointmentView,
            models::lead::LeadDetail,
            models::lead::CloserLeadView,

            // --- Appointments ---
            models::appointment::AppointmentStatus,
            models::appointment::AppointmentStatusInput,
            models::appointment::Appointment,
            models::appointment::AppointmentDetail,

            // --- Deals ---
            models::deal::DealStatus,
            models::deal::PaymentType,
            models::deal::Deal,
            models::deal::Payment,
            models::deal::DealWithPayments,
            models::deal::DealDetail,

            // --- Reports ---
            models::reports::CloserStatsEntry,
            models::reports::RevenueReport,
            models::reports::NoShowReport,
            models::stats::DailyStats,

            // --- Dashboards ---
            models::dashboard::CloserRankingEntry,
            models::dashboard::TodayDeal,
            models::dashboard::AdminDashboard,
            models::dashboard::CloserDetail,
            models::dashboard::AppointmentLeadInfo,
            models::dashboard::TodayAppointmentEntry,
            models::dashboard::FollowUpEntry,
            models::dashboard::CloserOwnStats,
            models::dashboard::CloserDashboard,

            // --- Payloads ---
            handlers::campaigns::CreateCampaignPayload,
            handlers::campaigns::UpdateCampaignPayload,
            handlers::leads::CreateLeadPayload,
            handlers::appointments::CreateAppointmentPayload,
            handlers::appointments::UpdateAppointmentStatusPayload,
            handlers::deals::CreateDealPayload,
            handlers::deals::UpdateDealPayload,
            handlers::deals::AddPaymentPayload,
            handlers::admin::UpdateDailyStatsPayload,
            handlers::admin::CreateUserPayload,
            handlers::closer::CompleteAppointmentPayload,
        )
    ),
    tags(
        (name = "Health", description = "Estado do servidor"),
        (name = "Campaigns", description = "Campanhas de anúncios e funil"),
        (name = "Leads", description = "Leads captados"),
        (name = "Appointments", description = "Consultas agendadas"),
        (name = "Deals", description = "Negócios e pagamentos"),
        (name = "Reports", description = "Relatórios por período"),
        (name = "Admin", description = "Painel do gestor, usuários e manutenção"),
        (name = "Closer", description = "Painel do closer")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for prefix in [
            "/api/campaigns",
            "/api/leads",
            "/api/appointments",
            "/api/deals",
            "/api/reports",
            "/api/admin",
            "/api/closer",
        ] {
            assert!(paths.iter().any(|p| p.starts_with(prefix)), "{prefix}");
        }
    }
}
