pub mod appointment_repo;
pub use appointment_repo::{AppointmentFilter, AppointmentRepository};
pub mod campaign_repo;
pub use campaign_repo::{CampaignChanges, CampaignRepository, NewCampaign};
pub mod deal_repo;
pub use deal_repo::{DealFilter, DealRepository, DealStatusChange};
pub mod lead_repo;
pub use lead_repo::{LeadRepository, NewLead};
pub mod stats_repo;
pub use stats_repo::StatsRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
