pub mod admin_service;
pub mod appointment_service;
pub mod campaign_service;
pub mod closer_service;
pub mod deal_service;
pub mod lead_service;
pub mod lookup;
pub mod metrics;
pub mod report_service;

pub use admin_service::AdminService;
pub use appointment_service::AppointmentService;
pub use campaign_service::CampaignService;
pub use closer_service::CloserService;
pub use deal_service::DealService;
pub use lead_service::LeadService;
pub use report_service::ReportService;
