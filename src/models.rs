pub mod appointment;
pub mod campaign;
pub mod dashboard;
pub mod deal;
pub mod lead;
pub mod reports;
pub mod stats;
pub mod user;
