pub mod admin;
pub mod appointments;
pub mod campaigns;
pub mod closer;
pub mod deals;
pub mod health;
pub mod leads;
pub mod reports;
