pub mod history_service;
pub mod spin_service;
