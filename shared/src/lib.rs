pub mod cooldown;
pub mod spin_api;
pub mod wheel;
