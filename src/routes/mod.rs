pub mod activities;
pub mod health;
pub mod sessions;
pub mod stats;
pub mod upload;
