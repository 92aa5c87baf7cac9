pub mod config;
pub mod notifications;
pub mod persistence;
