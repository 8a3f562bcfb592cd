//! Data models: configuration and extracted records.

pub mod config;
pub mod record;
