//! config/mod.rs
pub mod relay_config;
