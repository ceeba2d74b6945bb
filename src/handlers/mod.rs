//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers HTTP.
pub mod alert_handler;
pub mod status_handler;
