//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod email_service;
pub mod messaging_service;
pub mod relay_service;
pub mod transport;
