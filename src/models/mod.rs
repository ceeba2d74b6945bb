//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod alert_model;
pub mod help_report_model;
pub mod message_model;
pub mod recipient;
