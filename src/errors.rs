//! errors.rs
//! Errores de nivel superior del relay. Los fallos por destinatario no son errores:
//! viajan dentro de `RelayResponse` (ver `OutcomeKind`).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Petición mal formada; se rechaza antes de llamar a ningún transporte.
    #[error("validation error: {0}")]
    Validation(String),
}
