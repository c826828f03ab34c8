//! Error types shared across the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Failures from a single forward-geocoding call.
///
/// The resolver treats every variant the same way (the item is dropped),
/// but the distinction is kept for logging and for `ResolveOutcome`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Address not found: '{0}'")]
    NotFound(String),

    #[error("Rate limited by geocoding provider")]
    RateLimited,

    #[error("Invalid geocoder response: {0}")]
    InvalidResponse(String),
}

/// Failures when submitting a user report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report comment is empty")]
    EmptyComment,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Report endpoint answered with HTTP {0}")]
    Rejected(u16),
}

/// Generic message shown to the user for any failed submission.
pub const REPORT_FAILED_MESSAGE: &str = "No se pudo enviar el reporte. Intenta más tarde.";

impl ReportError {
    /// The text a user sees. Details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::EmptyComment => "Escribe un comentario antes de enviar.",
            Self::Network(_) | Self::Rejected(_) => REPORT_FAILED_MESSAGE,
        }
    }
}

/// Failures loading catalog data.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Cannot read address file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid address file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown venue '{0}'. Use 'all', 'azteca' or 'bbva'.")]
    UnknownVenue(String),
}
