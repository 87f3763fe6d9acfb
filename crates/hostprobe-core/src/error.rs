//! Core error types for hostprobe-core

use thiserror::Error;

/// Errors that abort a run
///
/// Per-host failures are never reported here; they are recorded in the
/// host's [`HostRecord`](crate::model::HostRecord).
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// The asset inventory could not provide a host list
    #[error("asset inventory unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Writing the export failed
    #[error("export failed: {0}")]
    Export(String),
}
