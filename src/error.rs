//! Error types for Cursor Tune

use std::path::PathBuf;
use thiserror::Error;

use crate::validator::ValidationError;

/// Errors that can occur while analyzing a tracking session
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Session log not found: {}", .0.display())]
    LogNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    InvalidSession(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Recommended DPI {dpi} is outside the accepted range {min}-{max}")]
    RecommendationRejected { dpi: u32, min: u32, max: u32 },
}
