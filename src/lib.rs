//! Cursor Tune - pointer sensitivity recommendations from cursor tracking sessions
//!
//! A completed tracking session log is analyzed in one batch run:
//! validation → pause and click detection → backward movement segmentation →
//! DPI scoring. The result is a validity verdict (an [`AnalysisError`] on
//! failure) or a [`SessionAnalysis`] carrying the session's path length and a
//! [`Recommendation`].

pub mod config;
pub mod distance;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod pause;
pub mod pipeline;
pub mod reader;
pub mod recommend;
pub mod segment;
pub mod types;
pub mod validator;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use pipeline::{analyze_session_log, SessionAnalyzer};
pub use reader::SessionLogs;
pub use types::{
    CursorSample, DistanceEntry, PauseSegment, Recommendation, ScreenBounds, Segment,
    SessionAnalysis,
};
pub use validator::ValidationError;
