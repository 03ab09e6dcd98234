//! Core data types for cursor session analysis
//!
//! All values here are derived, read-only artifacts of one analysis run over an
//! immutable session log. Indices into the sample sequence are the shared handle
//! between pipeline stages.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Timestamp format used in session log rows (`YYYY-MM-DD HH:MM:SS.ffffff`)
pub const SAMPLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Timestamp format used for distance history entries
pub const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a log row timestamp, accepting only the exact microsecond format.
///
/// chrono accepts missing or shorter fractions for `%.6f` when parsing, so the
/// value must also format back to the original text.
pub fn parse_sample_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let ts = NaiveDateTime::parse_from_str(raw, SAMPLE_TIMESTAMP_FORMAT).ok()?;
    (ts.format(SAMPLE_TIMESTAMP_FORMAT).to_string() == raw).then_some(ts)
}

/// A single validated cursor sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSample {
    pub timestamp: NaiveDateTime,
    pub x: i32,
    pub y: i32,
    pub clicked: bool,
}

impl CursorSample {
    pub fn new(timestamp: NaiveDateTime, x: i32, y: i32, clicked: bool) -> Self {
        Self {
            timestamp,
            x,
            y,
            clicked,
        }
    }

    /// Whether both samples sit on the same pixel
    pub fn same_position(&self, other: &CursorSample) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Signed displacement from `self` to `other`
    pub fn displacement_to(&self, other: &CursorSample) -> (i64, i64) {
        (
            other.x as i64 - self.x as i64,
            other.y as i64 - self.y as i64,
        )
    }

    /// Seconds elapsed from `self` to `other` (negative if `other` is earlier)
    pub fn seconds_until(&self, other: &CursorSample) -> f64 {
        (other.timestamp - self.timestamp).num_microseconds().unwrap_or(i64::MAX) as f64
            / 1_000_000.0
    }
}

/// Screen dimensions the session was captured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenBounds {
    pub width: u32,
    pub height: u32,
}

impl ScreenBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `(x, y)` lies within `[0, width) x [0, height)`
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }
}

/// A run of near-stationary samples, anchored at its first sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseSegment {
    pub start_index: usize,
    /// Inclusive
    pub end_index: usize,
    pub x: i32,
    pub y: i32,
}

impl PauseSegment {
    pub fn contains(&self, index: usize) -> bool {
        self.start_index <= index && index <= self.end_index
    }
}

/// Movement evidence attributed to one end point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start_index: usize,
    pub end_index: usize,
    /// Non-zero path distances between consecutive hesitation anchors
    pub pause_distances: Vec<f64>,
    /// Path distance from the overshoot point to the end point, if one was found
    pub overshoot_distance: Option<f64>,
    /// Path length from `start_index` to `end_index`
    pub total_distance: f64,
}

/// DPI adjustment derived from one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommended_dpi: u32,
    pub out_of_bounds: bool,
    pub large_diff: bool,
}

impl Recommendation {
    /// Recommendation that leaves the current DPI untouched
    pub fn unchanged(current_dpi: u32) -> Self {
        Self {
            recommended_dpi: current_dpi,
            out_of_bounds: false,
            large_diff: false,
        }
    }

    /// Return the DPI to commit, refusing values outside the accepted range.
    ///
    /// Out-of-range values are rejected rather than clamped; the caller decides
    /// how to warn the user.
    pub fn accept(&self, config: &AnalysisConfig) -> Result<u32, AnalysisError> {
        if self.out_of_bounds {
            return Err(AnalysisError::RecommendationRejected {
                dpi: self.recommended_dpi,
                min: config.dpi_min,
                max: config.dpi_max,
            });
        }
        Ok(self.recommended_dpi)
    }
}

/// Session distance record as kept in a profile's distance history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceEntry {
    pub timestamp: String,
    pub total_distance: u64,
}

/// Full result of one successful session analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub sample_count: usize,
    pub skipped_rows: usize,
    pub pauses: Vec<PauseSegment>,
    pub end_points: Vec<usize>,
    pub segments: Vec<Segment>,
    /// Path length over the whole session
    pub total_distance: f64,
    pub recommendation: Recommendation,
}

impl SessionAnalysis {
    /// Build the distance history entry for a session started at `started_at`
    pub fn distance_entry(&self, started_at: NaiveDateTime) -> DistanceEntry {
        DistanceEntry {
            timestamp: started_at.format(HISTORY_TIMESTAMP_FORMAT).to_string(),
            total_distance: self.total_distance.round().max(0.0) as u64,
        }
    }

    /// Serialize the analysis for the presentation layer
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        Ok(serde_json::to_string(self)?)
    }
}
