//! Session analysis pipeline
//!
//! Orchestrates the full run for one completed tracking session:
//! log rows → validation → pauses and end points → segments → recommendation.
//! Validation failures stop the run before any geometry is computed.

use std::path::Path;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::distance::total_distance;
use crate::endpoint::end_points;
use crate::error::AnalysisError;
use crate::pause::pause_segments;
use crate::reader::{parse_log, read_log, ParsedLog, SessionLogs};
use crate::recommend::DpiRecommender;
use crate::segment::SegmentAnalyzer;
use crate::types::{ScreenBounds, SessionAnalysis};
use crate::validator::validate;

/// Analyze session log text with the default configuration (one-shot).
///
/// # Example
/// ```ignore
/// let analysis = analyze_session_log(&csv, ScreenBounds::new(1920, 1080), 800)?;
/// println!("{}", analysis.recommendation.recommended_dpi);
/// ```
pub fn analyze_session_log(
    log_text: &str,
    screen: ScreenBounds,
    current_dpi: u32,
) -> Result<SessionAnalysis, AnalysisError> {
    SessionAnalyzer::default().analyze_text(log_text, screen, current_dpi)
}

/// Runs session analyses with a fixed configuration.
///
/// Holds no state between runs; the same input always yields the same output.
#[derive(Debug, Clone)]
pub struct SessionAnalyzer {
    config: AnalysisConfig,
    segments: SegmentAnalyzer,
    recommender: DpiRecommender,
}

impl Default for SessionAnalyzer {
    fn default() -> Self {
        Self::from_valid_config(AnalysisConfig::default())
    }
}

impl SessionAnalyzer {
    /// Create an analyzer, rejecting an unusable configuration
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: AnalysisConfig) -> Self {
        Self {
            segments: SegmentAnalyzer::new(&config),
            recommender: DpiRecommender::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze session log text
    pub fn analyze_text(
        &self,
        log_text: &str,
        screen: ScreenBounds,
        current_dpi: u32,
    ) -> Result<SessionAnalysis, AnalysisError> {
        self.analyze_parsed(&parse_log(log_text), screen, current_dpi)
    }

    /// Analyze a session log file
    pub fn analyze_file(
        &self,
        path: &Path,
        screen: ScreenBounds,
        current_dpi: u32,
    ) -> Result<SessionAnalysis, AnalysisError> {
        self.analyze_parsed(&read_log(path)?, screen, current_dpi)
    }

    /// Analyze a profile's session from a log directory
    pub fn analyze_session(
        &self,
        logs: &SessionLogs,
        profile_id: u32,
        session: &str,
        screen: ScreenBounds,
        current_dpi: u32,
    ) -> Result<SessionAnalysis, AnalysisError> {
        self.analyze_parsed(&logs.read(profile_id, session)?, screen, current_dpi)
    }

    /// Analyze already-parsed log rows
    pub fn analyze_parsed(
        &self,
        log: &ParsedLog,
        screen: ScreenBounds,
        current_dpi: u32,
    ) -> Result<SessionAnalysis, AnalysisError> {
        if current_dpi == 0 {
            return Err(AnalysisError::InvalidConfig(
                "current DPI must be positive".to_string(),
            ));
        }

        // Stage 1: Validate
        let session = validate(&log.rows, screen, &self.config)?;
        let samples = session.samples();

        // Stage 2: Pauses and end points
        let pauses = pause_segments(
            samples,
            self.config.pause_threshold_px,
            self.config.min_pause_dwell_sec,
        );
        let end_points = end_points(samples, self.config.debounce_interval_sec);

        // Stage 3: Segments
        let segments = self.segments.analyze(samples, &pauses, &end_points);

        // Stage 4: Session distance and recommendation
        let total_distance = total_distance(samples);
        let recommendation = self.recommender.recommend(&segments, current_dpi);

        info!(
            samples = samples.len(),
            skipped_rows = log.skipped_rows,
            pauses = pauses.len(),
            end_points = end_points.len(),
            total_distance,
            "session analyzed"
        );

        Ok(SessionAnalysis {
            sample_count: samples.len(),
            skipped_rows: log.skipped_rows,
            pauses,
            end_points,
            segments,
            total_distance,
            recommendation,
        })
    }
}
