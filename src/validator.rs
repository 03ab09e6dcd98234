//! Session validation
//!
//! Turns raw log rows into typed samples while checking, in order: length,
//! timestamps, positions, and natural movement. The first failing check ends
//! validation with a single reason.

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::reader::RawRow;
use crate::types::{parse_sample_timestamp, CursorSample, ScreenBounds};

/// Reasons a session is rejected before analysis
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Not enough tracking data: {found} samples, at least {required} required")]
    InsufficientData { found: usize, required: usize },

    #[error("Invalid timestamp at sample {index}")]
    InvalidTimestamps { index: usize },

    #[error("Cursor position out of screen bounds at sample {index}")]
    OutOfBounds { index: usize },

    #[error("Abrupt cursor movement detected at sample {index}")]
    AbruptMovement { index: usize },

    #[error("No cursor movement detected")]
    NoMovement,

    #[error("Cursor never came to rest")]
    RestlessMovement,
}

/// Samples that passed every validity check
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSession {
    samples: Vec<CursorSample>,
}

impl ValidatedSession {
    pub fn samples(&self) -> &[CursorSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<CursorSample> {
        self.samples
    }
}

/// Validate raw rows against the screen and configured limits
pub fn validate(
    rows: &[RawRow],
    screen: ScreenBounds,
    config: &AnalysisConfig,
) -> Result<ValidatedSession, ValidationError> {
    let result = run_checks(rows, screen, config);
    match &result {
        Ok(session) => debug!(samples = session.len(), "session passed validation"),
        Err(e) => warn!(reason = %e, "session failed validation"),
    }
    result
}

fn run_checks(
    rows: &[RawRow],
    screen: ScreenBounds,
    config: &AnalysisConfig,
) -> Result<ValidatedSession, ValidationError> {
    check_length(rows, config.min_samples)?;
    let timestamps = check_timestamps(rows)?;
    let samples = check_positions(rows, &timestamps, screen)?;
    check_natural_movement(&samples, config.abrupt_jump_sq)?;
    Ok(ValidatedSession { samples })
}

fn check_length(rows: &[RawRow], required: usize) -> Result<(), ValidationError> {
    if rows.len() < required {
        return Err(ValidationError::InsufficientData {
            found: rows.len(),
            required,
        });
    }
    Ok(())
}

fn check_timestamps(rows: &[RawRow]) -> Result<Vec<NaiveDateTime>, ValidationError> {
    let mut timestamps: Vec<NaiveDateTime> = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let ts = parse_sample_timestamp(&row.timestamp)
            .ok_or(ValidationError::InvalidTimestamps { index })?;

        if timestamps.last().is_some_and(|prev| ts < *prev) {
            return Err(ValidationError::InvalidTimestamps { index });
        }
        timestamps.push(ts);
    }

    Ok(timestamps)
}

fn check_positions(
    rows: &[RawRow],
    timestamps: &[NaiveDateTime],
    screen: ScreenBounds,
) -> Result<Vec<CursorSample>, ValidationError> {
    rows.iter()
        .zip(timestamps)
        .enumerate()
        .map(|(index, (row, ts))| {
            let out_of_bounds = || ValidationError::OutOfBounds { index };
            let (x, y) = match (row.x.parse::<i64>(), row.y.parse::<i64>()) {
                (Ok(x), Ok(y)) if screen.contains(x, y) => (x, y),
                _ => return Err(out_of_bounds()),
            };
            let x = i32::try_from(x).map_err(|_| out_of_bounds())?;
            let y = i32::try_from(y).map_err(|_| out_of_bounds())?;

            // Anything other than "1" counts as not clicked
            let clicked = row.clicked == "1";
            Ok(CursorSample::new(*ts, x, y, clicked))
        })
        .collect()
}

fn check_natural_movement(
    samples: &[CursorSample],
    abrupt_jump_sq: i64,
) -> Result<(), ValidationError> {
    let mut moved = false;
    let mut rested = false;

    for (index, pair) in samples.windows(2).enumerate() {
        let (dx, dy) = pair[0].displacement_to(&pair[1]);
        let dist_sq = dx * dx + dy * dy;

        if dist_sq >= abrupt_jump_sq {
            return Err(ValidationError::AbruptMovement { index: index + 1 });
        }
        if dist_sq == 0 {
            rested = true;
        } else {
            moved = true;
        }
    }

    if !moved {
        return Err(ValidationError::NoMovement);
    }
    if !rested {
        return Err(ValidationError::RestlessMovement);
    }
    Ok(())
}
