//! Click end point detection

use crate::types::CursorSample;

/// Indices of debounced clicks, in order.
///
/// A click within `debounce_interval_sec` (inclusive) of the previous kept
/// click is treated as part of the same acquisition and dropped.
pub fn end_points(samples: &[CursorSample], debounce_interval_sec: f64) -> Vec<usize> {
    let mut points: Vec<usize> = Vec::new();

    for (index, sample) in samples.iter().enumerate().filter(|(_, s)| s.clicked) {
        let bounced = points
            .last()
            .is_some_and(|&prev| samples[prev].seconds_until(sample) <= debounce_interval_sec);
        if !bounced {
            points.push(index);
        }
    }

    points
}
