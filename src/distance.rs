//! Path length helpers

use crate::types::CursorSample;

/// Euclidean distance between two samples
pub fn step_distance(a: &CursorSample, b: &CursorSample) -> f64 {
    let (dx, dy) = a.displacement_to(b);
    (dx as f64).hypot(dy as f64)
}

/// Path length along the samples from `from` to `to` (inclusive indices).
///
/// Returns 0 for an empty or reversed range.
pub fn path_distance(samples: &[CursorSample], from: usize, to: usize) -> f64 {
    if from >= to || to >= samples.len() {
        return 0.0;
    }
    samples[from..=to]
        .windows(2)
        .map(|pair| step_distance(&pair[0], &pair[1]))
        .sum()
}

/// Path length over the whole session, independent of click structure
pub fn total_distance(samples: &[CursorSample]) -> f64 {
    samples
        .windows(2)
        .map(|pair| step_distance(&pair[0], &pair[1]))
        .sum()
}
