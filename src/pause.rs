//! Pause detection
//!
//! A pause is a run of consecutive samples whose per-step displacement stays
//! within a small threshold on both axes for longer than a minimum dwell.

use crate::types::{CursorSample, PauseSegment};

/// Find pause runs in a validated sample sequence.
///
/// A run is anchored at its first sample and closed at the last sample before
/// the cursor moves beyond `threshold_px`. Runs that do not outlast
/// `min_dwell_sec` are dropped, including one still open at the end of the log.
pub fn pause_segments(
    samples: &[CursorSample],
    threshold_px: i64,
    min_dwell_sec: f64,
) -> Vec<PauseSegment> {
    let mut pauses = Vec::new();
    let mut run_start: Option<usize> = None;

    let close_run = |start: usize, end: usize, pauses: &mut Vec<PauseSegment>| {
        let anchor = &samples[start];
        if anchor.seconds_until(&samples[end]) > min_dwell_sec {
            pauses.push(PauseSegment {
                start_index: start,
                end_index: end,
                x: anchor.x,
                y: anchor.y,
            });
        }
    };

    for i in 1..samples.len() {
        let (dx, dy) = samples[i - 1].displacement_to(&samples[i]);
        let still = dx.abs() <= threshold_px && dy.abs() <= threshold_px;

        if still {
            run_start.get_or_insert(i - 1);
        } else if let Some(start) = run_start.take() {
            close_run(start, i - 1, &mut pauses);
        }
    }

    if let Some(start) = run_start {
        close_run(start, samples.len() - 1, &mut pauses);
    }

    pauses
}
