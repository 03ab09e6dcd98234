//! Movement segmentation
//!
//! For every click end point, scans backward through the trajectory in fixed
//! sample steps, comparing the heading of consecutive displacement vectors.
//! A large reversal close to the target marks an overshoot; the first moderate
//! change after that marks where the deliberate approach began. Pause and
//! overshoot evidence inside the resulting span is summarized per segment.

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::distance::path_distance;
use crate::types::{CursorSample, PauseSegment, Segment};

/// Phase of a backward scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Scanning,
    /// A reversal was seen; further reversals count as direction changes
    OvershootFound,
    /// Terminal: the approach starts at this sample index
    StartFound(usize),
}

/// Result of scanning backward from one end point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub start_index: usize,
    pub overshoot_index: Option<usize>,
}

/// Two-pointer backward scan from a single end point.
///
/// `near` and `far` are offsets back from `end`; the vector compared at each
/// step runs from sample `end - far` to sample `end - near`.
#[derive(Debug)]
pub struct BackwardScan<'a> {
    samples: &'a [CursorSample],
    end: usize,
    lower_bound: usize,
    near: usize,
    far: usize,
    step: usize,
    noise_px: i64,
    overshoot_angle_deg: f64,
    direction_change_deg: f64,
    prev_heading: Option<f64>,
    overshoot_index: Option<usize>,
    state: ScanState,
}

impl<'a> BackwardScan<'a> {
    pub fn new(
        samples: &'a [CursorSample],
        end: usize,
        lower_bound: usize,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            samples,
            end,
            lower_bound,
            near: 0,
            far: config.scan_step,
            step: config.scan_step,
            noise_px: config.pause_threshold_px,
            overshoot_angle_deg: config.overshoot_angle_deg,
            direction_change_deg: config.direction_change_deg,
            prev_heading: None,
            overshoot_index: None,
            state: ScanState::Scanning,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Sample index of the far pointer, if still inside the scan range
    fn far_index(&self) -> Option<usize> {
        self.end
            .checked_sub(self.far)
            .filter(|&index| index >= self.lower_bound)
    }

    /// Advance one comparison. Returns false once the scan has finished.
    pub fn step(&mut self) -> bool {
        if matches!(self.state, ScanState::StartFound(_)) {
            return false;
        }
        let Some(far_index) = self.far_index() else {
            return false;
        };
        let near_index = self.end - self.near;

        let (dx, dy) = self.samples[far_index].displacement_to(&self.samples[near_index]);
        if dx.abs() <= self.noise_px && dy.abs() <= self.noise_px {
            // Stationary span, no direction to compare
            self.near += 1;
            self.far += 1;
            return true;
        }

        let heading = heading_deg(dx, dy);
        if let Some(prev) = self.prev_heading {
            let change = angular_difference(prev, heading);
            if change >= self.overshoot_angle_deg && self.state == ScanState::Scanning {
                self.overshoot_index = Some(near_index);
                self.state = ScanState::OvershootFound;
            } else if change > self.direction_change_deg {
                self.state = ScanState::StartFound(far_index);
                return false;
            }
        }

        self.prev_heading = Some(heading);
        self.near += self.step;
        self.far += self.step;
        true
    }

    /// Run the scan to completion
    pub fn run(mut self) -> ScanOutcome {
        while self.step() {}

        let start_index = match self.state {
            ScanState::StartFound(index) => index,
            // Exhausted the range without a direction change
            _ => self.lower_bound.min(self.end),
        };

        ScanOutcome {
            start_index,
            overshoot_index: self.overshoot_index,
        }
    }
}

/// Heading of a displacement in degrees, normalized to [0, 360)
pub fn heading_deg(dx: i64, dy: i64) -> f64 {
    (dy as f64).atan2(dx as f64).to_degrees().rem_euclid(360.0)
}

/// Smallest angle between two headings, in [0, 180]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

/// Builds one segment per end point
#[derive(Debug, Clone)]
pub struct SegmentAnalyzer {
    config: AnalysisConfig,
}

impl SegmentAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Analyze every end point; each is handled independently.
    pub fn analyze(
        &self,
        samples: &[CursorSample],
        pauses: &[PauseSegment],
        end_points: &[usize],
    ) -> Vec<Segment> {
        let mut lower_bound = 0;
        let mut segments = Vec::with_capacity(end_points.len());

        for &end_point in end_points {
            if end_point >= samples.len() {
                continue;
            }
            segments.push(self.analyze_end_point(samples, pauses, end_point, lower_bound));
            lower_bound = end_point + 1;
        }

        segments
    }

    /// Analyze a single end point whose scan may not reach below `lower_bound`
    pub fn analyze_end_point(
        &self,
        samples: &[CursorSample],
        pauses: &[PauseSegment],
        end_point: usize,
        lower_bound: usize,
    ) -> Segment {
        let end = trim_stationary_tail(samples, end_point, lower_bound);
        let scan = BackwardScan::new(samples, end, lower_bound, &self.config).run();
        let start = scan.start_index;

        let pause_distances = pause_distances(samples, pauses, start, end, scan.overshoot_index);
        let overshoot_distance = scan
            .overshoot_index
            .map(|index| path_distance(samples, index, end));
        let total_distance = path_distance(samples, start, end);

        debug!(
            end_point,
            start,
            end,
            pauses = pause_distances.len(),
            overshoot = overshoot_distance.is_some(),
            total_distance,
            "segment analyzed"
        );

        Segment {
            start_index: start,
            end_index: end,
            pause_distances,
            overshoot_distance,
            total_distance,
        }
    }
}

/// Step the end back over samples identical to their predecessor
fn trim_stationary_tail(samples: &[CursorSample], end_point: usize, lower_bound: usize) -> usize {
    let mut end = end_point;
    while end > lower_bound && samples[end].same_position(&samples[end - 1]) {
        end -= 1;
    }
    end
}

/// Path distances between consecutive hesitation anchors inside `[start, end]`.
///
/// The segment start is the first anchor. Pauses covering the overshoot point
/// or the end point are not hesitations and are ignored.
fn pause_distances(
    samples: &[CursorSample],
    pauses: &[PauseSegment],
    start: usize,
    end: usize,
    overshoot_index: Option<usize>,
) -> Vec<f64> {
    let anchors: Vec<usize> = std::iter::once(start)
        .chain(
            pauses
                .iter()
                .filter(|p| p.start_index >= start && p.end_index <= end)
                .filter(|p| !overshoot_index.is_some_and(|index| p.contains(index)))
                .filter(|p| !p.contains(end))
                .map(|p| p.start_index),
        )
        .collect();

    anchors
        .windows(2)
        .map(|pair| path_distance(samples, pair[0], pair[1]))
        .filter(|&distance| distance > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pause::pause_segments;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use pretty_assertions::assert_eq;

    fn at(ms: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 14)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            + Duration::milliseconds(ms)
    }

    /// Samples 100 ms apart; the last one is clicked
    fn trajectory(points: &[(i32, i32)]) -> Vec<CursorSample> {
        let last = points.len() - 1;
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| CursorSample::new(at(i as i64 * 100), x, y, i == last))
            .collect()
    }

    fn config_with_step(step: usize) -> AnalysisConfig {
        AnalysisConfig {
            scan_step: step,
            ..AnalysisConfig::default()
        }
    }

    /// Up along y for 10 samples, then right along x for 20, 5 px per sample
    fn corner_path() -> Vec<(i32, i32)> {
        let mut points: Vec<(i32, i32)> = (0..=10).map(|i| (100, 100 + 5 * i)).collect();
        points.extend((11..=30).map(|i| (100 + 5 * (i - 10), 150)));
        points
    }

    #[test]
    fn test_heading_and_wrapped_difference() {
        assert_eq!(heading_deg(1, 0), 0.0);
        assert!((heading_deg(0, 1) - 90.0).abs() < 1e-9);
        assert!((heading_deg(-1, 0) - 180.0).abs() < 1e-9);
        assert!((heading_deg(0, -1) - 270.0).abs() < 1e-9);
        assert!((angular_difference(350.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((angular_difference(0.0, 180.0) - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_found_at_direction_change() {
        let samples = trajectory(&corner_path());
        let config = config_with_step(5);

        let outcome = BackwardScan::new(&samples, 30, 0, &config).run();
        assert_eq!(
            outcome,
            ScanOutcome {
                start_index: 5,
                overshoot_index: None
            }
        );

        let segment = SegmentAnalyzer::new(&config).analyze_end_point(&samples, &[], 30, 0);
        assert_eq!(segment.start_index, 5);
        assert_eq!(segment.end_index, 30);
        assert!((segment.total_distance - 125.0).abs() < 1e-9);
        assert!(segment.pause_distances.is_empty());
        assert_eq!(segment.overshoot_distance, None);
    }

    #[test]
    fn test_overshoot_then_exhausted_range() {
        // Right to x=200, then back left to x=150 where the click lands
        let mut points: Vec<(i32, i32)> = (0..=20).map(|i| (10 * i, 100)).collect();
        points.extend((21..=25).map(|i| (200 - 10 * (i - 20), 100)));
        let samples = trajectory(&points);
        let config = config_with_step(5);

        let mut scan = BackwardScan::new(&samples, 25, 0, &config);
        assert!(scan.step());
        assert_eq!(scan.state(), ScanState::Scanning);
        assert!(scan.step());
        assert_eq!(scan.state(), ScanState::OvershootFound);

        let outcome = scan.run();
        assert_eq!(outcome.start_index, 0);
        assert_eq!(outcome.overshoot_index, Some(20));

        let segment = SegmentAnalyzer::new(&config).analyze_end_point(&samples, &[], 25, 0);
        assert_eq!(segment.overshoot_distance, Some(50.0));
        assert!((segment.total_distance - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_stationary_span_is_skipped_not_compared() {
        // Up to (0, 40), rest for five samples, then right to (50, 40)
        let mut points: Vec<(i32, i32)> = (0..=4).map(|i| (0, 10 * i)).collect();
        points.extend((5..=9).map(|_| (0, 40)));
        points.extend((10..=14).map(|i| (10 * (i - 9), 40)));
        let samples = trajectory(&points);

        let outcome = BackwardScan::new(&samples, 14, 0, &config_with_step(3)).run();
        assert_eq!(outcome.start_index, 3);
    }

    #[test]
    fn test_pause_distances_and_trimmed_tail() {
        let xs = [
            0, 10, 20, 30, 30, 30, 30, 40, 50, 60, 70, 70, 70, 70, 80, 90, 100, 100, 100, 100,
        ];
        let points: Vec<(i32, i32)> = xs.iter().map(|&x| (x, 200)).collect();
        let samples = trajectory(&points);
        let config = config_with_step(5);
        let pauses = pause_segments(&samples, config.pause_threshold_px, config.min_pause_dwell_sec);
        assert_eq!(pauses.len(), 3);

        let segments = SegmentAnalyzer::new(&config).analyze(&samples, &pauses, &[19]);
        assert_eq!(
            segments,
            vec![Segment {
                start_index: 0,
                end_index: 16,
                pause_distances: vec![30.0, 40.0],
                overshoot_distance: None,
                total_distance: 100.0,
            }]
        );
    }

    #[test]
    fn test_pause_at_overshoot_is_excluded() {
        let samples = trajectory(&[(0, 0); 12]);
        let pauses = vec![
            PauseSegment {
                start_index: 2,
                end_index: 4,
                x: 0,
                y: 0,
            },
            PauseSegment {
                start_index: 6,
                end_index: 8,
                x: 0,
                y: 0,
            },
        ];
        let kept = pause_distances(&samples, &pauses, 0, 11, Some(7));
        // Every anchor sits on the same pixel, so all gaps are zero length
        assert!(kept.is_empty());

        let moving: Vec<(i32, i32)> = (0..12).map(|i| (i, 0)).collect();
        let samples = trajectory(&moving);
        assert_eq!(pause_distances(&samples, &pauses, 0, 11, Some(7)), vec![2.0]);
        assert_eq!(pause_distances(&samples, &pauses, 0, 11, None), vec![2.0, 4.0]);
        // A pause holding the end point is the click dwell
        assert_eq!(pause_distances(&samples, &pauses, 0, 8, None), vec![2.0]);
    }

    #[test]
    fn test_scan_never_crosses_previous_end_point() {
        let mut samples = trajectory(&corner_path());
        samples[10].clicked = true;
        let config = config_with_step(5);

        let segments = SegmentAnalyzer::new(&config).analyze(&samples, &[], &[10, 30]);
        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start_index, segments[0].end_index), (0, 10));
        assert_eq!((segments[1].start_index, segments[1].end_index), (11, 30));
        assert!((segments[1].total_distance - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_end_point_without_room_to_scan() {
        let samples = trajectory(&[(0, 0), (5, 0), (10, 0)]);
        let segment =
            SegmentAnalyzer::new(&AnalysisConfig::default()).analyze_end_point(&samples, &[], 2, 0);
        assert_eq!(segment.start_index, 0);
        assert_eq!(segment.end_index, 2);
        assert!((segment.total_distance - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_tail_trim_stops_at_lower_bound() {
        let samples = trajectory(&[(0, 0), (5, 0), (5, 0), (5, 0)]);
        assert_eq!(trim_stationary_tail(&samples, 3, 0), 1);
        assert_eq!(trim_stationary_tail(&samples, 3, 2), 2);
    }
}
