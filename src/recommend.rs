//! DPI recommendation
//!
//! Each segment yields a sensitivity multiplier from its evidence:
//!
//! - hesitation pauses: `total / mean(pause_distances)`, large when the user
//!   stops often over short distances
//! - overshoot: `total / (overshoot + total)`, below 1 when the user passes the
//!   target and corrects back
//!
//! The mean multiplier is applied to the current DPI, damped by the smoothing
//! factor, and floored to the configured granularity.

use tracing::{debug, info};

use crate::config::AnalysisConfig;
use crate::types::{Recommendation, Segment};

/// Kind of movement-quality evidence found in a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Pauses,
    Overshoot,
    Both,
    None,
}

impl Evidence {
    pub fn of(segment: &Segment) -> Self {
        match (
            segment.pause_distances.is_empty(),
            segment.overshoot_distance.is_some(),
        ) {
            (false, false) => Evidence::Pauses,
            (true, true) => Evidence::Overshoot,
            (false, true) => Evidence::Both,
            (true, false) => Evidence::None,
        }
    }
}

/// Multiplier suggested by one segment, or `None` when it carries no usable evidence
pub fn segment_score(segment: &Segment) -> Option<f64> {
    let total = segment.total_distance;
    let score = match Evidence::of(segment) {
        Evidence::Pauses => pause_score(&segment.pause_distances, total),
        Evidence::Overshoot => overshoot_score(segment.overshoot_distance?, total),
        Evidence::Both => {
            let paused = pause_score(&segment.pause_distances, total)?;
            let overshot = overshoot_score(segment.overshoot_distance?, total)?;
            Some((paused + overshot) / 2.0)
        }
        Evidence::None => None,
    }?;
    score.is_finite().then_some(score)
}

fn pause_score(pause_distances: &[f64], total: f64) -> Option<f64> {
    if pause_distances.is_empty() {
        return None;
    }
    let mean = pause_distances.iter().sum::<f64>() / pause_distances.len() as f64;
    (mean > 0.0).then(|| total / mean)
}

fn overshoot_score(overshoot: f64, total: f64) -> Option<f64> {
    let denominator = overshoot + total;
    (denominator > 0.0).then(|| total / denominator)
}

/// Turns segment evidence into a DPI recommendation
#[derive(Debug, Clone)]
pub struct DpiRecommender {
    smoothing_factor: f64,
    large_diff_threshold: f64,
    dpi_min: u32,
    dpi_max: u32,
    granularity: u32,
}

impl Default for DpiRecommender {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl DpiRecommender {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            smoothing_factor: config.smoothing_factor,
            large_diff_threshold: config.large_diff_threshold,
            dpi_min: config.dpi_min,
            dpi_max: config.dpi_max,
            granularity: config.dpi_granularity.max(1),
        }
    }

    /// Recommend a DPI for `current_dpi` given the session's segments.
    ///
    /// The recommended value is never clamped; `out_of_bounds` tells the caller
    /// it should not be applied.
    pub fn recommend(&self, segments: &[Segment], current_dpi: u32) -> Recommendation {
        let scores: Vec<f64> = segments.iter().filter_map(segment_score).collect();
        if scores.is_empty() {
            debug!(
                segments = segments.len(),
                "no segment carried usable evidence, keeping current DPI"
            );
            return Recommendation::unchanged(current_dpi);
        }

        let multiplier = scores.iter().sum::<f64>() / scores.len() as f64;
        let current = current_dpi as f64;
        let suggested = current * multiplier;
        let delta = (suggested - current) * self.smoothing_factor;

        // Saturate at the largest multiple of the granularity a u32 can hold
        let step = self.granularity as f64;
        let ceiling = (u32::MAX / self.granularity * self.granularity) as f64;
        let new_dpi = (((current + delta) / step).floor() * step).clamp(0.0, ceiling) as u32;

        let recommendation = Recommendation {
            recommended_dpi: new_dpi,
            out_of_bounds: !(self.dpi_min..=self.dpi_max).contains(&new_dpi),
            large_diff: delta.abs() > self.large_diff_threshold,
        };

        info!(
            scored = scores.len(),
            multiplier,
            current_dpi,
            recommended_dpi = recommendation.recommended_dpi,
            out_of_bounds = recommendation.out_of_bounds,
            large_diff = recommendation.large_diff,
            "DPI recommendation computed"
        );
        recommendation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segment(pauses: &[f64], overshoot: Option<f64>, total: f64) -> Segment {
        Segment {
            start_index: 0,
            end_index: 0,
            pause_distances: pauses.to_vec(),
            overshoot_distance: overshoot,
            total_distance: total,
        }
    }

    #[test]
    fn test_evidence_classification() {
        assert_eq!(Evidence::of(&segment(&[1.0], None, 5.0)), Evidence::Pauses);
        assert_eq!(Evidence::of(&segment(&[], Some(1.0), 5.0)), Evidence::Overshoot);
        assert_eq!(Evidence::of(&segment(&[1.0], Some(1.0), 5.0)), Evidence::Both);
        assert_eq!(Evidence::of(&segment(&[], None, 5.0)), Evidence::None);
    }

    #[test]
    fn test_segment_scores() {
        let paused = segment_score(&segment(&[126.0, 80.0], None, 400.0)).unwrap();
        assert!((paused - 400.0 / 103.0).abs() < 1e-9);

        let overshot = segment_score(&segment(&[], Some(92.0), 486.0)).unwrap();
        assert!((overshot - 486.0 / 578.0).abs() < 1e-9);

        let both = segment_score(&segment(&[126.0, 80.0], Some(92.0), 400.0)).unwrap();
        assert!((both - (400.0 / 103.0 + 400.0 / 492.0) / 2.0).abs() < 1e-9);

        assert_eq!(segment_score(&segment(&[], None, 400.0)), None);
        assert_eq!(segment_score(&segment(&[], Some(0.0), 0.0)), None);
    }

    #[test]
    fn test_pause_evidence_raises_dpi() {
        let segments = vec![
            segment(&[], None, 414.0),
            segment(&[126.0, 80.0], None, 400.0),
        ];
        let rec = DpiRecommender::default().recommend(&segments, 600);
        assert!(rec.recommended_dpi > 600);
        assert_eq!(rec.recommended_dpi, 1630);
        assert!(rec.large_diff);
        assert!(!rec.out_of_bounds);
    }

    #[test]
    fn test_overshoot_evidence_lowers_dpi() {
        let segments = vec![segment(&[], Some(92.0), 486.0)];
        let rec = DpiRecommender::default().recommend(&segments, 600);
        assert!(rec.recommended_dpi < 600);
        assert_eq!(rec.recommended_dpi, 540);
        assert!(!rec.large_diff);
    }

    #[test]
    fn test_mixed_evidence_changes_dpi() {
        let segments = vec![
            segment(&[210.0, 74.0], Some(55.0), 435.0),
            segment(&[], Some(52.0), 456.0),
        ];
        let rec = DpiRecommender::default().recommend(&segments, 600);
        assert_eq!(rec.recommended_dpi, 750);
    }

    #[test]
    fn test_low_dpi_goes_out_of_bounds_uncapped() {
        let segments = vec![segment(&[], Some(92.0), 486.0)];
        let rec = DpiRecommender::default().recommend(&segments, 100);
        assert_eq!(rec.recommended_dpi, 90);
        assert!(rec.out_of_bounds);
    }

    #[test]
    fn test_high_dpi_goes_out_of_bounds_uncapped() {
        // multiplier 2 at 3200 DPI: delta = 3200 * 0.6 = 1920
        let rec = DpiRecommender::default().recommend(&[segment(&[50.0], None, 100.0)], 3200);
        assert_eq!(rec.recommended_dpi, 5120);
        assert!(rec.out_of_bounds);
        assert!(rec.large_diff);
    }

    #[test]
    fn test_huge_dpi_saturates_on_granularity() {
        let rec = DpiRecommender::default().recommend(&[segment(&[50.0], None, 100.0)], u32::MAX);
        assert_eq!(rec.recommended_dpi, 4_294_967_290);
        assert_eq!(rec.recommended_dpi % 10, 0);
        assert!(rec.out_of_bounds);
    }

    #[test]
    fn test_no_evidence_keeps_current_dpi() {
        let segments = vec![segment(&[], None, 100.0)];
        let rec = DpiRecommender::default().recommend(&segments, 805);
        assert_eq!(rec, Recommendation::unchanged(805));
        assert_eq!(DpiRecommender::default().recommend(&[], 805), Recommendation::unchanged(805));
    }

    #[test]
    fn test_recommendations_are_multiples_of_granularity() {
        let recommender = DpiRecommender::default();
        for current in [100, 333, 800, 1234, 3200] {
            for total in [50.0, 200.0, 800.0] {
                let rec = recommender.recommend(&[segment(&[37.0, 91.0], Some(13.0), total)], current);
                assert_eq!(rec.recommended_dpi % 10, 0);
                assert_eq!(
                    rec.out_of_bounds,
                    !(100..=3200).contains(&rec.recommended_dpi)
                );
            }
        }
    }

    #[test]
    fn test_large_diff_threshold_is_exclusive() {
        // multiplier 2 at 1000 DPI: delta = 1000 * 0.6 = 600
        let config = AnalysisConfig {
            large_diff_threshold: 600.0,
            ..AnalysisConfig::default()
        };
        let rec = DpiRecommender::new(&config).recommend(&[segment(&[50.0], None, 100.0)], 1000);
        assert_eq!(rec.recommended_dpi, 1600);
        assert!(!rec.large_diff);
    }
}
