// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Auxiliary passes over the same samples as the checkpoint pass.
//!
//! These ignore ordering entirely. The outside pass measures how much ink
//! lies off the guide; the coverage pass measures how much of the guide has
//! ink near it.

use crate::difficulty::Tolerances;
use crate::model::TimedSample;
use crate::normalize::NormalizedGlyph;
use crate::projector::{is_within, project_onto_polyline};
use kurbo::Point;

/// Distance from `p` to the closest stroke of the glyph.
///
/// Returns early with the first distance at or below `stop_within`.
pub fn distance_to_glyph(p: Point, glyph: &NormalizedGlyph, stop_within: f64) -> f64 {
    let mut best = f64::INFINITY;
    for stroke in &glyph.strokes {
        let d = project_onto_polyline(p, &stroke.polyline).distance;
        if d < best {
            best = d;
            if best <= stop_within {
                break;
            }
        }
    }
    best
}

/// Off-guide statistics for a timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OutsideReport {
    pub sample_count: usize,
    /// Samples farther than the corridor radius from every stroke
    pub outside_count: usize,
    /// Longest ink run (arc length) with both ends beyond the hard distance
    pub longest_hard_run: f64,
}

impl OutsideReport {
    pub fn ratio(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.outside_count as f64 / self.sample_count as f64
    }
}

/// Walk the timeline once, classifying every sample against the corridor
/// and the hard outside distance.
///
/// A run only grows between consecutive samples of the same pen-down
/// stroke; lifting the pen ends it.
pub fn outside_report(
    samples: &[TimedSample],
    glyph: &NormalizedGlyph,
    tolerances: &Tolerances,
) -> OutsideReport {
    let mut report = OutsideReport {
        sample_count: samples.len(),
        ..OutsideReport::default()
    };
    let mut run = 0.0;
    // Previous sample, while it was beyond the hard distance
    let mut previous: Option<&TimedSample> = None;

    for sample in samples {
        let p = sample.location();
        let hard = if in_corridor(p, glyph, tolerances) {
            false
        } else {
            report.outside_count += 1;
            distance_to_glyph(p, glyph, tolerances.hard_outside_distance)
                > tolerances.hard_outside_distance
        };
        if hard {
            match previous {
                Some(prev) if prev.stroke == sample.stroke => {
                    run += prev.location().distance(sample.location());
                }
                _ => run = 0.0,
            }
            report.longest_hard_run = report.longest_hard_run.max(run);
            previous = Some(sample);
        } else {
            run = 0.0;
            previous = None;
        }
    }
    report
}

/// Fraction of guide points with a sample inside the corridor.
///
/// Guide points sit every `resample_step` along each non-degenerate stroke,
/// endpoints included. A glyph with no guide points is fully covered.
pub fn coverage_ratio(
    samples: &[TimedSample],
    glyph: &NormalizedGlyph,
    tolerances: &Tolerances,
) -> f64 {
    let step = tolerances.resample_step();
    let mut guide_points = 0usize;
    let mut covered = 0usize;

    for stroke in glyph.strokes.iter().filter(|s| !s.is_degenerate()) {
        let intervals = if step > 0.0 {
            (stroke.length() / step).ceil().max(1.0) as usize
        } else {
            1
        };
        for k in 0..=intervals {
            let target = stroke.polyline.point_at(k as f64 / intervals as f64);
            guide_points += 1;
            if samples
                .iter()
                .any(|s| s.location().distance(target) <= tolerances.corridor_radius)
            {
                covered += 1;
            }
        }
    }

    if guide_points == 0 {
        return 1.0;
    }
    covered as f64 / guide_points as f64
}

/// True when `p` lies inside the corridor of any stroke
pub fn in_corridor(p: Point, glyph: &NormalizedGlyph, tolerances: &Tolerances) -> bool {
    glyph
        .strokes
        .iter()
        .any(|s| is_within(p, &s.polyline, tolerances.corridor_radius))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyProfile;
    use crate::model::{Drawing, GlyphMetrics, GlyphTemplate, InkStroke, TemplateStroke};
    use crate::normalize::{RowLayout, normalize};

    fn bar() -> NormalizedGlyph {
        let metrics = GlyphMetrics {
            ascender: 100.0,
            ..GlyphMetrics::default()
        };
        let template = GlyphTemplate::new(
            "bar",
            metrics,
            vec![TemplateStroke::new(
                "s",
                0,
                vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            )],
        );
        normalize(&template, &RowLayout::new(100.0)).unwrap()
    }

    fn tolerances() -> Tolerances {
        DifficultyProfile::default().tolerances(100.0)
    }

    fn timeline(strokes: &[&[Point]]) -> Vec<TimedSample> {
        let tol = tolerances();
        let drawing = Drawing::new(
            strokes
                .iter()
                .enumerate()
                .map(|(i, pts)| InkStroke::from_points(pts, i as f64 * 100.0, 1.0))
                .collect(),
        );
        drawing.timeline(tol.resample_step())
    }

    #[test]
    fn ink_on_the_guide_is_never_outside() {
        let samples = timeline(&[&[Point::new(0.0, 50.0), Point::new(100.0, 50.0)]]);
        let report = outside_report(&samples, &bar(), &tolerances());
        assert_eq!(report.outside_count, 0);
        assert_eq!(report.longest_hard_run, 0.0);
        assert!(in_corridor(Point::new(40.0, 52.0), &bar(), &tolerances()));
    }

    #[test]
    fn wandering_ink_builds_a_hard_run() {
        // 60 units of ink far below the bar
        let samples = timeline(&[&[Point::new(0.0, 0.0), Point::new(60.0, 0.0)]]);
        let report = outside_report(&samples, &bar(), &tolerances());
        assert_eq!(report.ratio(), 1.0);
        assert!((report.longest_hard_run - 60.0).abs() < 1e-9);
    }

    #[test]
    fn lifting_the_pen_breaks_a_run() {
        let samples = timeline(&[
            &[Point::new(0.0, 0.0), Point::new(20.0, 0.0)],
            &[Point::new(30.0, 0.0), Point::new(50.0, 0.0)],
        ]);
        let report = outside_report(&samples, &bar(), &tolerances());
        assert!((report.longest_hard_run - 20.0).abs() < 1e-9);
    }

    #[test]
    fn half_traced_guide_is_half_covered() {
        let samples = timeline(&[&[Point::new(0.0, 50.0), Point::new(50.0, 50.0)]]);
        let ratio = coverage_ratio(&samples, &bar(), &tolerances());
        assert!(ratio > 0.5 && ratio < 0.7, "ratio = {ratio}");

        let full = timeline(&[&[Point::new(0.0, 50.0), Point::new(100.0, 50.0)]]);
        assert_eq!(coverage_ratio(&full, &bar(), &tolerances()), 1.0);
    }

    #[test]
    fn glyph_without_guide_points_is_fully_covered() {
        let empty = NormalizedGlyph {
            template_id: "space".into(),
            layout: RowLayout::new(100.0),
            strokes: Vec::new(),
        };
        assert_eq!(coverage_ratio(&[], &empty, &tolerances()), 1.0);
    }
}
