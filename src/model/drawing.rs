// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Captured ink: timestamped samples grouped into pen-down strokes.
//!
//! The input layer hands over samples already in practice space and in time
//! order within each stroke. Before validation the strokes are resampled so
//! no two consecutive samples of one stroke are farther apart than a step,
//! then flattened into a single timeline sorted by timestamp. Samples from
//! different strokes are never joined by interpolation.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A single pointer sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiveSample {
    pub location: Point,
    pub timestamp: f64,
}

impl LiveSample {
    pub fn new(location: Point, timestamp: f64) -> Self {
        Self {
            location,
            timestamp,
        }
    }
}

/// One continuous pen-down gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InkStroke {
    pub samples: Vec<LiveSample>,
}

impl InkStroke {
    pub fn new(samples: Vec<LiveSample>) -> Self {
        Self { samples }
    }

    /// Build a stroke from bare points, timestamped `t0, t0 + dt, ...`.
    pub fn from_points(points: &[Point], t0: f64, dt: f64) -> Self {
        let samples = points
            .iter()
            .enumerate()
            .map(|(i, &p)| LiveSample::new(p, t0 + dt * i as f64))
            .collect();
        Self { samples }
    }

    /// Ink length of the stroke
    pub fn length(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| w[0].location.distance(w[1].location))
            .sum()
    }

    /// Insert interpolated samples so consecutive samples are at most
    /// `step` apart. A non-positive step leaves the stroke unchanged.
    pub fn resampled(&self, step: f64) -> Vec<LiveSample> {
        let Some(first) = self.samples.first() else {
            return Vec::new();
        };
        if step.is_nan() || step <= 0.0 {
            return self.samples.clone();
        }
        let mut out = vec![*first];
        for pair in self.samples.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let gap = a.location.distance(b.location);
            let pieces = (gap / step).ceil() as usize;
            for k in 1..pieces {
                let t = k as f64 / pieces as f64;
                out.push(LiveSample {
                    location: a.location.lerp(b.location, t),
                    timestamp: a.timestamp + (b.timestamp - a.timestamp) * t,
                });
            }
            out.push(b);
        }
        out
    }
}

/// A sample tagged with the pen-down stroke it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub stroke: usize,
    pub sample: LiveSample,
}

impl TimedSample {
    pub fn location(&self) -> Point {
        self.sample.location
    }
}

/// Everything the user has inked for one glyph attempt so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub strokes: Vec<InkStroke>,
}

impl Drawing {
    pub fn new(strokes: Vec<InkStroke>) -> Self {
        Self { strokes }
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|s| s.samples.is_empty())
    }

    pub fn sample_count(&self) -> usize {
        self.strokes.iter().map(|s| s.samples.len()).sum()
    }

    /// Append a finished pen-down stroke.
    pub fn push_stroke(&mut self, stroke: InkStroke) {
        self.strokes.push(stroke);
    }

    /// Remove and return the most recent stroke.
    pub fn pop_stroke(&mut self) -> Option<InkStroke> {
        self.strokes.pop()
    }

    /// Resample every stroke by `step`, then merge all samples into one
    /// timeline ordered by timestamp. Ties keep stroke order.
    pub fn timeline(&self, step: f64) -> Vec<TimedSample> {
        let mut samples: Vec<TimedSample> = self
            .strokes
            .iter()
            .enumerate()
            .flat_map(|(stroke, ink)| {
                ink.resampled(step)
                    .into_iter()
                    .map(move |sample| TimedSample { stroke, sample })
            })
            .collect();
        samples.sort_by(|a, b| a.sample.timestamp.total_cmp(&b.sample.timestamp));
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resampling_fills_long_gaps() {
        let stroke = InkStroke::from_points(&[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], 0.0, 1.0);
        let dense = stroke.resampled(2.5);
        assert_eq!(dense.len(), 5);
        assert_eq!(dense[2].location, Point::new(5.0, 0.0));
        assert!((dense[2].timestamp - 0.5).abs() < 1e-12);
        assert_eq!(dense[4].location, Point::new(10.0, 0.0));
    }

    #[test]
    fn resampling_keeps_short_gaps() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let stroke = InkStroke::from_points(&pts, 0.0, 1.0);
        assert_eq!(stroke.resampled(5.0).len(), 3);
    }

    #[test]
    fn timeline_interleaves_by_timestamp() {
        let a = InkStroke::from_points(&[Point::new(0.0, 0.0), Point::new(0.0, 1.0)], 0.0, 2.0);
        let b = InkStroke::from_points(&[Point::new(5.0, 0.0), Point::new(5.0, 1.0)], 1.0, 2.0);
        let drawing = Drawing::new(vec![a, b]);
        let order: Vec<usize> = drawing.timeline(0.0).iter().map(|s| s.stroke).collect();
        assert_eq!(order, vec![0, 1, 0, 1]);
    }

    #[test]
    fn timeline_never_bridges_strokes() {
        let a = InkStroke::from_points(&[Point::new(0.0, 0.0)], 0.0, 1.0);
        let b = InkStroke::from_points(&[Point::new(100.0, 0.0)], 1.0, 1.0);
        let drawing = Drawing::new(vec![a, b]);
        assert_eq!(drawing.timeline(1.0).len(), 2);
    }

    #[test]
    fn pop_stroke_discards_latest() {
        let mut drawing = Drawing::default();
        drawing.push_stroke(InkStroke::from_points(&[Point::ZERO], 0.0, 1.0));
        drawing.push_stroke(InkStroke::from_points(&[Point::new(1.0, 1.0)], 1.0, 1.0));
        let popped = drawing.pop_stroke().unwrap();
        assert_eq!(popped.samples[0].location, Point::new(1.0, 1.0));
        assert_eq!(drawing.sample_count(), 1);
    }
}
