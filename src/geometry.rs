// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! 2D primitives shared by the normalizer, planner and projector.
//!
//! Points and vectors are kurbo's. A `Polyline` caches its cumulative arc
//! length so progress (0 at the first point, 1 at the last) can be mapped
//! to and from positions without re-walking the segments.

use crate::settings::numeric;
use kurbo::{Line, ParamCurveNearest, Point};
use serde::Serialize;

/// Nearest point on a segment: parameter `t` in `[0, 1]` and distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    pub t: f64,
    pub distance: f64,
}

/// Project `p` onto the segment `a`–`b`.
///
/// A zero-length segment projects everything onto `a` with `t = 0`.
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> SegmentHit {
    if (b - a).hypot2() <= numeric::MIN_STROKE_LENGTH * numeric::MIN_STROKE_LENGTH {
        return SegmentHit {
            t: 0.0,
            distance: p.distance(a),
        };
    }
    let nearest = Line::new(a, b).nearest(p, numeric::NEAREST_ACCURACY);
    SegmentHit {
        t: nearest.t,
        distance: nearest.distance_sq.sqrt(),
    }
}

/// Shortest distance between segments `a0`–`a1` and `b0`–`b1`; 0 when
/// they cross or touch.
pub fn segment_distance(a0: Point, a1: Point, b0: Point, b1: Point) -> f64 {
    let side = |o: Point, d: Point, q: Point| (d - o).cross(q - o);
    let (d1, d2) = (side(b0, b1, a0), side(b0, b1, a1));
    let (d3, d4) = (side(a0, a1, b0), side(a0, a1, b1));
    if d1 * d2 < 0.0 && d3 * d4 < 0.0 {
        return 0.0;
    }
    [
        project_onto_segment(a0, b0, b1).distance,
        project_onto_segment(a1, b0, b1).distance,
        project_onto_segment(b0, a0, a1).distance,
        project_onto_segment(b1, a0, a1).distance,
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min)
}

/// Running arc length at each point; the first entry is always 0.
pub fn cumulative_lengths(points: &[Point]) -> Vec<f64> {
    let mut lengths = Vec::with_capacity(points.len());
    let mut total = 0.0;
    for (i, pt) in points.iter().enumerate() {
        if i > 0 {
            total += points[i - 1].distance(*pt);
        }
        lengths.push(total);
    }
    lengths
}

/// An open polyline with cached arc lengths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    points: Vec<Point>,
    #[serde(skip)]
    cumulative: Vec<f64>,
}

impl Polyline {
    pub fn new(points: Vec<Point>) -> Self {
        let cumulative = cumulative_lengths(&points);
        Self { points, cumulative }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Total arc length (0 for fewer than two points)
    pub fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// True when the polyline has no usable extent
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 2 || self.length() <= numeric::MIN_STROKE_LENGTH
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Segment `i` with the arc length at its start and its own length.
    /// `None` past the last segment.
    pub fn segment(&self, i: usize) -> Option<(Point, Point, f64, f64)> {
        let next = i.checked_add(1)?;
        let (&a, &b) = (self.points.get(i)?, self.points.get(next)?);
        let start = self.cumulative[i];
        Some((a, b, start, self.cumulative[next] - start))
    }

    /// All segments in order, as returned by [`Polyline::segment`]
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point, f64, f64)> + '_ {
        (0..self.segment_count()).filter_map(|i| self.segment(i))
    }

    /// The part of the polyline between two progress values, as points.
    ///
    /// Empty when the window is empty; a single point for a degenerate
    /// polyline.
    pub fn slice(&self, start_progress: f64, end_progress: f64) -> Vec<Point> {
        if self.is_degenerate() {
            return self.points.first().copied().into_iter().collect();
        }
        let lo = start_progress.clamp(0.0, 1.0);
        let hi = end_progress.clamp(0.0, 1.0);
        if lo > hi {
            return Vec::new();
        }
        let (lo_len, hi_len) = (lo * self.length(), hi * self.length());
        let mut out = vec![self.point_at(lo)];
        for (i, &s) in self.cumulative.iter().enumerate() {
            if s > lo_len && s < hi_len {
                out.push(self.points[i]);
            }
        }
        out.push(self.point_at(hi));
        out
    }

    /// Convert an arc length to normalized progress.
    pub fn progress_at_length(&self, s: f64) -> f64 {
        let total = self.length();
        if total <= numeric::MIN_STROKE_LENGTH {
            return 0.0;
        }
        (s / total).clamp(0.0, 1.0)
    }

    /// Position at normalized progress `p`.
    pub fn point_at(&self, progress: f64) -> Point {
        let Some(first) = self.points.first() else {
            return Point::ZERO;
        };
        if self.is_degenerate() {
            return *first;
        }
        let target = progress.clamp(0.0, 1.0) * self.length();
        // First segment whose end reaches the target length
        let idx = self
            .cumulative
            .partition_point(|&s| s < target)
            .clamp(1, self.points.len() - 1);
        let Some((a, b, start, len)) = self.segment(idx - 1) else {
            return *first;
        };
        if len <= 0.0 {
            return b;
        }
        a.lerp(b, (target - start) / len)
    }
}
