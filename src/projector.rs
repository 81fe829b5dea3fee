// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Trace projector: nearest point on a stroke, or on one checkpoint.
//!
//! Each query walks the polyline's segments, projects onto each one and
//! keeps the closest hit, reporting the perpendicular distance and the
//! arc-length progress of the nearest point. Range queries clip every
//! segment to the requested progress window first, so a checkpoint is
//! measured against its own stretch of the stroke only.

use crate::checkpoint::{Checkpoint, CheckpointPlan};
use crate::geometry::{Polyline, project_onto_segment, segment_distance};
use crate::normalize::NormalizedGlyph;
use crate::settings::numeric;
use kurbo::Point;
use std::ops::Range;

/// Result of projecting a point onto a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Distance to the nearest point (>= 0)
    pub distance: f64,
    /// Progress of the nearest point along the whole stroke, in `[0, 1]`
    pub progress: f64,
}

impl Projection {
    const MISS: Projection = Projection {
        distance: f64::INFINITY,
        progress: 0.0,
    };
}

/// Project `p` onto the whole polyline.
pub fn project_onto_polyline(p: Point, polyline: &Polyline) -> Projection {
    project_onto_range(p, polyline, 0.0, 1.0)
}

/// Project `p` onto the part of `polyline` between two progress values.
///
/// A degenerate polyline behaves as its first point at progress 0; an
/// empty one (or an empty window) is an infinitely distant miss.
pub fn project_onto_range(
    p: Point,
    polyline: &Polyline,
    start_progress: f64,
    end_progress: f64,
) -> Projection {
    if polyline.is_degenerate() {
        return match polyline.points().first() {
            Some(first) => Projection {
                distance: p.distance(*first),
                progress: 0.0,
            },
            None => Projection::MISS,
        };
    }

    let total = polyline.length();
    let lo = start_progress.clamp(0.0, 1.0) * total;
    let hi = end_progress.clamp(0.0, 1.0) * total;
    if lo > hi {
        return Projection::MISS;
    }

    let mut best = Projection::MISS;
    for (a, b, seg_start, seg_len) in polyline.segments() {
        let seg_end = seg_start + seg_len;
        if seg_end < lo || seg_start > hi {
            continue;
        }
        let clip_lo = lo.max(seg_start);
        let clip_hi = hi.min(seg_end);
        let (sub_a, sub_b) = if seg_len > 0.0 {
            (
                a.lerp(b, (clip_lo - seg_start) / seg_len),
                a.lerp(b, (clip_hi - seg_start) / seg_len),
            )
        } else {
            (a, b)
        };
        let hit = project_onto_segment(p, sub_a, sub_b);
        if hit.distance < best.distance {
            best = Projection {
                distance: hit.distance,
                progress: polyline.progress_at_length(clip_lo + hit.t * (clip_hi - clip_lo)),
            };
        }
    }
    best
}

/// True as soon as any segment of `polyline` comes within `radius` of `p`.
///
/// Stops at the first qualifying segment, so it is cheaper than a full
/// projection when only the corridor test matters.
pub fn is_within(p: Point, polyline: &Polyline, radius: f64) -> bool {
    if polyline.is_degenerate() {
        return polyline
            .points()
            .first()
            .is_some_and(|first| p.distance(*first) <= radius);
    }
    polyline
        .segments()
        .any(|(a, b, _, _)| project_onto_segment(p, a, b).distance <= radius)
}

/// Project `p` onto one checkpoint's stretch of its stroke.
pub fn project_onto_checkpoint(
    p: Point,
    glyph: &NormalizedGlyph,
    checkpoint: &Checkpoint,
) -> Projection {
    match glyph.strokes.get(checkpoint.stroke_index) {
        Some(stroke) => project_onto_range(
            p,
            &stroke.polyline,
            checkpoint.start_progress,
            checkpoint.end_progress,
        ),
        None => Projection::MISS,
    }
}

/// Shortest distance between the stretches of two checkpoints.
///
/// 0 where strokes cross or one starts on the other. Infinite if either
/// checkpoint has no stroke.
pub fn checkpoint_separation(glyph: &NormalizedGlyph, a: &Checkpoint, b: &Checkpoint) -> f64 {
    let stretch = |cp: &Checkpoint| {
        glyph
            .strokes
            .get(cp.stroke_index)
            .map(|s| s.polyline.slice(cp.start_progress, cp.end_progress))
            .unwrap_or_default()
    };
    let (pa, pb) = (stretch(a), stretch(b));
    let mut best = f64::INFINITY;
    // Single-point stretches pair with themselves so they still count
    for sa in pa.windows(2).map(|w| (w[0], w[1])).chain(single(&pa)) {
        for sb in pb.windows(2).map(|w| (w[0], w[1])).chain(single(&pb)) {
            best = best.min(segment_distance(sa.0, sa.1, sb.0, sb.1));
        }
    }
    best
}

fn single(points: &[Point]) -> Option<(Point, Point)> {
    match points {
        [only] => Some((*only, *only)),
        _ => None,
    }
}

/// A checkpoint found by [`nearest_checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckpointHit {
    pub global_index: usize,
    pub projection: Projection,
}

/// The checkpoint closest to `p` over the whole plan.
///
/// Ties (within a tiny epsilon) go to the lowest global index, so where
/// two strokes cross the earlier one wins. Returns `None` for an empty plan.
pub fn nearest_checkpoint(
    p: Point,
    glyph: &NormalizedGlyph,
    plan: &CheckpointPlan,
) -> Option<CheckpointHit> {
    nearest_checkpoint_in(p, glyph, plan, 0..plan.len())
}

/// Like [`nearest_checkpoint`], restricted to a range of global indices.
pub fn nearest_checkpoint_in(
    p: Point,
    glyph: &NormalizedGlyph,
    plan: &CheckpointPlan,
    indices: Range<usize>,
) -> Option<CheckpointHit> {
    let end = indices.end.min(plan.len());
    let candidates = plan.checkpoints().get(indices.start..end)?;
    let mut best: Option<CheckpointHit> = None;
    for checkpoint in candidates {
        let projection = project_onto_checkpoint(p, glyph, checkpoint);
        let closer = match &best {
            None => true,
            Some(hit) => {
                projection.distance < hit.projection.distance - numeric::DISTANCE_TIE_EPSILON
            }
        };
        if closer {
            best = Some(CheckpointHit {
                global_index: checkpoint.global_index,
                projection,
            });
            if projection.distance <= numeric::DISTANCE_TIE_EPSILON {
                // Nothing later can be strictly closer
                break;
            }
        }
    }
    best
}
