// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Template normalizer: design units to practice space.
//!
//! Practice space has y growing downward from the top of the writing row,
//! with the baseline at `origin.y + ascender_height`. Points above the
//! baseline scale by `ascender_height / (ascender - baseline)`; points below
//! it use the descender scale when the row asks for a specific descender
//! depth, so ascenders and descenders each land proportionally in the row.
//! Horizontal coordinates always use the ascender scale.
//!
//! Left-handed layouts mirror x inside the glyph's own bounding box. Stroke
//! order and the start/end of every stroke are unchanged by the mirror.
//!
//! A stroke's start/end overrides also orient its path: progress always
//! runs from the start the learner is shown.

use crate::error::TemplateError;
use crate::geometry::{Polyline, project_onto_segment};
use crate::model::{GlyphTemplate, TemplateStroke};
use crate::settings::numeric;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Where and how large a glyph is laid out in practice space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowLayout {
    /// Top-left corner of the row
    pub origin: Point,
    /// Distance from the row top (ascender line) down to the baseline
    pub ascender_height: f64,
    /// Target depth of the descender below the baseline. `None` keeps
    /// descenders at the ascender scale.
    #[serde(default)]
    pub descender_depth: Option<f64>,
    #[serde(default)]
    pub left_handed: bool,
}

impl RowLayout {
    pub fn new(ascender_height: f64) -> Self {
        Self {
            origin: Point::ZERO,
            ascender_height,
            descender_depth: None,
            left_handed: false,
        }
    }

    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_descender_depth(mut self, depth: f64) -> Self {
        self.descender_depth = Some(depth);
        self
    }

    pub fn left_handed(mut self, left_handed: bool) -> Self {
        self.left_handed = left_handed;
        self
    }

    /// Height that tolerance radii scale against
    pub fn row_height(&self) -> f64 {
        self.ascender_height
    }

    fn check(&self) -> Result<(), TemplateError> {
        if !(self.ascender_height.is_finite() && self.ascender_height > 0.0) {
            return Err(TemplateError::InvalidRowHeight(self.ascender_height));
        }
        if let Some(depth) = self.descender_depth {
            if !(depth.is_finite() && depth >= 0.0) {
                return Err(TemplateError::InvalidDescenderDepth(depth));
            }
        }
        if !self.origin.is_finite() {
            return Err(TemplateError::NonFiniteOrigin);
        }
        Ok(())
    }
}

/// One template stroke in practice space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokePolyline {
    pub id: String,
    pub order: u32,
    pub polyline: Polyline,
    pub start_point: Point,
    pub end_point: Point,
}

impl StrokePolyline {
    pub fn length(&self) -> f64 {
        self.polyline.length()
    }

    pub fn is_degenerate(&self) -> bool {
        self.polyline.is_degenerate()
    }
}

/// A glyph ready for planning: strokes sorted by draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedGlyph {
    pub template_id: String,
    pub layout: RowLayout,
    pub strokes: Vec<StrokePolyline>,
}

impl NormalizedGlyph {
    /// True when no stroke has a traceable extent (e.g. a space)
    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(StrokePolyline::is_degenerate)
    }
}

/// Maps design-unit points into practice space.
struct Transform {
    origin: Point,
    ascender_height: f64,
    baseline: f64,
    ascender_scale: f64,
    descender_scale: f64,
    /// `min_x + max_x` of the glyph when mirroring
    mirror_axis: Option<f64>,
}

impl Transform {
    fn new(template: &GlyphTemplate, layout: &RowLayout) -> Self {
        let m = &template.metrics;
        let ascender_scale = layout.ascender_height / (m.ascender - m.baseline);
        let descender_scale = match layout.descender_depth {
            Some(depth) if m.descender < m.baseline => depth / (m.baseline - m.descender),
            _ => ascender_scale,
        };
        let mirror_axis = if layout.left_handed {
            glyph_x_extent(template).map(|(min_x, max_x)| min_x + max_x)
        } else {
            None
        };
        Self {
            origin: layout.origin,
            ascender_height: layout.ascender_height,
            baseline: m.baseline,
            ascender_scale,
            descender_scale,
            mirror_axis,
        }
    }

    fn apply(&self, p: Point) -> Point {
        let x = match self.mirror_axis {
            Some(axis) => axis - p.x,
            None => p.x,
        };
        let rise = p.y - self.baseline;
        let scale = if rise >= 0.0 {
            self.ascender_scale
        } else {
            self.descender_scale
        };
        Point::new(
            self.origin.x + x * self.ascender_scale,
            self.origin.y + self.ascender_height - rise * scale,
        )
    }
}

fn glyph_x_extent(template: &GlyphTemplate) -> Option<(f64, f64)> {
    let mut xs = template
        .strokes
        .iter()
        .flat_map(|s| s.points.iter().chain(s.start.iter()).chain(s.end.iter()))
        .map(|p| p.x);
    let first = xs.next()?;
    Some(xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
}

fn normalize_stroke(stroke: &TemplateStroke, transform: &Transform) -> StrokePolyline {
    let start = stroke.start.map(|p| transform.apply(p));
    let end = stroke.end.map(|p| transform.apply(p));
    let points: Vec<Point> = stroke.points.iter().map(|&p| transform.apply(p)).collect();
    let points = orient(&stroke.id, points, start, end);
    let first = points.first().copied().unwrap_or(Point::ZERO);
    let last = points.last().copied().unwrap_or(first);
    StrokePolyline {
        id: stroke.id.clone(),
        order: stroke.order,
        start_point: start.unwrap_or(first),
        end_point: end.unwrap_or(last),
        polyline: Polyline::new(points),
    }
}

/// Make the polyline run from the stroke's start towards its end.
///
/// An open path is reversed when its start override lies nearer the last
/// point than the first (or, with only an end override, when that lies
/// nearer the first). A closed path is rotated to begin at the point on it
/// nearest the start override; its direction is kept.
fn orient(id: &str, mut points: Vec<Point>, start: Option<Point>, end: Option<Point>) -> Vec<Point> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return points;
    };
    let closed = points.len() > 2 && first.distance(last) <= numeric::MIN_STROKE_LENGTH;
    match (start, end) {
        (Some(start), _) if closed => rotate_loop(points, start),
        (Some(start), _) => {
            if start.distance(last) < start.distance(first) {
                points.reverse();
            } else if start.distance(first) > numeric::MIN_STROKE_LENGTH {
                tracing::debug!("Stroke '{}' starts mid-path; keeping its direction", id);
            }
            points
        }
        (None, Some(end)) if !closed => {
            if end.distance(first) < end.distance(last) {
                points.reverse();
            }
            points
        }
        _ => points,
    }
}

/// Re-open a closed loop at the point nearest `start`. Ties go to the
/// earliest segment.
fn rotate_loop(points: Vec<Point>, start: Point) -> Vec<Point> {
    let mut best: Option<(usize, f64, f64)> = None;
    for (i, pair) in points.windows(2).enumerate() {
        let hit = project_onto_segment(start, pair[0], pair[1]);
        if best.is_none_or(|(_, _, d)| hit.distance < d - numeric::DISTANCE_TIE_EPSILON) {
            best = Some((i, hit.t, hit.distance));
        }
    }
    let Some((segment, t, _)) = best else {
        return points;
    };
    let seam = points[segment].lerp(points[segment + 1], t);
    let mut rotated = Vec::with_capacity(points.len() + 2);
    rotated.push(seam);
    rotated.extend_from_slice(&points[segment + 1..]);
    rotated.extend_from_slice(&points[1..=segment]);
    rotated.push(seam);
    rotated.dedup_by(|b, a| a.distance(*b) <= numeric::MIN_STROKE_LENGTH);
    rotated
}

/// Convert a template into practice-space polylines for `layout`.
pub fn normalize(
    template: &GlyphTemplate,
    layout: &RowLayout,
) -> Result<NormalizedGlyph, TemplateError> {
    template.validate()?;
    layout.check()?;

    let transform = Transform::new(template, layout);
    let strokes: Vec<StrokePolyline> = template
        .strokes_in_order()
        .into_iter()
        .map(|stroke| normalize_stroke(stroke, &transform))
        .collect();

    for stroke in strokes.iter().filter(|s| s.is_degenerate()) {
        tracing::warn!(
            "Stroke '{}' of '{}' is degenerate and contributes no checkpoints",
            stroke.id,
            template.id
        );
    }

    Ok(NormalizedGlyph {
        template_id: template.id.clone(),
        layout: *layout,
        strokes,
    })
}
