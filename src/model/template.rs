// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Authored glyph templates in design units.
//!
//! A template is already-parsed structured data handed over by the
//! template store: ordered strokes of design-unit points plus the glyph's
//! vertical metrics. Nothing here touches the filesystem; the types derive
//! serde so a store can deserialize them from whatever it keeps on disk.

use crate::error::TemplateError;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Vertical metrics of a glyph, in design units (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphMetrics {
    pub units_per_em: f64,
    pub baseline: f64,
    pub x_height: f64,
    pub ascender: f64,
    /// Usually negative (below the baseline)
    pub descender: f64,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        Self {
            units_per_em: 1000.0,
            baseline: 0.0,
            x_height: 500.0,
            ascender: 750.0,
            descender: -250.0,
        }
    }
}

/// One authored stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateStroke {
    pub id: String,
    /// Draw sequence; lower draws first
    pub order: u32,
    pub points: Vec<Point>,
    /// Explicit start point, if the author pinned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Point>,
    /// Explicit end point, if the author pinned one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Point>,
}

impl TemplateStroke {
    pub fn new(id: impl Into<String>, order: u32, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            order,
            points,
            start: None,
            end: None,
        }
    }
}

/// A complete glyph definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphTemplate {
    pub id: String,
    #[serde(default)]
    pub metrics: GlyphMetrics,
    #[serde(default)]
    pub strokes: Vec<TemplateStroke>,
}

impl GlyphTemplate {
    pub fn new(id: impl Into<String>, metrics: GlyphMetrics, strokes: Vec<TemplateStroke>) -> Self {
        Self {
            id: id.into(),
            metrics,
            strokes,
        }
    }

    /// Strokes sorted by draw order (stable for equal `order` values).
    pub fn strokes_in_order(&self) -> Vec<&TemplateStroke> {
        let mut strokes: Vec<&TemplateStroke> = self.strokes.iter().collect();
        strokes.sort_by_key(|s| s.order);
        strokes
    }

    /// Reject metrics and coordinates that would poison the scale factors.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let m = &self.metrics;
        let metrics = [
            ("unitsPerEm", m.units_per_em),
            ("baseline", m.baseline),
            ("xHeight", m.x_height),
            ("ascender", m.ascender),
            ("descender", m.descender),
        ];
        for (metric, value) in metrics {
            if !value.is_finite() {
                return Err(TemplateError::NonFiniteMetric {
                    template: self.id.clone(),
                    metric,
                });
            }
        }
        if m.ascender <= m.baseline {
            return Err(TemplateError::AscenderBelowBaseline {
                template: self.id.clone(),
                ascender: m.ascender,
                baseline: m.baseline,
            });
        }

        for stroke in &self.strokes {
            let finite = stroke
                .points
                .iter()
                .chain(stroke.start.iter())
                .chain(stroke.end.iter())
                .all(|p| p.is_finite());
            if !finite {
                return Err(TemplateError::NonFiniteCoordinate {
                    template: self.id.clone(),
                    stroke: stroke.id.clone(),
                });
            }
        }
        Ok(())
    }
}
