// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Checkpoint planner.
//!
//! Every stroke is cut into checkpoints of arc length `L` separated by gaps
//! of length `G`, starting at progress 0. Checkpoints are numbered with one
//! running global index across the glyph, stroke by stroke in draw order.
//! The last checkpoint of a stroke always ends at progress 1, and a stroke
//! shorter than `L` gets a single checkpoint covering all of it. Degenerate
//! strokes get none.
//!
//! Checkpoint `i` of a stroke starts at `i * (L + G) / length` rather than
//! at an accumulated sum, so a plan is bit-identical for the same inputs.

use crate::normalize::NormalizedGlyph;
use serde::Serialize;

/// A short stretch of one stroke that must be touched in turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub global_index: usize,
    /// Index into `NormalizedGlyph::strokes`
    pub stroke_index: usize,
    pub start_progress: f64,
    pub end_progress: f64,
    /// Arc length covered, in practice units
    pub length: f64,
}

impl Checkpoint {
    /// True for the checkpoint that begins its stroke
    pub fn starts_stroke(&self) -> bool {
        self.start_progress == 0.0
    }
}

/// All checkpoints of a glyph, ordered by global index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckpointPlan {
    checkpoints: Vec<Checkpoint>,
    /// `ranges[s]` is the slice of `checkpoints` belonging to stroke `s`
    #[serde(skip)]
    ranges: Vec<std::ops::Range<usize>>,
    pub checkpoint_length: f64,
    pub gap_length: f64,
}

impl CheckpointPlan {
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    pub fn get(&self, global_index: usize) -> Option<&Checkpoint> {
        self.checkpoints.get(global_index)
    }

    /// Checkpoints of one stroke
    pub fn for_stroke(&self, stroke_index: usize) -> &[Checkpoint] {
        match self.ranges.get(stroke_index) {
            Some(range) => &self.checkpoints[range.clone()],
            None => &[],
        }
    }
}

/// Lay out checkpoints of length `checkpoint_length` with `gap_length`
/// spacing over every stroke of `glyph`.
///
/// Non-positive or non-finite lengths are treated as "one checkpoint per
/// stroke" and "no gap" respectively.
pub fn build_checkpoint_plan(
    glyph: &NormalizedGlyph,
    checkpoint_length: f64,
    gap_length: f64,
) -> CheckpointPlan {
    let gap = if gap_length.is_finite() && gap_length > 0.0 {
        gap_length
    } else {
        0.0
    };
    let mut checkpoints = Vec::new();
    let mut ranges = Vec::with_capacity(glyph.strokes.len());

    for (stroke_index, stroke) in glyph.strokes.iter().enumerate() {
        let first = checkpoints.len();
        if !stroke.is_degenerate() {
            let total = stroke.length();
            let span = if checkpoint_length.is_finite() && checkpoint_length > 0.0 {
                checkpoint_length / total
            } else {
                1.0
            };
            let stride = span + gap / total;
            let mut i = 0usize;
            loop {
                let start = i as f64 * stride;
                if start >= 1.0 {
                    break;
                }
                let next_start = (i + 1) as f64 * stride;
                let end = if next_start >= 1.0 {
                    1.0
                } else {
                    (start + span).min(1.0)
                };
                checkpoints.push(Checkpoint {
                    global_index: checkpoints.len(),
                    stroke_index,
                    start_progress: start,
                    end_progress: end,
                    length: (end - start) * total,
                });
                i += 1;
            }
        }
        ranges.push(first..checkpoints.len());
    }

    tracing::debug!(
        "Planned {} checkpoints for '{}' (L={}, G={})",
        checkpoints.len(),
        glyph.template_id,
        checkpoint_length,
        gap_length
    );

    CheckpointPlan {
        checkpoints,
        ranges,
        checkpoint_length,
        gap_length,
    }
}
