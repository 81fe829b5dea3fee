// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! One practice row: the ink for a single repetition and its latest result

use crate::cache::PreparedGlyph;
use crate::model::{Drawing, InkStroke};
use crate::validator::EvaluationResult;
use serde::Serialize;

/// Lifecycle of a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowState {
    /// The guide is being demonstrated; input is ignored
    #[default]
    Previewing,
    /// Input is accepted and validated
    Writing,
    /// Completed; ink is kept and no further input is accepted
    Frozen,
}

/// A single repetition of the glyph.
///
/// Each row owns its ink, so rows never share checkpoint state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PracticeRow {
    state: RowState,
    drawing: Drawing,
    result: Option<EvaluationResult>,
    /// Strokes rejected by the validator and discarded
    failed_attempts: usize,
}

impl PracticeRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RowState {
        self.state
    }

    pub fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    /// Result of the last evaluation, if any ink has been judged yet
    pub fn result(&self) -> Option<&EvaluationResult> {
        self.result.as_ref()
    }

    pub fn failed_attempts(&self) -> usize {
        self.failed_attempts
    }

    pub fn is_frozen(&self) -> bool {
        self.state == RowState::Frozen
    }

    /// `Previewing -> Writing`. Returns false from any other state.
    pub(crate) fn start_writing(&mut self) -> bool {
        if self.state != RowState::Previewing {
            return false;
        }
        self.state = RowState::Writing;
        true
    }

    /// Add a finished stroke and re-evaluate the whole row.
    ///
    /// Returns `None` (and keeps the ink unchanged) unless the row is
    /// writing. Freezes the row when the result is complete.
    pub(crate) fn add_stroke(
        &mut self,
        stroke: InkStroke,
        prepared: &PreparedGlyph,
    ) -> Option<&EvaluationResult> {
        if self.state != RowState::Writing {
            return None;
        }
        self.drawing.push_stroke(stroke);
        self.reevaluate(prepared);
        if self.result.as_ref().is_some_and(EvaluationResult::is_failed) {
            self.failed_attempts += 1;
        }
        self.result.as_ref()
    }

    /// Evaluate the row's ink plus a stroke still being drawn, without
    /// keeping it. Used for live feedback while the pen is down.
    pub(crate) fn preview_with(
        &self,
        partial: &InkStroke,
        prepared: &PreparedGlyph,
    ) -> EvaluationResult {
        let mut drawing = self.drawing.clone();
        drawing.push_stroke(partial.clone());
        prepared.evaluate(&drawing)
    }

    /// Drop the most recent stroke and re-evaluate. Only allowed while
    /// writing.
    pub(crate) fn discard_last_stroke(&mut self, prepared: &PreparedGlyph) -> Option<InkStroke> {
        if self.state != RowState::Writing {
            return None;
        }
        let stroke = self.drawing.pop_stroke()?;
        if self.drawing.is_empty() {
            self.result = None;
        } else {
            self.reevaluate(prepared);
        }
        Some(stroke)
    }

    /// Wipe the ink and start this row over in `Writing`
    pub(crate) fn restart(&mut self) {
        self.drawing = Drawing::default();
        self.result = None;
        self.state = RowState::Writing;
    }

    /// Remove the ink of a frozen row, keeping it frozen
    pub(crate) fn clear_ink(&mut self) {
        self.drawing = Drawing::default();
    }

    fn reevaluate(&mut self, prepared: &PreparedGlyph) {
        let result = prepared.evaluate(&self.drawing);
        if result.is_complete() {
            self.state = RowState::Frozen;
        }
        self.result = Some(result);
    }
}
