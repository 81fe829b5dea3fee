// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Row / repetition controller.
//!
//! A session practices one glyph for a fixed number of repetitions. Exactly
//! one row is current at a time and moves `Previewing -> Writing -> Frozen`;
//! the validator's `is_complete` is the only thing that freezes a row.
//! Freezing moves the session on to the next row, optionally wiping the
//! ink of the rows already completed.
//!
//! Failures never end a session. The caller decides whether to drop the
//! offending stroke (`discard_last_stroke`) or the whole attempt
//! (`restart_row`).

mod row;

pub use row::{PracticeRow, RowState};

use crate::cache::PreparedGlyph;
use crate::model::InkStroke;
use crate::validator::{EvaluationResult, FailureReason};
use std::sync::Arc;

/// What adding a stroke did to the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOutcome {
    /// The stroke was not accepted: no row is writing
    Ignored,
    /// Still writing; `completed` of `total` checkpoints done
    Progress { completed: usize, total: usize },
    /// The stroke broke a rule; the row stays writing
    Failed(FailureReason),
    /// The current row froze and the next one is previewing
    RowComplete { row: usize },
    /// The last row froze
    SessionComplete,
}

/// A multi-row practice session for one prepared glyph.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    glyph: Arc<PreparedGlyph>,
    rows: Vec<PracticeRow>,
    current: usize,
    /// Wipe the ink of frozen rows when moving to the next row
    clear_completed_rows: bool,
}

impl PracticeSession {
    /// A session of `repetitions` rows (at least one).
    pub fn new(glyph: Arc<PreparedGlyph>, repetitions: usize, clear_completed_rows: bool) -> Self {
        let count = repetitions.max(1);
        tracing::info!(
            "Practice session for '{}': {} row(s)",
            glyph.glyph.template_id,
            count
        );
        Self {
            glyph,
            rows: vec![PracticeRow::new(); count],
            current: 0,
            clear_completed_rows,
        }
    }

    pub fn glyph(&self) -> &PreparedGlyph {
        &self.glyph
    }

    pub fn rows(&self) -> &[PracticeRow] {
        &self.rows
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The row taking input, or `None` once every row is frozen
    pub fn current_row(&self) -> Option<&PracticeRow> {
        self.rows.get(self.current)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.rows.len()
    }

    pub fn completed_rows(&self) -> usize {
        self.rows.iter().filter(|row| row.is_frozen()).count()
    }

    /// End the current row's preview and start accepting ink
    pub fn finish_preview(&mut self) -> bool {
        let index = self.current;
        let started = self
            .rows
            .get_mut(index)
            .is_some_and(PracticeRow::start_writing);
        if started {
            tracing::info!("Row {} writing", index);
        }
        started
    }

    /// Commit a finished stroke to the current row.
    pub fn add_stroke(&mut self, stroke: InkStroke) -> StrokeOutcome {
        let index = self.current;
        let Some(row) = self.rows.get_mut(index) else {
            return StrokeOutcome::Ignored;
        };
        let Some(result) = row.add_stroke(stroke, &self.glyph) else {
            return StrokeOutcome::Ignored;
        };
        let (failure, completed, total) = (
            result.failure,
            result.completed_count(),
            result.total_checkpoint_count,
        );

        if let Some(failure) = failure {
            tracing::info!("Row {} failed: {}", index, failure.describe());
            return StrokeOutcome::Failed(failure);
        }
        if !row.is_frozen() {
            return StrokeOutcome::Progress { completed, total };
        }

        tracing::info!("Row {} complete", index);
        self.advance();
        if self.is_finished() {
            tracing::info!("Session for '{}' complete", self.glyph.glyph.template_id);
            StrokeOutcome::SessionComplete
        } else {
            StrokeOutcome::RowComplete { row: index }
        }
    }

    /// Evaluate the current row with a stroke still being drawn.
    ///
    /// Nothing is stored; `None` when no row is writing.
    pub fn preview_stroke(&self, partial: &InkStroke) -> Option<EvaluationResult> {
        let row = self.current_row()?;
        (row.state() == RowState::Writing).then(|| row.preview_with(partial, &self.glyph))
    }

    /// Drop the current row's most recent stroke
    pub fn discard_last_stroke(&mut self) -> Option<InkStroke> {
        let index = self.current;
        let stroke = self.rows.get_mut(index)?.discard_last_stroke(&self.glyph)?;
        tracing::debug!("Row {}: discarded last stroke", index);
        Some(stroke)
    }

    /// Throw away the current row's ink and let the user start over
    pub fn restart_row(&mut self) -> bool {
        let index = self.current;
        match self.rows.get_mut(index) {
            Some(row) if row.state() == RowState::Writing => {
                row.restart();
                tracing::info!("Row {} restarted", index);
                true
            }
            _ => false,
        }
    }

    /// Start the whole session over: every row back to previewing
    pub fn reset(&mut self) {
        self.rows.fill(PracticeRow::new());
        self.current = 0;
        tracing::info!("Session for '{}' reset", self.glyph.glyph.template_id);
    }

    fn advance(&mut self) {
        if self.clear_completed_rows {
            for row in self.rows[..=self.current].iter_mut() {
                row.clear_ink();
            }
        }
        self.current += 1;
    }
}
