// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Output of one validation pass

use serde::Serialize;

/// Why an attempt was rejected. Every kind is recoverable by retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    /// Ink touched a checkpoint ahead of the expected one
    OutOfOrder,
    /// Checkpoints finished but too little of the guide was inked
    InsufficientCoverage,
    /// Ink strayed too far from the guide for too long
    ExcessiveOutside,
}

impl FailureReason {
    pub fn describe(self) -> &'static str {
        match self {
            Self::OutOfOrder => "stroke drawn out of order",
            Self::InsufficientCoverage => "not enough of the guide was traced",
            Self::ExcessiveOutside => "ink strayed outside the guide",
        }
    }
}

/// Per-checkpoint state after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointStatus {
    pub global_index: usize,
    /// Stroke the checkpoint belongs to
    pub path_index: usize,
    pub completed: bool,
    /// Ink came within the corridor of this checkpoint at some point
    pub has_contact: bool,
}

/// Aggregate measurements from the auxiliary passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceMetrics {
    /// Samples considered (after resampling)
    pub sample_count: usize,
    /// Fraction of samples outside the corridor
    pub outside_ratio: f64,
    /// Longest continuous run of ink beyond the hard outside distance
    pub longest_outside_run: f64,
    /// Fraction of the guide inked; only measured once every checkpoint
    /// has been completed
    pub coverage: Option<f64>,
}

/// The sole externally visible output of `evaluate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub checkpoint_statuses: Vec<CheckpointStatus>,
    /// Next expected checkpoint, or the one touched out of turn on an
    /// out-of-order failure
    pub active_checkpoint_index: usize,
    pub total_checkpoint_count: usize,
    pub failure: Option<FailureReason>,
    pub metrics: TraceMetrics,
}

impl EvaluationResult {
    /// Result for a glyph with nothing to trace
    pub(crate) fn trivially_complete() -> Self {
        Self {
            checkpoint_statuses: Vec::new(),
            active_checkpoint_index: 0,
            total_checkpoint_count: 0,
            failure: None,
            metrics: TraceMetrics {
                coverage: Some(1.0),
                ..TraceMetrics::default()
            },
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none() && self.active_checkpoint_index >= self.total_checkpoint_count
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    pub fn completed_count(&self) -> usize {
        self.checkpoint_statuses.iter().filter(|s| s.completed).count()
    }

    /// Completed fraction in `[0, 1]`, for progress indicators
    pub fn progress_fraction(&self) -> f64 {
        if self.total_checkpoint_count == 0 {
            return 1.0;
        }
        self.completed_count() as f64 / self.total_checkpoint_count as f64
    }
}
