// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Inkpath: ordered checkpoint validation for traced glyph strokes.
//!
//! A glyph template is laid out into a writing row ([`normalize`]), cut into
//! short checkpoints that must be touched in order ([`checkpoint`]), and
//! every attempt is judged from scratch by [`evaluate`]. The
//! [`PlanCache`] and [`PracticeSession`] wrap those pieces for a practice
//! screen that re-evaluates on every pointer event.

pub mod cache;
pub mod checkpoint;
pub mod difficulty;
pub mod error;
pub mod geometry;
pub mod model;
pub mod normalize;
pub mod projector;
pub mod session;
pub mod validator;

mod settings;

pub use cache::{PlanCache, PreparedGlyph};
pub use checkpoint::{Checkpoint, CheckpointPlan, build_checkpoint_plan};
pub use difficulty::{DifficultyProfile, DifficultyTier, Tolerances};
pub use error::{ProfileError, TemplateError};
pub use model::{Drawing, GlyphMetrics, GlyphTemplate, InkStroke, LiveSample, TemplateStroke};
pub use normalize::{NormalizedGlyph, RowLayout, StrokePolyline, normalize};
pub use session::{PracticeRow, PracticeSession, RowState, StrokeOutcome};
pub use validator::{CheckpointStatus, EvaluationResult, FailureReason, TraceMetrics, evaluate};
