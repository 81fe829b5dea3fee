// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Engine settings and tuning constants.
//!
//! This module holds the numeric defaults that stay stable across sessions.
//! Per-user tolerances belong in a `DifficultyProfile`, which starts from
//! the tier presets defined here.

// ============================================================================
// NUMERIC SETTINGS
// ============================================================================
/// Slack applied to progress comparisons at checkpoint boundaries
const PROGRESS_EPSILON: f64 = 1e-4;

/// Distances closer than this are treated as ties when picking the
/// nearest checkpoint
const DISTANCE_TIE_EPSILON: f64 = 1e-9;

/// Arc lengths at or below this count as zero (degenerate stroke)
const MIN_STROKE_LENGTH: f64 = 1e-6;

/// Accuracy passed to kurbo's nearest-point solver (exact for lines)
const NEAREST_ACCURACY: f64 = 1e-9;

// ============================================================================
// LAYOUT SETTINGS
// ============================================================================
/// Row height at which profile radii are expressed (practice units)
const REFERENCE_ROW_HEIGHT: f64 = 100.0;

// ============================================================================
// TIER PRESETS
// ============================================================================
// Radii are in practice units at the reference row height. Checkpoint
// length and gap are small constants and are not rescaled.
//
//                 corridor  start  length  gap  coverage  outside
//   beginner        14.0    18.0    6.0   3.0    0.60      0.45
//   intermediate    10.0    12.0    5.0   3.0    0.75      0.30
//   expert           6.0     7.0    4.0   2.0    0.85      0.15

const BEGINNER_CORRIDOR: f64 = 14.0;
const BEGINNER_START: f64 = 18.0;
const BEGINNER_LENGTH: f64 = 6.0;
const BEGINNER_GAP: f64 = 3.0;
const BEGINNER_COVERAGE: f64 = 0.60;
const BEGINNER_OUTSIDE: f64 = 0.45;
const BEGINNER_LOOKAHEAD: usize = 1;

const INTERMEDIATE_CORRIDOR: f64 = 10.0;
const INTERMEDIATE_START: f64 = 12.0;
const INTERMEDIATE_LENGTH: f64 = 5.0;
const INTERMEDIATE_GAP: f64 = 3.0;
const INTERMEDIATE_COVERAGE: f64 = 0.75;
const INTERMEDIATE_OUTSIDE: f64 = 0.30;
const INTERMEDIATE_LOOKAHEAD: usize = 0;

const EXPERT_CORRIDOR: f64 = 6.0;
const EXPERT_START: f64 = 7.0;
const EXPERT_LENGTH: f64 = 4.0;
const EXPERT_GAP: f64 = 2.0;
const EXPERT_COVERAGE: f64 = 0.85;
const EXPERT_OUTSIDE: f64 = 0.15;
const EXPERT_LOOKAHEAD: usize = 0;

/// Hard outside distance as a multiple of the corridor radius
const HARD_OUTSIDE_FACTOR: f64 = 3.0;

/// Allowed run of ink beyond the hard distance, as a multiple of the
/// corridor radius
const MAX_OUTSIDE_RUN_FACTOR: f64 = 4.0;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Floating point tolerances
pub mod numeric {
    /// Progress slack at checkpoint boundaries
    pub const PROGRESS_EPSILON: f64 = super::PROGRESS_EPSILON;

    /// Distance tie threshold for nearest-checkpoint search
    pub const DISTANCE_TIE_EPSILON: f64 = super::DISTANCE_TIE_EPSILON;

    /// Minimum non-degenerate stroke length
    pub const MIN_STROKE_LENGTH: f64 = super::MIN_STROKE_LENGTH;

    /// kurbo nearest-point accuracy
    pub const NEAREST_ACCURACY: f64 = super::NEAREST_ACCURACY;
}

/// Row layout settings
pub mod layout {
    /// Row height the tier radii are tuned for
    pub const REFERENCE_ROW_HEIGHT: f64 = super::REFERENCE_ROW_HEIGHT;
}

/// Difficulty tier presets
pub mod tiers {
    /// A single tier's defaults
    pub struct Preset {
        pub corridor_radius: f64,
        pub start_tolerance: f64,
        pub checkpoint_length: f64,
        pub gap_length: f64,
        pub min_coverage: f64,
        pub max_outside_ratio: f64,
        pub out_of_order_lookahead: usize,
    }

    pub const BEGINNER: Preset = Preset {
        corridor_radius: super::BEGINNER_CORRIDOR,
        start_tolerance: super::BEGINNER_START,
        checkpoint_length: super::BEGINNER_LENGTH,
        gap_length: super::BEGINNER_GAP,
        min_coverage: super::BEGINNER_COVERAGE,
        max_outside_ratio: super::BEGINNER_OUTSIDE,
        out_of_order_lookahead: super::BEGINNER_LOOKAHEAD,
    };

    pub const INTERMEDIATE: Preset = Preset {
        corridor_radius: super::INTERMEDIATE_CORRIDOR,
        start_tolerance: super::INTERMEDIATE_START,
        checkpoint_length: super::INTERMEDIATE_LENGTH,
        gap_length: super::INTERMEDIATE_GAP,
        min_coverage: super::INTERMEDIATE_COVERAGE,
        max_outside_ratio: super::INTERMEDIATE_OUTSIDE,
        out_of_order_lookahead: super::INTERMEDIATE_LOOKAHEAD,
    };

    pub const EXPERT: Preset = Preset {
        corridor_radius: super::EXPERT_CORRIDOR,
        start_tolerance: super::EXPERT_START,
        checkpoint_length: super::EXPERT_LENGTH,
        gap_length: super::EXPERT_GAP,
        min_coverage: super::EXPERT_COVERAGE,
        max_outside_ratio: super::EXPERT_OUTSIDE,
        out_of_order_lookahead: super::EXPERT_LOOKAHEAD,
    };

    /// Hard outside distance = corridor × this factor
    pub const HARD_OUTSIDE_FACTOR: f64 = super::HARD_OUTSIDE_FACTOR;

    /// Max outside run length = corridor × this factor
    pub const MAX_OUTSIDE_RUN_FACTOR: f64 = super::MAX_OUTSIDE_RUN_FACTOR;
}
