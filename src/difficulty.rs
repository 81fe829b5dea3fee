// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Difficulty profiles: the tolerances a practice session runs with.
//!
//! A `DifficultyProfile` is picked from a tier preset (optionally
//! overridden from TOML) and stays read-only for the whole session. Radii
//! are expressed at the reference row height; `tolerances()` rescales them
//! to the actual row so the same logical tolerance applies at any size.
//! Checkpoint length and gap are small constants and are not rescaled.

use crate::error::ProfileError;
use crate::settings::{layout, tiers};
use serde::{Deserialize, Serialize};

/// Closed set of difficulty tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Beginner,
    #[default]
    Intermediate,
    Expert,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [Self::Beginner, Self::Intermediate, Self::Expert];

    pub fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
        }
    }

    /// Parse a tier name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(name))
    }

    fn preset(self) -> &'static tiers::Preset {
        match self {
            Self::Beginner => &tiers::BEGINNER,
            Self::Intermediate => &tiers::INTERMEDIATE,
            Self::Expert => &tiers::EXPERT,
        }
    }
}

/// Tunable tolerances for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub tier: DifficultyTier,
    /// Half-width of the "on track" band around the guide
    pub corridor_radius: f64,
    /// Acceptance radius for the first checkpoint of each stroke
    pub start_tolerance: f64,
    /// Arc length of one checkpoint (`L`)
    pub checkpoint_length: f64,
    /// Arc length between checkpoints (`G`)
    pub gap_length: f64,
    /// Fraction of the guide that must be inked once checkpoints finish
    pub min_coverage: f64,
    /// Largest tolerated fraction of samples outside the corridor
    pub max_outside_ratio: f64,
    /// Ink farther than this from every stroke counts as wandering off
    pub hard_outside_distance: f64,
    /// Longest tolerated run of wandering ink
    pub max_outside_length: f64,
    /// Checkpoints past the expected one whose contact is tolerated;
    /// 0 makes any forward contact an out-of-order failure
    pub out_of_order_lookahead: usize,
}

impl DifficultyProfile {
    /// Preset values for `tier`
    pub fn for_tier(tier: DifficultyTier) -> Self {
        let preset = tier.preset();
        Self {
            tier,
            corridor_radius: preset.corridor_radius,
            start_tolerance: preset.start_tolerance,
            checkpoint_length: preset.checkpoint_length,
            gap_length: preset.gap_length,
            min_coverage: preset.min_coverage,
            max_outside_ratio: preset.max_outside_ratio,
            hard_outside_distance: preset.corridor_radius * tiers::HARD_OUTSIDE_FACTOR,
            max_outside_length: preset.corridor_radius * tiers::MAX_OUTSIDE_RUN_FACTOR,
            out_of_order_lookahead: preset.out_of_order_lookahead,
        }
    }

    /// Parse a profile from TOML.
    ///
    /// Fields left out take the preset of the document's `tier` (or the
    /// default tier when that is missing too).
    pub fn from_toml_str(source: &str) -> Result<Self, ProfileError> {
        let overrides: ProfileOverrides = toml::from_str(source)?;
        let profile = overrides.apply();
        profile.validate()?;
        Ok(profile)
    }

    /// Reject radii that are not positive and ratios outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let distances = [
            ("corridor_radius", self.corridor_radius),
            ("start_tolerance", self.start_tolerance),
            ("checkpoint_length", self.checkpoint_length),
            ("hard_outside_distance", self.hard_outside_distance),
            ("max_outside_length", self.max_outside_length),
        ];
        for (field, value) in distances {
            if !(value.is_finite() && value > 0.0) {
                return Err(ProfileError::NonPositive { field, value });
            }
        }
        if !(self.gap_length.is_finite() && self.gap_length >= 0.0) {
            return Err(ProfileError::NonPositive {
                field: "gap_length",
                value: self.gap_length,
            });
        }
        for (field, value) in [
            ("min_coverage", self.min_coverage),
            ("max_outside_ratio", self.max_outside_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProfileError::RatioOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Resolve to practice-space numbers for a row of `row_height`.
    pub fn tolerances(&self, row_height: f64) -> Tolerances {
        let scale = if row_height.is_finite() && row_height > 0.0 {
            row_height / layout::REFERENCE_ROW_HEIGHT
        } else {
            1.0
        };
        Tolerances {
            corridor_radius: self.corridor_radius * scale,
            start_tolerance: self.start_tolerance * scale,
            checkpoint_length: self.checkpoint_length,
            gap_length: self.gap_length,
            min_coverage: self.min_coverage,
            max_outside_ratio: self.max_outside_ratio,
            hard_outside_distance: self.hard_outside_distance * scale,
            max_outside_length: self.max_outside_length * scale,
            out_of_order_lookahead: self.out_of_order_lookahead,
        }
    }
}

/// A TOML profile document: every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileOverrides {
    tier: Option<DifficultyTier>,
    corridor_radius: Option<f64>,
    start_tolerance: Option<f64>,
    checkpoint_length: Option<f64>,
    gap_length: Option<f64>,
    min_coverage: Option<f64>,
    max_outside_ratio: Option<f64>,
    hard_outside_distance: Option<f64>,
    max_outside_length: Option<f64>,
    out_of_order_lookahead: Option<usize>,
}

impl ProfileOverrides {
    fn apply(self) -> DifficultyProfile {
        let base = DifficultyProfile::for_tier(self.tier.unwrap_or_default());
        DifficultyProfile {
            tier: base.tier,
            corridor_radius: self.corridor_radius.unwrap_or(base.corridor_radius),
            start_tolerance: self.start_tolerance.unwrap_or(base.start_tolerance),
            checkpoint_length: self.checkpoint_length.unwrap_or(base.checkpoint_length),
            gap_length: self.gap_length.unwrap_or(base.gap_length),
            min_coverage: self.min_coverage.unwrap_or(base.min_coverage),
            max_outside_ratio: self.max_outside_ratio.unwrap_or(base.max_outside_ratio),
            hard_outside_distance: self
                .hard_outside_distance
                .unwrap_or(base.hard_outside_distance),
            max_outside_length: self.max_outside_length.unwrap_or(base.max_outside_length),
            out_of_order_lookahead: self
                .out_of_order_lookahead
                .unwrap_or(base.out_of_order_lookahead),
        }
    }
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Self::for_tier(DifficultyTier::default())
    }
}

/// Profile values resolved for one row, in practice units.
///
/// This is the configuration record the validator reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerances {
    pub corridor_radius: f64,
    pub start_tolerance: f64,
    pub checkpoint_length: f64,
    pub gap_length: f64,
    pub min_coverage: f64,
    pub max_outside_ratio: f64,
    pub hard_outside_distance: f64,
    pub max_outside_length: f64,
    pub out_of_order_lookahead: usize,
}

impl Tolerances {
    /// Spacing used to resample ink and to space guide points for coverage
    pub fn resample_step(&self) -> f64 {
        0.5 * self.checkpoint_length.min(self.corridor_radius)
    }
}
