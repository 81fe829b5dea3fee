// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for template preparation and profile loading.
//!
//! Validation outcomes are not errors: a trace that goes out of order or
//! strays from the guide is reported through
//! [`FailureReason`](crate::validator::FailureReason) inside an
//! [`EvaluationResult`](crate::validator::EvaluationResult). The enums here
//! cover data that cannot be turned into a checkpoint plan at all.

/// Errors raised while normalizing a glyph template into practice space.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    /// The ascender must sit above the baseline for scaling to make sense.
    #[error("template '{template}' has ascender {ascender} at or below baseline {baseline}")]
    AscenderBelowBaseline {
        template: String,
        ascender: f64,
        baseline: f64,
    },
    /// A metric is NaN or infinite.
    #[error("template '{template}' has a non-finite {metric} metric")]
    NonFiniteMetric {
        template: String,
        metric: &'static str,
    },
    /// A stroke point (or start/end override) is NaN or infinite.
    #[error("stroke '{stroke}' of template '{template}' has a non-finite coordinate")]
    NonFiniteCoordinate { template: String, stroke: String },
    /// The target row height is not a positive finite number.
    #[error("row layout needs a positive ascender height, got {0}")]
    InvalidRowHeight(f64),
    /// A requested descender depth is negative or not finite.
    #[error("row layout needs a non-negative descender depth, got {0}")]
    InvalidDescenderDepth(f64),
    #[error("row layout origin must be finite")]
    NonFiniteOrigin,
}

/// Errors raised while loading or checking a difficulty profile.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("could not parse difficulty profile: {0}")]
    Parse(#[from] toml::de::Error),
    /// A distance must be positive and finite.
    #[error("profile field `{field}` must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    /// A ratio must lie in `[0, 1]`.
    #[error("profile field `{field}` must be within 0..=1, got {value}")]
    RatioOutOfRange { field: &'static str, value: f64 },
}
