// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Input data model: glyph templates and captured ink

pub mod drawing;
pub mod template;

pub use drawing::{Drawing, InkStroke, LiveSample, TimedSample};
pub use template::{GlyphMetrics, GlyphTemplate, TemplateStroke};
