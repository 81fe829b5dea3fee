// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Plan cache: normalized glyphs and checkpoint plans, built once per
//! template and layout.
//!
//! Normalizing and planning depend only on the template, the row layout and
//! the profile's checkpoint length and gap, so a practice screen that
//! re-evaluates on every pointer event reuses one `PreparedGlyph`. The cache
//! is shared behind `Arc<RwLock<..>>`; lock helpers recover from poison.

use crate::checkpoint::{CheckpointPlan, build_checkpoint_plan};
use crate::difficulty::{DifficultyProfile, Tolerances};
use crate::error::TemplateError;
use crate::model::{Drawing, GlyphTemplate};
use crate::normalize::{NormalizedGlyph, RowLayout, normalize};
use crate::validator::{EvaluationResult, evaluate};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A glyph laid out for one row, with its checkpoint plan and resolved
/// tolerances.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedGlyph {
    pub glyph: NormalizedGlyph,
    pub plan: CheckpointPlan,
    pub tolerances: Tolerances,
}

impl PreparedGlyph {
    /// Normalize `template` into `layout` and plan it with `profile`.
    pub fn prepare(
        template: &GlyphTemplate,
        layout: &RowLayout,
        profile: &DifficultyProfile,
    ) -> Result<Self, TemplateError> {
        let glyph = normalize(template, layout)?;
        let plan = build_checkpoint_plan(&glyph, profile.checkpoint_length, profile.gap_length);
        let tolerances = profile.tolerances(layout.row_height());
        Ok(Self {
            glyph,
            plan,
            tolerances,
        })
    }

    /// Validate `drawing` against this glyph
    pub fn evaluate(&self, drawing: &Drawing) -> EvaluationResult {
        evaluate(drawing, &self.glyph, &self.plan, &self.tolerances)
    }

    pub fn checkpoint_count(&self) -> usize {
        self.plan.len()
    }
}

/// Everything a prepared glyph depends on, with floats compared by bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PlanKey {
    template_id: String,
    origin: (u64, u64),
    ascender_height: u64,
    descender_depth: Option<u64>,
    left_handed: bool,
    /// Every profile field that feeds the plan or the tolerances
    profile: [u64; 8],
    lookahead: usize,
}

impl PlanKey {
    fn new(template: &GlyphTemplate, layout: &RowLayout, profile: &DifficultyProfile) -> Self {
        Self {
            template_id: template.id.clone(),
            origin: (layout.origin.x.to_bits(), layout.origin.y.to_bits()),
            ascender_height: layout.ascender_height.to_bits(),
            descender_depth: layout.descender_depth.map(f64::to_bits),
            left_handed: layout.left_handed,
            profile: [
                profile.corridor_radius.to_bits(),
                profile.start_tolerance.to_bits(),
                profile.checkpoint_length.to_bits(),
                profile.gap_length.to_bits(),
                profile.min_coverage.to_bits(),
                profile.max_outside_ratio.to_bits(),
                profile.hard_outside_distance.to_bits(),
                profile.max_outside_length.to_bits(),
            ],
            lookahead: profile.out_of_order_lookahead,
        }
    }
}

/// Shared cache of prepared glyphs, keyed by template id, layout and
/// profile.
#[derive(Debug, Clone, Default)]
pub struct PlanCache {
    entries: Arc<RwLock<HashMap<PlanKey, Arc<PreparedGlyph>>>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached glyph for this combination, preparing it on a miss.
    ///
    /// Templates are identified by id: after editing a template, call
    /// [`PlanCache::invalidate`] with its id.
    pub fn get_or_build(
        &self,
        template: &GlyphTemplate,
        layout: &RowLayout,
        profile: &DifficultyProfile,
    ) -> Result<Arc<PreparedGlyph>, TemplateError> {
        let key = PlanKey::new(template, layout, profile);
        if let Some(hit) = read_entries(&self.entries).get(&key) {
            tracing::trace!("Plan cache hit for '{}'", template.id);
            return Ok(Arc::clone(hit));
        }

        let prepared = Arc::new(PreparedGlyph::prepare(template, layout, profile)?);
        tracing::debug!(
            "Prepared '{}': {} strokes, {} checkpoints",
            template.id,
            prepared.glyph.strokes.len(),
            prepared.checkpoint_count()
        );
        // Another caller may have raced us here; keep whichever landed first
        let mut entries = write_entries(&self.entries);
        let entry = entries.entry(key).or_insert(prepared);
        Ok(Arc::clone(entry))
    }

    /// Drop every entry built from the template `template_id`.
    /// Returns how many entries were removed.
    pub fn invalidate(&self, template_id: &str) -> usize {
        let mut entries = write_entries(&self.entries);
        let before = entries.len();
        entries.retain(|key, _| key.template_id != template_id);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Invalidated {} cached plan(s) for '{}'", removed, template_id);
        }
        removed
    }

    pub fn clear(&self) {
        write_entries(&self.entries).clear();
    }

    pub fn len(&self) -> usize {
        read_entries(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Entries = HashMap<PlanKey, Arc<PreparedGlyph>>;

fn read_entries(lock: &RwLock<Entries>) -> RwLockReadGuard<'_, Entries> {
    lock.read().unwrap_or_else(|poisoned| {
        tracing::warn!("Plan cache RwLock was poisoned, recovering");
        poisoned.into_inner()
    })
}

fn write_entries(lock: &RwLock<Entries>) -> RwLockWriteGuard<'_, Entries> {
    lock.write().unwrap_or_else(|poisoned| {
        tracing::warn!("Plan cache RwLock was poisoned, recovering");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::DifficultyTier;
    use crate::model::{GlyphMetrics, InkStroke, TemplateStroke};
    use kurbo::Point;

    fn template(id: &str) -> GlyphTemplate {
        let metrics = GlyphMetrics {
            ascender: 100.0,
            ..GlyphMetrics::default()
        };
        GlyphTemplate::new(
            id,
            metrics,
            vec![TemplateStroke::new(
                "bar",
                0,
                vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            )],
        )
    }

    #[test]
    fn second_lookup_reuses_the_plan() {
        let cache = PlanCache::new();
        let layout = RowLayout::new(100.0);
        let profile = DifficultyProfile::default();

        let first = cache.get_or_build(&template("a"), &layout, &profile).unwrap();
        let second = cache.get_or_build(&template("a"), &layout, &profile).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn layout_and_profile_are_part_of_the_key() {
        let cache = PlanCache::new();
        let profile = DifficultyProfile::default();
        let t = template("a");

        cache.get_or_build(&t, &RowLayout::new(100.0), &profile).unwrap();
        cache.get_or_build(&t, &RowLayout::new(200.0), &profile).unwrap();
        cache
            .get_or_build(&t, &RowLayout::new(100.0).left_handed(true), &profile)
            .unwrap();
        cache
            .get_or_build(
                &t,
                &RowLayout::new(100.0),
                &DifficultyProfile::for_tier(DifficultyTier::Expert),
            )
            .unwrap();
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn invalidate_only_touches_one_template() {
        let cache = PlanCache::new();
        let layout = RowLayout::new(100.0);
        let profile = DifficultyProfile::default();
        cache.get_or_build(&template("a"), &layout, &profile).unwrap();
        cache.get_or_build(&template("a"), &RowLayout::new(50.0), &profile).unwrap();
        cache.get_or_build(&template("b"), &layout, &profile).unwrap();

        assert_eq!(cache.invalidate("a"), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.invalidate("missing"), 0);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn bad_layout_is_not_cached() {
        let cache = PlanCache::new();
        let err = cache
            .get_or_build(&template("a"), &RowLayout::new(-1.0), &DifficultyProfile::default())
            .unwrap_err();
        assert!(matches!(err, TemplateError::InvalidRowHeight(_)));
        assert!(cache.is_empty());
    }

    #[test]
    fn prepared_glyph_evaluates_drawings() {
        let prepared = PreparedGlyph::prepare(
            &template("a"),
            &RowLayout::new(100.0),
            &DifficultyProfile::default(),
        )
        .unwrap();
        let drawing = Drawing::new(vec![InkStroke::from_points(
            &[Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
            0.0,
            1.0,
        )]);
        assert!(prepared.evaluate(&drawing).is_complete());
        assert!(!prepared.evaluate(&Drawing::default()).is_complete());
    }
}
