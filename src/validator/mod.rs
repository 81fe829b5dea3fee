// Copyright 2025 the Inkpath Authors
// SPDX-License-Identifier: Apache-2.0

//! Checkpoint validator: decides whether a drawing traces a glyph.
//!
//! `evaluate` is a pure function of `(drawing, glyph, plan, tolerances)`.
//! Every call rebuilds the result from scratch with a single forward pass
//! over the time-sorted samples, holding one "next expected checkpoint"
//! pointer:
//!
//! 1. The sample is projected onto a small window of the pointer
//!    checkpoint's stroke. Within the corridor (the start tolerance for the
//!    first checkpoint of a stroke) and at or past the checkpoint's start
//!    progress, the checkpoint is completed and the pointer moves by one.
//! 2. Independently, the checkpoint nearest to the sample over the whole
//!    plan is found (ties to the lowest index). If it lies within the
//!    corridor and beyond the pointer plus the tolerated lookahead, the
//!    user has skipped ahead: the pass stops with `OutOfOrder` and reports
//!    that checkpoint. The one exception is a junction, where the nearer
//!    checkpoint meets a tolerated one that is also within the corridor.
//!
//! Touching completed checkpoints again is always allowed. When the ordered
//! pass finishes cleanly, the auxiliary passes in [`coverage`] can still
//! reject the attempt for straying off the guide or for inking too little
//! of it.

pub mod coverage;
mod result;

pub use result::{CheckpointStatus, EvaluationResult, FailureReason, TraceMetrics};

use crate::checkpoint::{Checkpoint, CheckpointPlan};
use crate::difficulty::Tolerances;
use crate::model::Drawing;
use crate::normalize::NormalizedGlyph;
use crate::projector::{
    checkpoint_separation, nearest_checkpoint, project_onto_checkpoint, project_onto_range,
};
use crate::settings::numeric;
use kurbo::Point;

/// Per-call pass state. Never outlives one `evaluate`.
struct CheckpointPass<'a> {
    glyph: &'a NormalizedGlyph,
    plan: &'a CheckpointPlan,
    tolerances: &'a Tolerances,
    statuses: Vec<CheckpointStatus>,
    pointer: usize,
}

impl<'a> CheckpointPass<'a> {
    fn new(glyph: &'a NormalizedGlyph, plan: &'a CheckpointPlan, tolerances: &'a Tolerances) -> Self {
        let statuses = plan
            .checkpoints()
            .iter()
            .map(|cp| CheckpointStatus {
                global_index: cp.global_index,
                path_index: cp.stroke_index,
                completed: false,
                has_contact: false,
            })
            .collect();
        Self {
            glyph,
            plan,
            tolerances,
            statuses,
            pointer: 0,
        }
    }

    /// Progress window around `checkpoint` used for the pointer test: from
    /// the previous checkpoint's start to the next one's end, within the
    /// same stroke. Keeps closed shapes from matching their far side.
    fn window(&self, checkpoint: &Checkpoint) -> (f64, f64) {
        let siblings = self.plan.for_stroke(checkpoint.stroke_index);
        let Some(first) = siblings.first() else {
            return (checkpoint.start_progress, checkpoint.end_progress);
        };
        let local = checkpoint.global_index - first.global_index;
        let lo = match local.checked_sub(1).and_then(|i| siblings.get(i)) {
            Some(prev) => prev.start_progress,
            None => 0.0,
        };
        let hi = siblings.get(local + 1).map_or(1.0, |next| next.end_progress);
        (lo, hi)
    }

    /// Step 1: credit the pointer checkpoint if the sample reached it.
    fn advance(&mut self, p: Point) {
        let Some(checkpoint) = self.plan.get(self.pointer) else {
            return;
        };
        let Some(stroke) = self.glyph.strokes.get(checkpoint.stroke_index) else {
            return;
        };
        let radius = if checkpoint.starts_stroke() {
            self.tolerances.start_tolerance
        } else {
            self.tolerances.corridor_radius
        };
        let (lo, hi) = self.window(checkpoint);
        let hit = project_onto_range(p, &stroke.polyline, lo, hi);
        if hit.distance <= radius
            && hit.progress >= checkpoint.start_progress - numeric::PROGRESS_EPSILON
        {
            let status = &mut self.statuses[self.pointer];
            status.completed = true;
            status.has_contact = true;
            tracing::trace!("Checkpoint {} completed", self.pointer);
            self.pointer += 1;
        }
    }

    /// Step 2: the checkpoint nearest to the sample over the whole plan.
    /// Returns its index when it lies within the corridor but beyond the
    /// pointer and lookahead.
    ///
    /// Where strokes cross or join, a later stroke can be a hair closer
    /// than the one being traced. Such contact is forgiven when a tolerated
    /// checkpoint within the corridor meets the nearer one within a gap
    /// length.
    fn check_order(&mut self, p: Point) -> Option<usize> {
        let corridor = self.tolerances.corridor_radius;
        let allowed_end = self
            .pointer
            .saturating_add(self.tolerances.out_of_order_lookahead)
            .saturating_add(1)
            .min(self.plan.len());

        let nearest = nearest_checkpoint(p, self.glyph, self.plan)
            .filter(|hit| hit.projection.distance <= corridor)?;
        if nearest.global_index < allowed_end {
            self.statuses[nearest.global_index].has_contact = true;
            return None;
        }
        if let Some(index) = self.junction_partner(p, nearest.global_index, allowed_end) {
            tracing::trace!(
                "Checkpoint {} is nearest but meets tolerated checkpoint {}",
                nearest.global_index,
                index
            );
            self.statuses[index].has_contact = true;
            return None;
        }
        self.statuses[nearest.global_index].has_contact = true;
        Some(nearest.global_index)
    }

    /// A tolerated checkpoint within the corridor of `p` whose stretch
    /// comes within a gap length of checkpoint `ahead`.
    fn junction_partner(&self, p: Point, ahead: usize, allowed_end: usize) -> Option<usize> {
        let ahead = self.plan.get(ahead)?;
        let reach = self.plan.gap_length.max(0.0) + numeric::DISTANCE_TIE_EPSILON;
        self.plan.checkpoints()[..allowed_end]
            .iter()
            .filter(|cp| {
                project_onto_checkpoint(p, self.glyph, cp).distance <= self.tolerances.corridor_radius
            })
            .find(|cp| checkpoint_separation(self.glyph, cp, ahead) <= reach)
            .map(|cp| cp.global_index)
    }
}

/// Validate `drawing` against a planned glyph.
///
/// An empty plan (no traceable strokes) is complete without looking at the
/// drawing.
pub fn evaluate(
    drawing: &Drawing,
    glyph: &NormalizedGlyph,
    plan: &CheckpointPlan,
    tolerances: &Tolerances,
) -> EvaluationResult {
    let total = plan.len();
    if total == 0 {
        return EvaluationResult::trivially_complete();
    }

    let samples = drawing.timeline(tolerances.resample_step());
    let mut pass = CheckpointPass::new(glyph, plan, tolerances);
    let mut out_of_order = None;

    for sample in &samples {
        let p = sample.location();
        pass.advance(p);
        if let Some(index) = pass.check_order(p) {
            tracing::debug!(
                "Out of order on '{}': touched checkpoint {} while expecting {}",
                glyph.template_id,
                index,
                pass.pointer
            );
            out_of_order = Some(index);
            break;
        }
    }

    let pointer = pass.pointer;
    let mut result = EvaluationResult {
        checkpoint_statuses: pass.statuses,
        active_checkpoint_index: out_of_order.unwrap_or(pointer),
        total_checkpoint_count: total,
        failure: out_of_order.map(|_| FailureReason::OutOfOrder),
        metrics: TraceMetrics {
            sample_count: samples.len(),
            ..TraceMetrics::default()
        },
    };
    if result.failure.is_some() {
        return result;
    }

    let outside = coverage::outside_report(&samples, glyph, tolerances);
    result.metrics.outside_ratio = outside.ratio();
    result.metrics.longest_outside_run = outside.longest_hard_run;
    if outside.longest_hard_run > tolerances.max_outside_length {
        result.failure = Some(FailureReason::ExcessiveOutside);
        return result;
    }

    if pointer >= total {
        let covered = coverage::coverage_ratio(&samples, glyph, tolerances);
        result.metrics.coverage = Some(covered);
        if covered < tolerances.min_coverage {
            result.failure = Some(FailureReason::InsufficientCoverage);
        } else if outside.ratio() > tolerances.max_outside_ratio {
            result.failure = Some(FailureReason::ExcessiveOutside);
        }
    }

    if let Some(failure) = result.failure {
        tracing::debug!("Attempt at '{}' rejected: {}", glyph.template_id, failure.describe());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::build_checkpoint_plan;
    use crate::difficulty::DifficultyProfile;
    use crate::model::{GlyphMetrics, GlyphTemplate, InkStroke, TemplateStroke};
    use crate::normalize::{RowLayout, normalize};

    /// Metrics and layout at scale 1: practice `y` is `100 - y`.
    fn prepare(strokes: Vec<TemplateStroke>) -> (NormalizedGlyph, Tolerances) {
        let metrics = GlyphMetrics {
            ascender: 100.0,
            ..GlyphMetrics::default()
        };
        let template = GlyphTemplate::new("test", metrics, strokes);
        let glyph = normalize(&template, &RowLayout::new(100.0)).unwrap();
        (glyph, DifficultyProfile::default().tolerances(100.0))
    }

    fn run(glyph: &NormalizedGlyph, tolerances: &Tolerances, drawing: &Drawing) -> EvaluationResult {
        let plan = build_checkpoint_plan(glyph, tolerances.checkpoint_length, tolerances.gap_length);
        evaluate(drawing, glyph, &plan, tolerances)
    }

    /// Two parallel bars, far enough apart that their corridors never meet
    fn equals_sign() -> Vec<TemplateStroke> {
        vec![
            TemplateStroke::new("top", 0, vec![Point::new(10.0, 70.0), Point::new(90.0, 70.0)]),
            TemplateStroke::new("bottom", 1, vec![Point::new(10.0, 30.0), Point::new(90.0, 30.0)]),
        ]
    }

    /// Bar first, then a stem hanging from its middle
    fn letter_t() -> Vec<TemplateStroke> {
        vec![
            TemplateStroke::new("bar", 0, vec![Point::new(10.0, 100.0), Point::new(90.0, 100.0)]),
            TemplateStroke::new("stem", 1, vec![Point::new(50.0, 100.0), Point::new(50.0, 0.0)]),
        ]
    }

    /// A closed loop that ends where it starts
    fn letter_o() -> Vec<TemplateStroke> {
        vec![TemplateStroke::new(
            "loop",
            0,
            vec![
                Point::new(50.0, 90.0),
                Point::new(10.0, 50.0),
                Point::new(50.0, 10.0),
                Point::new(90.0, 50.0),
                Point::new(50.0, 90.0),
            ],
        )]
    }

    /// One pen-down stroke per template stroke, using the template's own
    /// practice-space points.
    fn faithful(glyph: &NormalizedGlyph) -> Drawing {
        Drawing::new(
            glyph
                .strokes
                .iter()
                .enumerate()
                .map(|(i, s)| InkStroke::from_points(s.polyline.points(), i as f64 * 1000.0, 1.0))
                .collect(),
        )
    }

    fn stroke_points(glyph: &NormalizedGlyph, stroke: usize, from: f64, to: f64, n: usize) -> Vec<Point> {
        let line = &glyph.strokes[stroke].polyline;
        (0..=n)
            .map(|k| line.point_at(from + (to - from) * k as f64 / n as f64))
            .collect()
    }

    #[test]
    fn faithful_tracing_succeeds() {
        for strokes in [equals_sign(), letter_t(), letter_o()] {
            let (glyph, tol) = prepare(strokes);
            let result = run(&glyph, &tol, &faithful(&glyph));
            assert!(result.is_complete(), "{:?}", result.failure);
            assert_eq!(result.failure, None);
            assert_eq!(result.completed_count(), result.total_checkpoint_count);
            assert!(result.total_checkpoint_count > 0);
        }
    }

    #[test]
    fn skipping_the_first_stroke_is_out_of_order() {
        let (glyph, tol) = prepare(equals_sign());
        let second = glyph.strokes[1].polyline.points().to_vec();
        let drawing = Drawing::new(vec![InkStroke::from_points(&second, 0.0, 1.0)]);
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.failure, Some(FailureReason::OutOfOrder));
        let plan = build_checkpoint_plan(&glyph, tol.checkpoint_length, tol.gap_length);
        assert_eq!(result.active_checkpoint_index, plan.for_stroke(1)[0].global_index);
    }

    #[test]
    fn skipping_ahead_within_a_stroke_is_out_of_order() {
        let (glyph, tol) = prepare(equals_sign());
        let head = stroke_points(&glyph, 0, 0.0, 0.2, 8);
        let tail = stroke_points(&glyph, 0, 0.85, 1.0, 6);
        let drawing = Drawing::new(vec![
            InkStroke::from_points(&head, 0.0, 1.0),
            InkStroke::from_points(&tail, 100.0, 1.0),
        ]);
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.failure, Some(FailureReason::OutOfOrder));
        let plan = build_checkpoint_plan(&glyph, tol.checkpoint_length, tol.gap_length);
        let touched = plan.get(result.active_checkpoint_index).unwrap();
        assert_eq!(touched.stroke_index, 0);
        assert!(touched.start_progress > 0.5);
    }

    #[test]
    fn skipping_ahead_in_one_continuous_stroke_is_out_of_order() {
        // A corner-cutting chord across an L: the pen never lifts
        let (glyph, tol) = prepare(vec![TemplateStroke::new(
            "ell",
            0,
            vec![Point::new(10.0, 90.0), Point::new(10.0, 10.0), Point::new(90.0, 10.0)],
        )]);
        let drawing = Drawing::new(vec![InkStroke::from_points(
            &[Point::new(10.0, 10.0), Point::new(10.0, 30.0), Point::new(70.0, 90.0)],
            0.0,
            1.0,
        )]);
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.failure, Some(FailureReason::OutOfOrder));
    }

    #[test]
    fn empty_template_is_trivially_complete() {
        let (glyph, tol) = prepare(Vec::new());
        let result = run(&glyph, &tol, &Drawing::default());
        assert_eq!(result.total_checkpoint_count, 0);
        assert!(result.is_complete());
        assert_eq!(result.failure, None);

        let (dots, tol) = prepare(vec![TemplateStroke::new("dot", 0, vec![Point::new(5.0, 5.0)])]);
        let scribble = Drawing::new(vec![InkStroke::from_points(&[Point::ZERO, Point::new(50.0, 50.0)], 0.0, 1.0)]);
        let result = run(&dots, &tol, &scribble);
        assert_eq!(result.total_checkpoint_count, 0);
        assert!(result.is_complete());
    }

    #[test]
    fn no_ink_is_pending_not_failed() {
        let (glyph, tol) = prepare(letter_t());
        let result = run(&glyph, &tol, &Drawing::default());
        assert_eq!(result.failure, None);
        assert_eq!(result.active_checkpoint_index, 0);
        assert!(!result.is_complete());
    }

    #[test]
    fn retracing_never_regresses() {
        let (glyph, tol) = prepare(equals_sign());
        let forward = stroke_points(&glyph, 0, 0.0, 1.0, 20);
        let mut drawing = Drawing::new(vec![InkStroke::from_points(&forward, 0.0, 1.0)]);
        let before = run(&glyph, &tol, &drawing);
        assert_eq!(before.failure, None);

        // Back over the whole first bar, then a second pass forward
        let back = stroke_points(&glyph, 0, 1.0, 0.0, 20);
        drawing.push_stroke(InkStroke::from_points(&back, 100.0, 1.0));
        drawing.push_stroke(InkStroke::from_points(&forward, 200.0, 1.0));
        let after = run(&glyph, &tol, &drawing);
        assert_eq!(after.failure, None);
        assert!(after.active_checkpoint_index >= before.active_checkpoint_index);
        assert_eq!(after.completed_count(), before.completed_count());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let (glyph, tol) = prepare(letter_t());
        let partial = stroke_points(&glyph, 0, 0.0, 0.6, 7);
        let drawing = Drawing::new(vec![InkStroke::from_points(&partial, 0.0, 1.0)]);
        let a = run(&glyph, &tol, &drawing);
        let b = run(&glyph, &tol, &drawing);
        assert_eq!(a, b);
        assert!(a.active_checkpoint_index > 0);
    }

    #[test]
    fn crossing_strokes_do_not_trip_order_check() {
        // Slightly off the bar, right next to where the stem will start
        let (glyph, tol) = prepare(letter_t());
        let bar = vec![
            Point::new(10.0, 0.1),
            Point::new(49.5, 0.1),
            Point::new(50.5, 0.1),
            Point::new(90.0, 0.1),
        ];
        let drawing = Drawing::new(vec![InkStroke::from_points(&bar, 0.0, 1.0)]);
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.failure, None);
        let plan = build_checkpoint_plan(&glyph, tol.checkpoint_length, tol.gap_length);
        assert_eq!(result.active_checkpoint_index, plan.for_stroke(1)[0].global_index);
    }

    #[test]
    fn close_parallel_bars_still_enforce_order() {
        // Corridors overlap: the bottom bar is 8 units under the top one
        let (glyph, tol) = prepare(vec![
            TemplateStroke::new("top", 0, vec![Point::new(10.0, 54.0), Point::new(90.0, 54.0)]),
            TemplateStroke::new("bottom", 1, vec![Point::new(10.0, 46.0), Point::new(90.0, 46.0)]),
        ]);
        let plan = build_checkpoint_plan(&glyph, tol.checkpoint_length, tol.gap_length);

        let bottom_only = Drawing::new(vec![InkStroke::from_points(
            &[Point::new(10.0, 54.0), Point::new(90.0, 54.0)],
            0.0,
            1.0,
        )]);
        let result = run(&glyph, &tol, &bottom_only);
        assert_eq!(result.failure, Some(FailureReason::OutOfOrder));
        assert_eq!(result.active_checkpoint_index, plan.for_stroke(1)[0].global_index);

        let result = run(&glyph, &tol, &faithful(&glyph));
        assert!(result.is_complete(), "{:?}", result.failure);
    }

    #[test]
    fn pinned_start_sets_the_tracing_direction() {
        let mut bar = TemplateStroke::new("bar", 0, vec![Point::new(10.0, 50.0), Point::new(90.0, 50.0)]);
        bar.start = Some(Point::new(90.0, 50.0));
        bar.end = Some(Point::new(10.0, 50.0));
        let (glyph, tol) = prepare(vec![bar]);

        let right_to_left = Drawing::new(vec![InkStroke::from_points(
            &[Point::new(90.0, 50.0), Point::new(10.0, 50.0)],
            0.0,
            1.0,
        )]);
        let result = run(&glyph, &tol, &right_to_left);
        assert!(result.is_complete(), "{:?}", result.failure);

        let left_to_right = Drawing::new(vec![InkStroke::from_points(
            &[Point::new(10.0, 50.0), Point::new(90.0, 50.0)],
            0.0,
            1.0,
        )]);
        let result = run(&glyph, &tol, &left_to_right);
        assert_eq!(result.failure, Some(FailureReason::OutOfOrder));
    }

    #[test]
    fn loop_traced_from_its_pinned_start_completes() {
        let mut strokes = letter_o();
        strokes[0].start = Some(Point::new(10.0, 50.0));
        let (glyph, tol) = prepare(strokes);
        // Counter-clockwise from the left edge, all the way round
        let ink = [
            Point::new(10.0, 50.0),
            Point::new(50.0, 90.0),
            Point::new(90.0, 50.0),
            Point::new(50.0, 10.0),
            Point::new(10.0, 50.0),
        ];
        let drawing = Drawing::new(vec![InkStroke::from_points(&ink, 0.0, 1.0)]);
        let result = run(&glyph, &tol, &drawing);
        assert!(result.is_complete(), "{:?}", result.failure);
    }

    #[test]
    fn lookahead_tolerates_a_small_skip() {
        let (glyph, mut tol) = prepare(equals_sign());
        tol.corridor_radius = 2.0;
        tol.start_tolerance = 2.0;
        tol.checkpoint_length = 5.0;
        tol.gap_length = 10.0;
        // Checkpoints start every 15 units; tap the first, then the fourth
        let drawing = Drawing::new(vec![
            InkStroke::from_points(&[Point::new(11.0, 30.0)], 0.0, 1.0),
            InkStroke::from_points(&[Point::new(56.0, 30.0)], 1.0, 1.0),
        ]);

        let strict = run(&glyph, &tol, &drawing);
        assert_eq!(strict.failure, Some(FailureReason::OutOfOrder));
        assert_eq!(strict.active_checkpoint_index, 3);

        tol.out_of_order_lookahead = 2;
        let relaxed = run(&glyph, &tol, &drawing);
        assert_eq!(relaxed.failure, None);
        assert_eq!(relaxed.active_checkpoint_index, 1);
        assert!(relaxed.checkpoint_statuses[3].has_contact);
        assert!(!relaxed.checkpoint_statuses[3].completed);
    }

    #[test]
    fn stroke_start_uses_start_tolerance() {
        let (glyph, mut tol) = prepare(equals_sign());
        // Begins 5 units to the left of the top bar
        let drawing = Drawing::new(vec![InkStroke::from_points(&[Point::new(5.0, 30.0)], 0.0, 1.0)]);

        tol.start_tolerance = 4.0;
        assert_eq!(run(&glyph, &tol, &drawing).active_checkpoint_index, 0);

        tol.start_tolerance = 6.0;
        assert_eq!(run(&glyph, &tol, &drawing).active_checkpoint_index, 1);
    }

    #[test]
    fn dabbing_checkpoints_is_insufficient_coverage() {
        let (glyph, mut tol) = prepare(vec![TemplateStroke::new(
            "bar",
            0,
            vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
        )]);
        tol.corridor_radius = 3.0;
        tol.start_tolerance = 3.0;
        tol.checkpoint_length = 1.0;
        tol.gap_length = 30.0;
        // Checkpoints start at 0, 31, 62 and 93
        let drawing = Drawing::new(
            [0.5, 31.5, 62.5, 93.5]
                .iter()
                .enumerate()
                .map(|(i, &x)| InkStroke::from_points(&[Point::new(x, 50.0)], i as f64, 1.0))
                .collect(),
        );
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.completed_count(), 4);
        assert_eq!(result.failure, Some(FailureReason::InsufficientCoverage));
        assert!(result.metrics.coverage.unwrap() < tol.min_coverage);
    }

    #[test]
    fn long_excursion_is_excessive_outside_even_mid_attempt() {
        let (glyph, tol) = prepare(equals_sign());
        let head = stroke_points(&glyph, 0, 0.0, 0.5, 10);
        let drawing = Drawing::new(vec![
            InkStroke::from_points(&head, 0.0, 1.0),
            // Well below the bottom bar, longer than the allowed run
            InkStroke::from_points(&[Point::new(0.0, 150.0), Point::new(80.0, 150.0)], 100.0, 1.0),
        ]);
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.failure, Some(FailureReason::ExcessiveOutside));
        assert!(result.metrics.longest_outside_run > tol.max_outside_length);
        assert!(!result.is_complete());
    }

    #[test]
    fn sloppy_but_ordered_ink_is_excessive_outside_at_the_end() {
        let (glyph, tol) = prepare(vec![TemplateStroke::new(
            "bar",
            0,
            vec![Point::new(0.0, 50.0), Point::new(100.0, 50.0)],
        )]);
        let mut drawing = faithful(&glyph);
        // A parallel line outside the corridor but inside the hard limit
        drawing.push_stroke(InkStroke::from_points(
            &[Point::new(0.0, 65.0), Point::new(100.0, 65.0)],
            100.0,
            1.0,
        ));
        let result = run(&glyph, &tol, &drawing);
        assert_eq!(result.metrics.coverage, Some(1.0));
        assert_eq!(result.failure, Some(FailureReason::ExcessiveOutside));
        assert!(result.metrics.outside_ratio > tol.max_outside_ratio);
    }
}
