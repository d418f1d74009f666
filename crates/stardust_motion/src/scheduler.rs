//! The polymorphic transition scheduler.
//!
//! Components are written against [`TransitionScheduler`] and never learn
//! which implementation is behind it. [`TweenEngine`] interpolates every
//! frame; [`SnapScheduler`] applies end states on its next tick, which is
//! the degraded path for environments without an animation engine. The
//! choice happens once, at stage construction.

use crate::node::{NodeArena, NodeId, Prop, PropPatch};
use crate::timeline::Timeline;
use crate::tween::{MotionEvent, MotionId, TweenSpec};

/// Capability to drive timed property transitions over stage nodes.
pub trait TransitionScheduler {
    /// Applies a patch immediately, outside any transition.
    fn set(&mut self, arena: &mut NodeArena, node: NodeId, patch: &PropPatch) {
        arena.apply(node, patch);
    }

    /// Schedules one transition. Returns its identity for completion
    /// tracking.
    fn animate(&mut self, spec: TweenSpec) -> MotionId;

    /// Schedules a composed timeline. Returns ids in entry order; the last
    /// id belongs to the entry that finishes last only if the timeline says
    /// so, so callers that need "profile finished" should track the id of
    /// the entry they know ends the profile.
    fn schedule(&mut self, timeline: Timeline) -> Vec<MotionId> {
        timeline
            .flatten()
            .into_iter()
            .map(|spec| self.animate(spec))
            .collect()
    }

    /// Cancels every scheduled transition for one node. No events are
    /// emitted for cancelled transitions.
    fn cancel_node(&mut self, node: NodeId);

    /// Cancels everything. Teardown path.
    fn cancel_all(&mut self);

    /// Advances time and reports lifecycle transitions.
    fn tick(&mut self, dt: f32, arena: &mut NodeArena) -> Vec<MotionEvent>;

    /// Number of transitions currently scheduled or running.
    fn active_count(&self) -> usize;
}

/// One running transition inside [`TweenEngine`].
struct ActiveTween {
    id: MotionId,
    spec: TweenSpec,
    elapsed: f32,
    started: bool,
    /// Per-channel `(prop, from, to)`, resolved when the delay elapses.
    goals: Vec<(Prop, f32, f32)>,
}

/// The full interpolating scheduler.
pub struct TweenEngine {
    active: Vec<ActiveTween>,
    next_id: u64,
}

impl TweenEngine {
    /// Creates an engine with no scheduled transitions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            next_id: 0,
        }
    }

    fn fresh_id(&mut self) -> MotionId {
        self.next_id += 1;
        MotionId(self.next_id)
    }

    /// Resolves goals against the node's current values and applies the
    /// start-time side effects (visibility, class).
    fn start_tween(tween: &mut ActiveTween, arena: &mut NodeArena) {
        tween.started = true;
        let Some(node) = arena.get_mut(tween.spec.node) else {
            return;
        };
        if let Some(visible) = tween.spec.patch.visible {
            node.visible = visible;
        }
        if let Some(class) = &tween.spec.patch.class {
            node.class.clone_from(class);
        }
        tween.goals = tween
            .spec
            .patch
            .goals()
            .into_iter()
            .map(|(prop, goal)| {
                let from = prop.read(&node.props);
                (prop, from, goal.resolve(from))
            })
            .collect();
    }

    /// Writes the eased value of every channel. `progress` is already
    /// direction-adjusted for yoyo cycles.
    fn apply_progress(tween: &ActiveTween, arena: &mut NodeArena, progress: f32) {
        let Some(node) = arena.get_mut(tween.spec.node) else {
            return;
        };
        let eased = tween.spec.easing.apply(progress);
        for &(prop, from, to) in &tween.goals {
            prop.write(&mut node.props, from + (to - from) * eased);
        }
    }
}

impl Default for TweenEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionScheduler for TweenEngine {
    fn animate(&mut self, spec: TweenSpec) -> MotionId {
        let id = self.fresh_id();
        self.active.push(ActiveTween {
            id,
            spec,
            elapsed: 0.0,
            started: false,
            goals: Vec::new(),
        });
        id
    }

    fn cancel_node(&mut self, node: NodeId) {
        self.active.retain(|t| t.spec.node != node);
    }

    fn cancel_all(&mut self) {
        tracing::debug!(cancelled = self.active.len(), "cancelling all transitions");
        self.active.clear();
    }

    fn tick(&mut self, dt: f32, arena: &mut NodeArena) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        let mut retired = Vec::new();

        for tween in &mut self.active {
            tween.elapsed += dt;
            if tween.elapsed < tween.spec.delay {
                continue;
            }
            if !tween.started {
                Self::start_tween(tween, arena);
                events.push(MotionEvent::Started(tween.id));
            }

            let t = tween.elapsed - tween.spec.delay;
            let duration = tween.spec.duration;

            if duration <= f32::EPSILON {
                // Instant transition: jump to the end state.
                Self::apply_progress(tween, arena, 1.0);
                retired.push(tween.id);
                continue;
            }

            let local = t / duration;
            let cycle = local.floor();
            let mut frac = local - cycle;

            if let Some(cycles) = tween.spec.cycle_count() {
                if local >= cycles as f32 {
                    // A yoyo with an even cycle count lands back at the
                    // start value (press feedback relies on this).
                    let settled = if tween.spec.yoyo && cycles % 2 == 0 {
                        0.0
                    } else {
                        1.0
                    };
                    Self::apply_progress(tween, arena, settled);
                    retired.push(tween.id);
                    continue;
                }
            }

            if tween.spec.yoyo && (cycle as u64) % 2 == 1 {
                frac = 1.0 - frac;
            }
            Self::apply_progress(tween, arena, frac);
        }

        self.active.retain(|t| !retired.contains(&t.id));
        events.extend(retired.into_iter().map(MotionEvent::Completed));
        events
    }

    fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// The degraded scheduler: every transition applies its end state on the
/// next tick and completes immediately. No easing, no duration, no repeats.
pub struct SnapScheduler {
    queued: Vec<(MotionId, TweenSpec)>,
    next_id: u64,
}

impl SnapScheduler {
    /// Creates an empty snap scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queued: Vec::new(),
            next_id: 0,
        }
    }
}

impl Default for SnapScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionScheduler for SnapScheduler {
    fn animate(&mut self, spec: TweenSpec) -> MotionId {
        self.next_id += 1;
        let id = MotionId(self.next_id);
        self.queued.push((id, spec));
        id
    }

    fn cancel_node(&mut self, node: NodeId) {
        self.queued.retain(|(_, spec)| spec.node != node);
    }

    fn cancel_all(&mut self) {
        self.queued.clear();
    }

    fn tick(&mut self, _dt: f32, arena: &mut NodeArena) -> Vec<MotionEvent> {
        let mut events = Vec::with_capacity(self.queued.len() * 2);
        for (id, spec) in self.queued.drain(..) {
            arena.apply(spec.node, &spec.patch);
            events.push(MotionEvent::Started(id));
            events.push(MotionEvent::Completed(id));
        }
        events
    }

    fn active_count(&self) -> usize {
        self.queued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::timeline::Position;

    fn opacity_of(arena: &NodeArena, id: NodeId) -> f32 {
        arena.get(id).unwrap().props.opacity
    }

    #[test]
    fn test_tween_interpolates_and_completes() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("card");
        arena.apply(node, &PropPatch::new().opacity(0.0));

        let mut engine = TweenEngine::new();
        let id = engine.animate(
            TweenSpec::to(node, PropPatch::new().opacity(1.0), 1.0).easing(Easing::Linear),
        );

        let events = engine.tick(0.5, &mut arena);
        assert_eq!(events, vec![MotionEvent::Started(id)]);
        assert!((opacity_of(&arena, node) - 0.5).abs() < 1e-4);

        let events = engine.tick(0.6, &mut arena);
        assert_eq!(events, vec![MotionEvent::Completed(id)]);
        assert!((opacity_of(&arena, node) - 1.0).abs() < 1e-6);
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn test_delay_defers_start() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("late");
        let mut engine = TweenEngine::new();
        engine.animate(TweenSpec::to(node, PropPatch::new().opacity(0.0), 0.5).delay(1.0));

        assert!(engine.tick(0.9, &mut arena).is_empty());
        assert!((opacity_of(&arena, node) - 1.0).abs() < 1e-6);

        let events = engine.tick(0.2, &mut arena);
        assert!(matches!(events[0], MotionEvent::Started(_)));
    }

    #[test]
    fn test_relative_goal_resolves_at_start() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("float");
        arena.apply(node, &PropPatch::new().x(10.0));

        let mut engine = TweenEngine::new();
        engine.animate(TweenSpec::to(node, PropPatch::new().x_by(4.0), 1.0).easing(Easing::Linear));
        // Goal must be 14, resolved from the value when the tween started.
        engine.tick(1.0, &mut arena);
        assert!((arena.get(node).unwrap().props.x - 14.0).abs() < 1e-4);
    }

    #[test]
    fn test_yoyo_returns_to_start() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("press");
        let mut engine = TweenEngine::new();
        // The press-feedback shape: scale to 0.98, back up, one repeat.
        engine.animate(
            TweenSpec::to(node, PropPatch::new().scale(0.98), 0.1)
                .easing(Easing::Linear)
                .yoyo()
                .repeat(1),
        );

        engine.tick(0.1, &mut arena);
        assert!((arena.get(node).unwrap().props.scale - 0.98).abs() < 1e-3);
        let events = engine.tick(0.15, &mut arena);
        assert!(events.iter().any(|e| matches!(e, MotionEvent::Completed(_))));
        assert!((arena.get(node).unwrap().props.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_endless_tween_never_completes() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("loop");
        let mut engine = TweenEngine::new();
        engine.animate(
            TweenSpec::to(node, PropPatch::new().y_by(4.0), 3.5)
                .yoyo()
                .repeat_forever(),
        );

        for _ in 0..100 {
            let events = engine.tick(1.0, &mut arena);
            assert!(!events.iter().any(|e| matches!(e, MotionEvent::Completed(_))));
        }
        assert_eq!(engine.active_count(), 1);
    }

    #[test]
    fn test_cancel_node_emits_nothing() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("doomed");
        let mut engine = TweenEngine::new();
        engine.animate(TweenSpec::to(node, PropPatch::new().opacity(0.0), 1.0));
        engine.tick(0.1, &mut arena);

        engine.cancel_node(node);
        assert_eq!(engine.active_count(), 0);
        assert!(engine.tick(2.0, &mut arena).is_empty());
    }

    #[test]
    fn test_timeline_schedule_orders_starts() {
        let mut arena = NodeArena::new();
        let a = arena.alloc("a");
        let b = arena.alloc("b");

        let mut tl = Timeline::new();
        tl.push(TweenSpec::to(a, PropPatch::new().opacity(0.0), 1.0), Position::Sequential);
        tl.push(TweenSpec::to(b, PropPatch::new().opacity(0.0), 1.0), Position::Sequential);

        let mut engine = TweenEngine::new();
        let ids = engine.schedule(tl);
        assert_eq!(ids.len(), 2);

        let events = engine.tick(0.5, &mut arena);
        assert_eq!(events, vec![MotionEvent::Started(ids[0])]);
        let events = engine.tick(0.6, &mut arena);
        assert!(events.contains(&MotionEvent::Started(ids[1])));
        assert!(events.contains(&MotionEvent::Completed(ids[0])));
    }

    #[test]
    fn test_snap_scheduler_completes_next_tick() {
        let mut arena = NodeArena::new();
        let node = arena.alloc("fallback");
        arena.apply(node, &PropPatch::new().opacity(0.0));

        let mut snap = SnapScheduler::new();
        let id = snap.animate(TweenSpec::to(node, PropPatch::new().opacity(1.0), 2.5));

        let events = snap.tick(0.016, &mut arena);
        assert_eq!(
            events,
            vec![MotionEvent::Started(id), MotionEvent::Completed(id)]
        );
        assert!((opacity_of(&arena, node) - 1.0).abs() < 1e-6);
        assert_eq!(snap.active_count(), 0);
    }

    #[test]
    fn test_visibility_applied_at_start() {
        let mut arena = NodeArena::new();
        let node = arena.alloc_hidden("particle");
        let mut engine = TweenEngine::new();
        engine.animate(TweenSpec::to(
            node,
            PropPatch::new().visible(true).opacity(0.7),
            0.3,
        ));
        engine.tick(0.016, &mut arena);
        assert!(arena.get(node).unwrap().visible);
    }
}
