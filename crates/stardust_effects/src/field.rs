//! The particle field.
//!
//! Owns the slot pool, the anchor cloud, the emitter bank and the queue of
//! staggered emission requests. Within one tick, slots are acquired in pool
//! index order; across emitters, requests interleave by due time.
//!
//! Slot lifecycle: `free -> fading-in -> drifting -> fading-out -> free`.
//! The field releases a slot when the final tween of its profile reports
//! completion; there is no cancellation path for a single particle, only
//! the global sweep used on page-hidden and teardown.

use std::collections::HashMap;

use stardust_core::{
    DensityTier, FieldConfig, RandomSource, SlotId, SlotPool, StageConfig, StageEvent,
    StageEventQueue,
};
use stardust_motion::easing::Easing;
use stardust_motion::node::{NodeArena, NodeId, PropPatch};
use stardust_motion::scheduler::TransitionScheduler;
use stardust_motion::tween::{MotionEvent, MotionId, TweenSpec};

use crate::emitter::{EmissionKind, EmitterBank, PendingEmission};
use crate::mask::{LabelLayout, PointCloud, TextMaskSampler};
use crate::profile;
use crate::variant::ParticleVariant;

/// The hero label the field anchors to, when the page has one.
#[derive(Debug, Clone)]
pub struct LabelTarget {
    /// Text rendered into the mask raster.
    pub text: String,
    /// Measured layout of the label element.
    pub layout: LabelLayout,
    /// Node handle for press feedback, if the element is animatable.
    pub node: Option<NodeId>,
}

/// One acquired particle.
#[derive(Debug, Clone, Copy)]
pub struct ParticleSlot {
    /// The pre-allocated node this slot renders through.
    pub node: NodeId,
    /// Visual variant rolled at acquisition.
    pub variant: ParticleVariant,
    /// Virtual time of acquisition.
    pub acquired_at: f64,
}

/// Counters the stage exposes for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Pool capacity for the active tier.
    pub capacity: usize,
    /// Currently acquired slots.
    pub active: usize,
    /// Total successful acquisitions.
    pub emitted: u64,
    /// Requests dropped on capacity exhaustion.
    pub dropped: u64,
    /// Slots returned to the pool.
    pub released: u64,
}

/// The particle engine.
pub struct ParticleField {
    config: FieldConfig,
    sampler: TextMaskSampler,
    tier: DensityTier,
    viewport: (f32, f32),
    /// Pre-allocated nodes, one per pool slot, indexed by slot index.
    nodes: Vec<NodeId>,
    pool: SlotPool<ParticleSlot>,
    emitters: EmitterBank,
    pending: Vec<PendingEmission>,
    label: Option<LabelTarget>,
    cloud: Option<PointCloud>,
    /// Final profile tween of each active slot.
    in_flight: HashMap<MotionId, SlotId>,
    emitted: u64,
    dropped: u64,
    released: u64,
}

impl ParticleField {
    /// Builds the field for a tier, pre-allocating every particle node.
    ///
    /// Returns `None` when the tier disables the field entirely; callers
    /// treat that as "no field on this device", not a failure.
    #[must_use]
    pub fn new(
        config: &StageConfig,
        tier: DensityTier,
        viewport: (f32, f32),
        label: Option<LabelTarget>,
        arena: &mut NodeArena,
        now: f64,
    ) -> Option<Self> {
        let capacity = config.field.capacity(tier)?;
        if label.is_none() {
            tracing::warn!("hero label absent; anchor-seeded emission disabled");
        }
        let nodes: Vec<NodeId> = (0..capacity)
            .map(|i| arena.alloc_hidden(format!("particle-{i}")))
            .collect();
        tracing::info!(capacity, ?tier, "particle field ready");
        Some(Self {
            config: config.field.clone(),
            sampler: TextMaskSampler::new(config.mask.clone()),
            tier,
            viewport,
            nodes,
            pool: SlotPool::new(capacity),
            emitters: EmitterBank::new(&config.field, now),
            pending: Vec::new(),
            label,
            cloud: None,
            in_flight: HashMap::new(),
            emitted: 0,
            dropped: 0,
            released: 0,
        })
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> FieldStats {
        FieldStats {
            capacity: self.pool.capacity(),
            active: self.pool.active_count(),
            emitted: self.emitted,
            dropped: self.dropped,
            released: self.released,
        }
    }

    /// The current anchor cloud, if one has been built.
    #[must_use]
    pub fn cloud(&self) -> Option<&PointCloud> {
        self.cloud.as_ref()
    }

    /// Fonts finished loading: the label finally has real metrics.
    pub fn fonts_ready(&mut self, now: f64, queue: &mut StageEventQueue) {
        self.rebuild_mask(now, queue);
    }

    /// Applies a new viewport and label layout, then rebuilds the mask.
    /// Called by the governor once a resize storm settles.
    pub fn viewport_changed(
        &mut self,
        viewport: (f32, f32),
        layout: Option<LabelLayout>,
        now: f64,
        queue: &mut StageEventQueue,
    ) {
        self.viewport = viewport;
        if let (Some(label), Some(layout)) = (self.label.as_mut(), layout) {
            label.layout = layout;
        }
        self.rebuild_mask(now, queue);
    }

    /// Discards the current cloud and samples a fresh one.
    fn rebuild_mask(&mut self, now: f64, queue: &mut StageEventQueue) {
        let Some(label) = &self.label else {
            tracing::debug!("mask rebuild skipped: no label");
            return;
        };
        let cloud = self.sampler.rebuild(&label.text, &label.layout, self.tier);
        self.emitters.mask_ready(now, self.config.first_burst_delay);
        queue.push(StageEvent::MaskRebuilt {
            points: cloud.len(),
        });
        self.cloud = Some(cloud);
    }

    /// Pauses emission. Intervals keep their periods but report nothing.
    pub fn pause(&mut self) {
        self.emitters.pause();
        self.pending.clear();
    }

    /// Resumes emission from a clean anchor.
    pub fn resume(&mut self, now: f64) {
        self.emitters.resume(now);
    }

    /// One field tick: poll emitters, drain due requests, start profiles.
    pub fn tick(
        &mut self,
        now: f64,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
        rng: &mut dyn RandomSource,
    ) {
        let label_box = self.label.as_ref().map(|l| l.layout);
        let fresh = self.emitters.tick(
            now,
            &self.config,
            self.cloud.as_ref(),
            label_box.as_ref(),
            rng,
        );
        self.pending.extend(fresh);

        let mut due = Vec::new();
        self.pending.retain(|p| {
            if p.due <= now {
                due.push(*p);
                false
            } else {
                true
            }
        });
        for request in due {
            self.spawn(request.kind, now, arena, scheduler, rng);
        }
    }

    /// Pointer press: feedback tween on the label plus a dense burst.
    pub fn pointer_pressed(
        &mut self,
        x: f32,
        y: f32,
        now: f64,
        scheduler: &mut dyn TransitionScheduler,
        rng: &mut dyn RandomSource,
    ) {
        if let Some(node) = self.label.as_ref().and_then(|l| l.node) {
            scheduler.animate(
                TweenSpec::to(node, PropPatch::new().scale(0.98), 0.1)
                    .easing(Easing::PowerInOut(2))
                    .yoyo()
                    .repeat(1),
            );
        }
        self.pending
            .extend(EmitterBank::pointer_burst(&self.config, now, x, y, rng));
    }

    /// Routes completion events back to slot releases.
    pub fn absorb(&mut self, events: &[MotionEvent], arena: &mut NodeArena) {
        for event in events {
            let MotionEvent::Completed(id) = event else {
                continue;
            };
            if let Some(slot_id) = self.in_flight.remove(id) {
                if let Some(slot) = self.pool.release(slot_id) {
                    arena.apply(slot.node, &PropPatch::new().visible(false));
                    self.released += 1;
                }
            }
        }
    }

    /// Cancels every in-flight profile and returns every slot to the pool.
    /// The release guarantee on cancellation is this sweep, not the
    /// scheduler.
    pub fn sweep(&mut self, arena: &mut NodeArena, scheduler: &mut dyn TransitionScheduler) {
        for (_, slot) in self.pool.iter() {
            scheduler.cancel_node(slot.node);
            arena.apply(slot.node, &PropPatch::new().visible(false));
        }
        self.released += self.pool.active_count() as u64;
        self.pool.clear();
        self.in_flight.clear();
        self.pending.clear();
    }

    /// Acquires a slot for one request and starts its motion profile.
    /// Capacity exhaustion drops the request silently.
    fn spawn(
        &mut self,
        kind: EmissionKind,
        now: f64,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
        rng: &mut dyn RandomSource,
    ) {
        let (x, y, variant) = match kind {
            EmissionKind::Ambient { at } => {
                let (x, y) = at.unwrap_or_else(|| {
                    (
                        rng.range(0.0, self.viewport.0),
                        rng.range(0.0, self.viewport.1),
                    )
                });
                (x, y, ParticleVariant::roll_ambient(rng))
            }
            EmissionKind::Anchor { x, y } => (x, y, ParticleVariant::roll_anchor(rng)),
        };

        // Two-phase acquire: the node is keyed by the slot index the pool
        // hands back.
        let placeholder = ParticleSlot {
            node: self.nodes[0],
            variant,
            acquired_at: now,
        };
        let Some(slot_id) = self.pool.acquire(placeholder) else {
            self.dropped += 1;
            return;
        };
        let node = self.nodes[slot_id.index()];
        if let Some(slot) = self.pool.get_mut(slot_id) {
            slot.node = node;
        }
        self.emitted += 1;

        scheduler.set(
            arena,
            node,
            &PropPatch::new()
                .x(x)
                .y(y)
                .opacity(0.0)
                .scale(0.0)
                .visible(true)
                .class(variant.class_name()),
        );

        let timeline = match kind {
            EmissionKind::Ambient { .. } => profile::ambient(node, x, y, rng),
            EmissionKind::Anchor { .. } => profile::anchor(node, x, y, rng),
        };
        let ids = scheduler.schedule(timeline);
        if let Some(finish) = ids.last() {
            self.in_flight.insert(*finish, slot_id);
        }
    }
}
