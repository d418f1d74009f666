//! The visibility/resize governor.
//!
//! Nothing animates while unobserved: page-hidden pauses every emitter,
//! cancels in-flight profiles and sweeps the pool. Resize is debounced and
//! ends in a wholesale mask rebuild, because the sampled coordinates are
//! layout-dependent.

use stardust_core::{Debounce, StageConfig, StageEventQueue};
use stardust_motion::node::NodeArena;
use stardust_motion::scheduler::TransitionScheduler;

use crate::field::ParticleField;
use crate::mask::LabelLayout;

/// Governs the field against page visibility and viewport changes.
#[derive(Debug)]
pub struct Governor {
    hidden: bool,
    resize: Debounce,
    pending_viewport: Option<(f32, f32)>,
    pending_layout: Option<LabelLayout>,
}

impl Governor {
    /// Creates a governor with the configured resize quiet window.
    #[must_use]
    pub fn new(config: &StageConfig) -> Self {
        Self {
            hidden: false,
            resize: Debounce::new(config.field.resize_debounce),
            pending_viewport: None,
            pending_layout: None,
        }
    }

    /// Whether the page is currently hidden.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Page visibility flipped.
    ///
    /// Hiding sweeps immediately; release on cancellation is guaranteed by
    /// the sweep, not by the scheduler. Showing resumes from a clean state
    /// with re-anchored intervals.
    pub fn visibility_changed(
        &mut self,
        hidden: bool,
        now: f64,
        field: Option<&mut ParticleField>,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
    ) {
        if self.hidden == hidden {
            return;
        }
        self.hidden = hidden;
        let Some(field) = field else {
            return;
        };
        if hidden {
            tracing::info!("page hidden; pausing emission");
            field.pause();
            field.sweep(arena, scheduler);
        } else {
            tracing::info!("page shown; resuming emission");
            field.resume(now);
        }
    }

    /// Viewport resized. The rebuild waits for the quiet window.
    pub fn viewport_resized(
        &mut self,
        width: f32,
        height: f32,
        layout: Option<LabelLayout>,
        now: f64,
    ) {
        self.pending_viewport = Some((width, height));
        self.pending_layout = layout;
        self.resize.poke(now);
    }

    /// Polls the debounce and applies a settled resize.
    pub fn tick(
        &mut self,
        now: f64,
        field: Option<&mut ParticleField>,
        queue: &mut StageEventQueue,
    ) {
        if !self.resize.ready(now) {
            return;
        }
        let Some(viewport) = self.pending_viewport.take() else {
            return;
        };
        if let Some(field) = field {
            field.viewport_changed(viewport, self.pending_layout.take(), now, queue);
        }
    }
}
