//! Tween specifications and motion lifecycle events.

use crate::easing::Easing;
use crate::node::{NodeId, PropPatch};

/// Identity of one scheduled transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MotionId(pub(crate) u64);

/// Lifecycle notification returned from a scheduler tick.
///
/// Cancelled transitions emit nothing; cleanup after cancellation is the
/// owner's sweep, not an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    /// The transition's delay elapsed and it began driving its node.
    Started(MotionId),
    /// The transition reached its final state and was retired.
    Completed(MotionId),
}

/// A timed property transition on one node.
#[derive(Clone, Debug)]
pub struct TweenSpec {
    /// Target node.
    pub node: NodeId,
    /// Property goals. Relative goals resolve against the value at start.
    pub patch: PropPatch,
    /// Active duration in seconds. Zero completes on its first tick.
    pub duration: f32,
    /// Delay before the transition starts, in seconds.
    pub delay: f32,
    /// Easing curve.
    pub easing: Easing,
    /// Play the cycle backwards on every second repeat.
    pub yoyo: bool,
    /// Extra cycles after the first; `-1` repeats forever.
    pub repeat: i32,
}

impl TweenSpec {
    /// Creates a transition to the patched state over `duration` seconds.
    #[must_use]
    pub fn to(node: NodeId, patch: PropPatch, duration: f32) -> Self {
        Self {
            node,
            patch,
            duration: duration.max(0.0),
            delay: 0.0,
            easing: Easing::default(),
            yoyo: false,
            repeat: 0,
        }
    }

    /// Sets the start delay.
    #[must_use]
    pub fn delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Sets the easing curve.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Plays the cycle back and forth.
    #[must_use]
    pub fn yoyo(mut self) -> Self {
        self.yoyo = true;
        self
    }

    /// Adds `count` extra cycles.
    #[must_use]
    pub fn repeat(mut self, count: i32) -> Self {
        self.repeat = count.max(0);
        self
    }

    /// Repeats until cancelled.
    #[must_use]
    pub fn repeat_forever(mut self) -> Self {
        self.repeat = -1;
        self
    }

    /// Total cycles played, or `None` for endless transitions.
    #[must_use]
    pub fn cycle_count(&self) -> Option<u32> {
        if self.repeat < 0 {
            None
        } else {
            // repeat >= 0 here, and page timelines never exceed a handful.
            Some(self.repeat.unsigned_abs() + 1)
        }
    }

    /// Time from start (after delay) to the final state, or `None` when
    /// endless. Used by timeline flattening to place the cursor.
    #[must_use]
    pub fn active_span(&self) -> Option<f32> {
        self.cycle_count().map(|cycles| self.duration * cycles as f32)
    }
}
