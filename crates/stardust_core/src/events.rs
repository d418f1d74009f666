//! # Stage Event Queue
//!
//! The page's custom events, lifted into data. Components push here during
//! their tick; the stage drains the queue once per tick and routes. The
//! queue is bounded so a stalled consumer can never balloon memory.

use std::collections::VecDeque;

/// Maximum events held between drains.
const MAX_PENDING_EVENTS: usize = 256;

/// Cross-component stage notifications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageEvent {
    /// The preloader finished its exit animation; hero sequences may start.
    ContentReady,
    /// The text mask was rebuilt with this many anchor points.
    MaskRebuilt {
        /// Anchor count of the fresh cloud.
        points: usize,
    },
}

/// Bounded FIFO of pending stage events.
#[derive(Debug, Default)]
pub struct StageEventQueue {
    pending: VecDeque<StageEvent>,
    dropped: u64,
}

impl StageEventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes an event, dropping it (with a warning) when the queue is full.
    pub fn push(&mut self, event: StageEvent) {
        if self.pending.len() >= MAX_PENDING_EVENTS {
            self.dropped += 1;
            tracing::warn!(?event, dropped = self.dropped, "stage event queue full");
            return;
        }
        self.pending.push_back(event);
    }

    /// Drains every pending event in arrival order.
    pub fn drain(&mut self) -> Vec<StageEvent> {
        self.pending.drain(..).collect()
    }

    /// Number of events waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
