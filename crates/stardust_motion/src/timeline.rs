//! Timeline composition with relative placement.
//!
//! A timeline is a build-time artifact: it flattens to absolute-delay
//! tweens the moment it is scheduled. There is no timeline object alive at
//! runtime, which keeps the engine's hot loop a flat scan.

use crate::tween::TweenSpec;

/// Where an entry lands relative to the timeline built so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// At the current end of the timeline.
    Sequential,
    /// At an absolute time from timeline start.
    At(f32),
    /// Aligned with the previous entry's start (the page's `"<"`).
    WithPrevious,
    /// Overlapping the current end by this many seconds (`"-=s"`).
    Overlap(f32),
    /// This many seconds past the current end (`"+=s"`).
    After(f32),
}

/// An ordered collection of tween specs with relative placement.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<(TweenSpec, Position)>,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, spec: TweenSpec, position: Position) {
        self.entries.push((spec, position));
    }

    /// Appends a group of specs sharing one position, with `amount` seconds
    /// of start time spread evenly across them (the page's
    /// `stagger: { amount, from: "start" }`).
    pub fn stagger(&mut self, specs: Vec<TweenSpec>, amount: f32, position: Position) {
        let n = specs.len();
        if n == 0 {
            return;
        }
        let step = if n > 1 { amount / (n - 1) as f32 } else { 0.0 };
        for (i, mut spec) in specs.into_iter().enumerate() {
            spec.delay += step * i as f32;
            let pos = if i == 0 { position } else { Position::WithPrevious };
            self.entries.push((spec, pos));
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the timeline has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves every entry to an absolute-delay tween spec.
    ///
    /// Endless entries advance the cursor by a single cycle; anything
    /// placed after them lands relative to that first pass.
    #[must_use]
    pub fn flatten(self) -> Vec<TweenSpec> {
        let mut out = Vec::with_capacity(self.entries.len());
        let mut cursor_end: f32 = 0.0;
        let mut prev_start: f32 = 0.0;

        for (mut spec, position) in self.entries {
            let start = match position {
                Position::Sequential => cursor_end,
                Position::At(t) => t.max(0.0),
                Position::WithPrevious => prev_start,
                Position::Overlap(s) => (cursor_end - s).max(0.0),
                Position::After(s) => cursor_end + s,
            };
            let delay = start + spec.delay;
            let span = spec.active_span().unwrap_or(spec.duration);
            cursor_end = cursor_end.max(delay + span);
            prev_start = start;

            spec.delay = delay;
            out.push(spec);
        }
        out
    }

    /// Total span of the flattened timeline, in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.clone()
            .flatten()
            .iter()
            .map(|s| s.delay + s.active_span().unwrap_or(s.duration))
            .fold(0.0, f32::max)
    }
}
