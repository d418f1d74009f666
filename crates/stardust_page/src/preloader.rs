//! The stage preloader.
//!
//! A logo crossfading through a palette while a simulated progress counter
//! renders interpolated destination coordinates. The exit waits for both
//! the real load signal and a minimum display time, then blows the logo up
//! past the viewport and fades the overlay. Completion is announced as
//! [`StageEvent::ContentReady`]; the hero sequence waits on it.
//!
//! A missing logo or overlay degrades the whole feature, but
//! `ContentReady` is still emitted immediately so nothing downstream can
//! deadlock on a broken preloader.

use stardust_core::{
    Countdown, Interval, PreloaderConfig, RandomSource, StageEvent, StageEventQueue,
};
use stardust_motion::easing::Easing;
use stardust_motion::node::{NodeArena, NodeId, PropPatch, Rgb};
use stardust_motion::scheduler::TransitionScheduler;
use stardust_motion::timeline::{Position, Timeline};
use stardust_motion::tween::{MotionEvent, MotionId, TweenSpec};

/// Node handles for the preloader's elements. Any may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreloaderNodes {
    /// The centered logo.
    pub logo: Option<NodeId>,
    /// The full-page overlay.
    pub overlay: Option<NodeId>,
    /// The coordinate counter.
    pub counter: Option<NodeId>,
    /// First gradient stop of the logo.
    pub warm_stop: Option<NodeId>,
    /// Second gradient stop of the logo.
    pub deep_stop: Option<NodeId>,
}

/// Lifecycle phase of the preloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreloaderPhase {
    /// Logo fading in.
    Intro,
    /// Palette crossfades and the simulated counter.
    Cycling,
    /// Load signalled and minimum display reached; counter ramping to 1.
    Finishing,
    /// Exit animation running.
    Exiting,
    /// Overlay hidden, `ContentReady` emitted.
    Done,
}

/// The preloader state machine.
pub struct Preloader {
    config: PreloaderConfig,
    nodes: PreloaderNodes,
    phase: PreloaderPhase,
    progress: f64,
    coordinates: String,
    palette_index: usize,
    counter_timer: Option<Interval>,
    palette_timer: Option<Interval>,
    min_display: Countdown,
    exit_delay: Countdown,
    ramp_started: Option<f64>,
    loaded: bool,
    min_elapsed: bool,
    intro_gate: Option<MotionId>,
    exit_gate: Option<MotionId>,
}

impl Preloader {
    /// Creates the preloader in its pre-start state.
    #[must_use]
    pub fn new(config: PreloaderConfig, nodes: PreloaderNodes) -> Self {
        let coordinates = format_coordinates(0.0, 0.0);
        Self {
            config,
            nodes,
            phase: PreloaderPhase::Intro,
            progress: 0.0,
            coordinates,
            palette_index: 0,
            counter_timer: None,
            palette_timer: None,
            min_display: Countdown::new(),
            exit_delay: Countdown::new(),
            ramp_started: None,
            loaded: false,
            min_elapsed: false,
            intro_gate: None,
            exit_gate: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> PreloaderPhase {
        self.phase
    }

    /// Simulated progress in `[0, 1]`.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// The rendered coordinate string, e.g. `"3.973°S, 7.188°E"`.
    #[must_use]
    pub fn coordinates(&self) -> &str {
        &self.coordinates
    }

    /// Kicks off the intro. Missing logo or overlay degrades the feature
    /// entirely; `ContentReady` is still emitted so the hero can start.
    pub fn start(
        &mut self,
        now: f64,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
        queue: &mut StageEventQueue,
    ) {
        let (Some(logo), Some(_overlay)) = (self.nodes.logo, self.nodes.overlay) else {
            tracing::warn!("preloader logo or overlay missing; skipping straight to content");
            self.phase = PreloaderPhase::Done;
            queue.push(StageEvent::ContentReady);
            return;
        };

        self.min_display.arm(now, self.config.min_display);

        scheduler.set(arena, logo, &PropPatch::new().scale(0.8).opacity(0.0));
        self.intro_gate = Some(scheduler.animate(
            TweenSpec::to(logo, PropPatch::new().scale(1.0).opacity(1.0), 1.5)
                .easing(Easing::PowerOut(2)),
        ));
        if let Some(counter) = self.nodes.counter {
            scheduler.set(arena, counter, &PropPatch::new().opacity(0.0));
            scheduler.animate(
                TweenSpec::to(counter, PropPatch::new().opacity(1.0), 0.8)
                    .delay(1.0)
                    .easing(Easing::PowerOut(2)),
            );
        }
    }

    /// The page finished loading. The exit still waits for the minimum
    /// display time.
    pub fn loaded(&mut self) {
        self.loaded = true;
    }

    /// Routes scheduler completions into phase transitions.
    pub fn absorb(
        &mut self,
        events: &[MotionEvent],
        now: f64,
        queue: &mut StageEventQueue,
    ) {
        for event in events {
            let MotionEvent::Completed(id) = event else {
                continue;
            };
            if self.intro_gate == Some(*id) {
                self.intro_gate = None;
                if self.phase == PreloaderPhase::Intro {
                    self.enter_cycling(now);
                }
            } else if self.exit_gate == Some(*id) {
                self.exit_gate = None;
                self.finish(queue);
            }
        }
    }

    /// One preloader tick: counters, palette, and the finish gate.
    pub fn tick(
        &mut self,
        now: f64,
        scheduler: &mut dyn TransitionScheduler,
        queue: &mut StageEventQueue,
        rng: &mut dyn RandomSource,
    ) {
        if self.min_display.fire(now) {
            self.min_elapsed = true;
        }

        match self.phase {
            PreloaderPhase::Cycling => {
                self.run_counters(now, scheduler, rng);
                if self.loaded && self.min_elapsed {
                    self.enter_finishing(now);
                }
            }
            PreloaderPhase::Finishing => {
                if let Some(started) = self.ramp_started {
                    let ramp = ((now - started) / self.config.ramp_duration).min(1.0);
                    self.progress = 0.95 + 0.05 * ramp;
                    self.update_coordinates();
                }
                if self.exit_delay.fire(now) {
                    self.enter_exiting(scheduler, queue);
                }
            }
            _ => {}
        }
    }

    fn enter_cycling(&mut self, now: f64) {
        self.phase = PreloaderPhase::Cycling;
        self.counter_timer = Some(Interval::new(self.config.counter_interval, now));
        self.palette_timer = Some(Interval::new(self.config.palette_step, now));
    }

    fn run_counters(
        &mut self,
        now: f64,
        scheduler: &mut dyn TransitionScheduler,
        rng: &mut dyn RandomSource,
    ) {
        let firings = match &mut self.counter_timer {
            Some(timer) => timer.due(now),
            None => 0,
        };
        for _ in 0..firings {
            self.counter_step(rng);
        }
        let crossfades = match &mut self.palette_timer {
            Some(timer) => timer.due(now),
            None => 0,
        };
        for _ in 0..crossfades {
            self.advance_palette(scheduler);
        }
    }

    fn advance_palette(&mut self, scheduler: &mut dyn TransitionScheduler) {
        if self.config.palette.is_empty() {
            return;
        }
        self.palette_index = (self.palette_index + 1) % self.config.palette.len();
        let step = &self.config.palette[self.palette_index];
        let warm = Rgb::from_hex(&step.warm).unwrap_or(Rgb::WHITE);
        let deep = Rgb::from_hex(&step.deep).unwrap_or(Rgb::WHITE);
        self.crossfade_stops(scheduler, warm, deep, self.config.palette_step);
    }

    fn crossfade_stops(
        &mut self,
        scheduler: &mut dyn TransitionScheduler,
        warm: Rgb,
        deep: Rgb,
        duration: f64,
    ) {
        for (node, color) in [(self.nodes.warm_stop, warm), (self.nodes.deep_stop, deep)] {
            if let Some(node) = node {
                scheduler.animate(
                    TweenSpec::to(node, PropPatch::new().tint(color), duration as f32)
                        .easing(Easing::PowerInOut(2)),
                );
            }
        }
    }

    fn enter_finishing(&mut self, now: f64) {
        self.phase = PreloaderPhase::Finishing;
        self.counter_timer = None;
        self.palette_timer = None;
        self.ramp_started = Some(now);
        self.exit_delay.arm(now, self.config.exit_delay);
    }

    fn enter_exiting(
        &mut self,
        scheduler: &mut dyn TransitionScheduler,
        queue: &mut StageEventQueue,
    ) {
        self.phase = PreloaderPhase::Exiting;
        self.progress = 1.0;
        self.update_coordinates();

        let Some(logo) = self.nodes.logo else {
            self.finish(queue);
            return;
        };

        let mut tl = Timeline::new();
        tl.push(
            TweenSpec::to(logo, PropPatch::new().scale(35.0).blur(120.0), 2.5)
                .easing(Easing::PowerInOut(2)),
            Position::Sequential,
        );
        let charcoal = Rgb::from_hex("#242424").unwrap_or(Rgb::WHITE);
        for (node, color) in [
            (self.nodes.warm_stop, Rgb::default()),
            (self.nodes.deep_stop, charcoal),
        ] {
            if let Some(node) = node {
                tl.push(
                    TweenSpec::to(node, PropPatch::new().tint(color), 2.5),
                    Position::WithPrevious,
                );
            }
        }
        if let Some(counter) = self.nodes.counter {
            tl.push(
                TweenSpec::to(counter, PropPatch::new().opacity(0.0), 0.5)
                    .easing(Easing::PowerOut(2)),
                Position::Overlap(2.5),
            );
        }
        if let Some(overlay) = self.nodes.overlay {
            tl.push(
                TweenSpec::to(overlay, PropPatch::new().opacity(0.0), 1.5)
                    .easing(Easing::PowerOut(2)),
                Position::Overlap(2.2),
            );
        }
        // The logo blow-up is the longest entry; its completion ends the
        // preloader.
        self.exit_gate = scheduler.schedule(tl).first().copied();
    }

    fn finish(&mut self, queue: &mut StageEventQueue) {
        self.phase = PreloaderPhase::Done;
        tracing::info!("preloader complete");
        queue.push(StageEvent::ContentReady);
    }

    fn update_coordinates(&mut self) {
        // Interpolate from the origin toward the destination.
        let lat = self.config.dest_lat * self.progress;
        let lng = self.config.dest_lng * self.progress;
        self.coordinates = format_coordinates(lat, lng);
    }

    /// Applies one simulated counter step with the configured jitter.
    pub fn counter_step(&mut self, rng: &mut dyn RandomSource) {
        let increment = f64::from(rng.unit()) * 0.02 + 0.005;
        self.progress = (self.progress + increment).min(0.95);
        self.update_coordinates();
    }
}

/// Renders a coordinate pair the way the counter displays it.
fn format_coordinates(lat: f64, lng: f64) -> String {
    let lat_dir = if lat >= 0.0 { 'N' } else { 'S' };
    let lng_dir = if lng >= 0.0 { 'E' } else { 'W' };
    format!(
        "{:.3}\u{b0}{}, {:.3}\u{b0}{}",
        lat.abs(),
        lat_dir,
        lng.abs(),
        lng_dir
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardust_core::SeededRandom;
    use stardust_motion::scheduler::TweenEngine;

    fn nodes(arena: &mut NodeArena) -> PreloaderNodes {
        PreloaderNodes {
            logo: Some(arena.alloc("preloader-logo")),
            overlay: Some(arena.alloc("preloader-overlay")),
            counter: Some(arena.alloc("preloader-counter")),
            warm_stop: Some(arena.alloc("gradient-warm")),
            deep_stop: Some(arena.alloc("gradient-deep")),
        }
    }

    fn drive(
        preloader: &mut Preloader,
        engine: &mut TweenEngine,
        arena: &mut NodeArena,
        queue: &mut StageEventQueue,
        rng: &mut SeededRandom,
        from: f64,
        to: f64,
    ) {
        let mut now = from;
        while now < to {
            now += 0.05;
            let events = engine.tick(0.05, arena);
            preloader.absorb(&events, now, queue);
            preloader.tick(now, engine, queue, rng);
        }
    }

    #[test]
    fn test_full_run_emits_content_ready() {
        let mut arena = NodeArena::new();
        let mut engine = TweenEngine::new();
        let mut queue = StageEventQueue::new();
        let mut rng = SeededRandom::new(17);
        let mut preloader = Preloader::new(PreloaderConfig::default(), nodes(&mut arena));

        preloader.start(0.0, &mut arena, &mut engine, &mut queue);
        assert_eq!(preloader.phase(), PreloaderPhase::Intro);

        preloader.loaded();
        drive(&mut preloader, &mut engine, &mut arena, &mut queue, &mut rng, 0.0, 10.0);

        assert_eq!(preloader.phase(), PreloaderPhase::Done);
        assert!(queue.drain().contains(&StageEvent::ContentReady));
        assert!((preloader.progress() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_display_holds_exit() {
        let mut arena = NodeArena::new();
        let mut engine = TweenEngine::new();
        let mut queue = StageEventQueue::new();
        let mut rng = SeededRandom::new(3);
        let mut preloader = Preloader::new(PreloaderConfig::default(), nodes(&mut arena));

        preloader.start(0.0, &mut arena, &mut engine, &mut queue);
        preloader.loaded(); // instant load; the 2 s minimum still applies

        drive(&mut preloader, &mut engine, &mut arena, &mut queue, &mut rng, 0.0, 1.9);
        assert_ne!(preloader.phase(), PreloaderPhase::Done);
        assert!(!queue.drain().contains(&StageEvent::ContentReady));
    }

    #[test]
    fn test_counter_caps_before_load() {
        let mut arena = NodeArena::new();
        let mut engine = TweenEngine::new();
        let mut queue = StageEventQueue::new();
        let mut rng = SeededRandom::new(11);
        let mut preloader = Preloader::new(PreloaderConfig::default(), nodes(&mut arena));

        preloader.start(0.0, &mut arena, &mut engine, &mut queue);
        // Never signal load: progress must cap at 0.95.
        drive(&mut preloader, &mut engine, &mut arena, &mut queue, &mut rng, 0.0, 30.0);
        assert!(preloader.progress() <= 0.95 + 1e-9);
        assert_ne!(preloader.phase(), PreloaderPhase::Done);
    }

    #[test]
    fn test_missing_nodes_degrade_but_release_content() {
        let mut arena = NodeArena::new();
        let mut engine = TweenEngine::new();
        let mut queue = StageEventQueue::new();
        let mut preloader =
            Preloader::new(PreloaderConfig::default(), PreloaderNodes::default());

        preloader.start(0.0, &mut arena, &mut engine, &mut queue);
        assert_eq!(preloader.phase(), PreloaderPhase::Done);
        assert!(queue.drain().contains(&StageEvent::ContentReady));
    }

    #[test]
    fn test_coordinate_formatting() {
        assert_eq!(format_coordinates(0.0, 0.0), "0.000\u{b0}N, 0.000\u{b0}E");
        assert_eq!(
            format_coordinates(-7.946, 14.375),
            "7.946\u{b0}S, 14.375\u{b0}E"
        );
    }

    #[test]
    fn test_counter_step_uses_jitter() {
        let mut preloader =
            Preloader::new(PreloaderConfig::default(), PreloaderNodes::default());
        let mut rng = SeededRandom::new(8);
        for _ in 0..400 {
            preloader.counter_step(&mut rng);
        }
        assert!((preloader.progress() - 0.95).abs() < 1e-9);
        assert!(preloader.coordinates().contains("\u{b0}S"));
    }
}
