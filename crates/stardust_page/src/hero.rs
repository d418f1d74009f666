//! The hero animation sequence.
//!
//! Built idle and played when `ContentReady` arrives. Phases run strictly
//! in order: entrance, the typing swap of the word tail, the stem-to-card
//! transform, the logo reveal, then the ambient loops (floating cards and
//! the photo cycle) that run until teardown.
//!
//! Each phase schedules one timeline and gates on a zero-duration marker
//! tween placed at the timeline's end, so a phase with missing nodes still
//! completes and the sequence never stalls.

use stardust_core::{Countdown, Interval};
use stardust_motion::easing::Easing;
use stardust_motion::node::{NodeArena, NodeId, PropPatch};
use stardust_motion::scheduler::TransitionScheduler;
use stardust_motion::timeline::{Position, Timeline};
use stardust_motion::tween::{MotionEvent, MotionId, TweenSpec};

/// Deletion durations for the word-tail letters, last letter first.
const DELETE_DURATIONS: [f32; 3] = [0.3, 0.25, 0.2];
/// Per-letter typing delays for the replacement word.
const TYPE_DELAYS: [f32; 3] = [0.12, 0.15, 0.10];
/// Seconds between photo swaps.
const PHOTO_CYCLE_PERIOD: f64 = 2.8;
/// Offset into the photo timeline at which the image is exchanged: after
/// the fade-out and the flash ramp-up.
const PHOTO_SWAP_OFFSET: f64 = 0.23;

/// Node handles for the hero's elements. Any may be absent; a missing node
/// degrades only the tweens that target it.
#[derive(Debug, Clone)]
pub struct HeroNodes {
    /// Main content column.
    pub content: Option<NodeId>,
    /// Top navigation.
    pub navigation: Option<NodeId>,
    /// Decorative halo behind the headline.
    pub halo: Option<NodeId>,
    /// The particle field container.
    pub field: Option<NodeId>,
    /// Page footer.
    pub footer: Option<NodeId>,
    /// Letters of the word tail that get deleted, in display order.
    pub tail_letters: Vec<NodeId>,
    /// Pre-allocated letters of the replacement word, hidden until typed.
    pub typed_letters: Vec<NodeId>,
    /// The headline stem that morphs into a card.
    pub stem: Option<NodeId>,
    /// The star that flies off during the stem transform.
    pub star: Option<NodeId>,
    /// The growing card the stem morphs into.
    pub stem_card: Option<NodeId>,
    /// Floating media cards.
    pub media_cards: Vec<NodeId>,
    /// Logo container.
    pub logo_container: Option<NodeId>,
    /// The spinning flower mark.
    pub flower: Option<NodeId>,
    /// The word path whose draw progress is animated.
    pub word_path: Option<NodeId>,
    /// The logo star that unblurs last.
    pub logo_star: Option<NodeId>,
    /// The cycling photo.
    pub photo: Option<NodeId>,
    /// The white flash overlay used between photos.
    pub flash: Option<NodeId>,
    /// Invisible gate node every phase ends on.
    pub marker: NodeId,
}

impl HeroNodes {
    /// A node set with only the gate marker. Every sub-sequence degrades,
    /// but the phases still complete through the marker.
    #[must_use]
    pub fn empty(marker: NodeId) -> Self {
        Self {
            content: None,
            navigation: None,
            halo: None,
            field: None,
            footer: None,
            tail_letters: Vec::new(),
            typed_letters: Vec::new(),
            stem: None,
            star: None,
            stem_card: None,
            media_cards: Vec::new(),
            logo_container: None,
            flower: None,
            word_path: None,
            logo_star: None,
            photo: None,
            flash: None,
            marker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeroPhase {
    Idle,
    Entrance,
    Typing,
    Stem,
    Logo,
    Running,
}

/// The hero sequence state machine.
pub struct HeroSequence {
    nodes: HeroNodes,
    phase: HeroPhase,
    gate: Option<MotionId>,
    viewport_w: f32,
    photos: Vec<String>,
    photo_index: usize,
    photo_cycle: Option<Interval>,
    photo_swap: Countdown,
}

impl HeroSequence {
    /// Creates the sequence in its idle state.
    #[must_use]
    pub fn new(nodes: HeroNodes, viewport_w: f32, photos: Vec<String>) -> Self {
        Self {
            nodes,
            phase: HeroPhase::Idle,
            gate: None,
            viewport_w,
            photos,
            photo_index: 0,
            photo_cycle: None,
            photo_swap: Countdown::new(),
        }
    }

    /// Whether the ambient loops have started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == HeroPhase::Running
    }

    /// Index of the photo currently shown.
    #[must_use]
    pub const fn photo_index(&self) -> usize {
        self.photo_index
    }

    /// Viewport width changed; affects the stem-phase layout decisions.
    pub fn viewport_resized(&mut self, width: f32) {
        self.viewport_w = width;
    }

    /// Starts the sequence. Called once, on `ContentReady`.
    pub fn play(&mut self, arena: &mut NodeArena, scheduler: &mut dyn TransitionScheduler) {
        if self.phase != HeroPhase::Idle {
            return;
        }
        self.apply_initial_states(arena, scheduler);
        self.phase = HeroPhase::Entrance;
        self.gate = Some(self.schedule_entrance(scheduler));
    }

    /// Routes scheduler completions into phase transitions.
    pub fn absorb(
        &mut self,
        events: &[MotionEvent],
        now: f64,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
    ) {
        for event in events {
            let MotionEvent::Completed(id) = event else {
                continue;
            };
            if self.gate != Some(*id) {
                continue;
            }
            self.gate = None;
            self.advance(now, arena, scheduler);
        }
    }

    /// Polls the ambient loops.
    pub fn tick(&mut self, now: f64, arena: &mut NodeArena, scheduler: &mut dyn TransitionScheduler) {
        if self.photo_swap.fire(now) {
            self.swap_photo(arena, scheduler);
        }
        let firings = match &mut self.photo_cycle {
            Some(cycle) => cycle.due(now),
            None => 0,
        };
        for _ in 0..firings {
            self.schedule_photo_transition(now, scheduler);
        }
    }

    /// Stops the ambient loops. The stage cancels the tweens themselves.
    pub fn stop(&mut self) {
        self.photo_cycle = None;
        self.photo_swap.cancel();
    }

    fn advance(&mut self, now: f64, arena: &mut NodeArena, scheduler: &mut dyn TransitionScheduler) {
        match self.phase {
            HeroPhase::Entrance => {
                self.phase = HeroPhase::Typing;
                self.gate = Some(self.schedule_typing(scheduler));
            }
            HeroPhase::Typing => {
                self.phase = HeroPhase::Stem;
                self.gate = Some(self.schedule_stem(scheduler));
            }
            HeroPhase::Stem => {
                self.phase = HeroPhase::Logo;
                self.gate = Some(self.schedule_logo(scheduler));
            }
            HeroPhase::Logo => {
                self.phase = HeroPhase::Running;
                self.start_ambient_loops(now, arena, scheduler);
            }
            HeroPhase::Idle | HeroPhase::Running => {}
        }
    }

    fn apply_initial_states(
        &self,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
    ) {
        let fade_up_start = PropPatch::new().opacity(0.0).y(30.0);
        for node in [
            self.nodes.content,
            self.nodes.navigation,
            self.nodes.halo,
            self.nodes.footer,
        ]
        .into_iter()
        .flatten()
        {
            scheduler.set(arena, node, &fade_up_start);
        }
        if let Some(field) = self.nodes.field {
            scheduler.set(arena, field, &PropPatch::new().scale(0.0));
        }
        for &card in &self.nodes.media_cards {
            scheduler.set(arena, card, &PropPatch::new().opacity(0.0).scale(0.8));
        }
        for &letter in &self.nodes.typed_letters {
            scheduler.set(
                arena,
                letter,
                &PropPatch::new().visible(false).opacity(0.0).y(2.0),
            );
        }
        if let Some(card) = self.nodes.stem_card {
            scheduler.set(
                arena,
                card,
                &PropPatch::new().visible(false).scale(0.1).width(2.0).height(20.0),
            );
        }
        if let Some(container) = self.nodes.logo_container {
            scheduler.set(arena, container, &PropPatch::new().opacity(0.0).scale(0.8));
        }
        if let Some(flower) = self.nodes.flower {
            scheduler.set(arena, flower, &PropPatch::new().opacity(0.0).scale(0.5));
        }
        if let Some(path) = self.nodes.word_path {
            scheduler.set(arena, path, &PropPatch::new().opacity(0.0).width(0.0));
        }
        if let Some(star) = self.nodes.logo_star {
            scheduler.set(arena, star, &PropPatch::new().opacity(0.0).blur(40.0));
        }
        if let Some(flash) = self.nodes.flash {
            scheduler.set(arena, flash, &PropPatch::new().opacity(0.0));
        }
    }

    /// Everything fades up together over 1.2 s.
    fn schedule_entrance(&self, scheduler: &mut dyn TransitionScheduler) -> MotionId {
        let mut tl = Timeline::new();
        let mut first = true;
        let mut push = |tl: &mut Timeline, node: Option<NodeId>, patch: PropPatch| {
            if let Some(node) = node {
                let position = if first {
                    Position::Sequential
                } else {
                    Position::WithPrevious
                };
                first = false;
                tl.push(
                    TweenSpec::to(node, patch, 1.2).easing(Easing::PowerOut(2)),
                    position,
                );
            }
        };
        push(&mut tl, self.nodes.content, PropPatch::new().opacity(1.0).y(0.0));
        push(&mut tl, self.nodes.navigation, PropPatch::new().opacity(1.0).y(0.0));
        push(&mut tl, self.nodes.halo, PropPatch::new().opacity(0.5).y(0.0));
        push(&mut tl, self.nodes.field, PropPatch::new().scale(1.2));
        push(&mut tl, self.nodes.footer, PropPatch::new().opacity(1.0).y(0.0));
        self.finish_phase(tl, scheduler)
    }

    /// Delete the tail letters in reverse, then type the replacement.
    fn schedule_typing(&self, scheduler: &mut dyn TransitionScheduler) -> MotionId {
        let mut tl = Timeline::new();

        for (i, &letter) in self.nodes.tail_letters.iter().rev().enumerate() {
            let duration = DELETE_DURATIONS[i.min(DELETE_DURATIONS.len() - 1)];
            let position = if i == 0 {
                // The pause before deletion starts.
                Position::After(0.9)
            } else {
                Position::Sequential
            };
            tl.push(
                TweenSpec::to(letter, PropPatch::new().opacity(0.0).scale(0.95), duration)
                    .easing(Easing::PowerIn(1)),
                position,
            );
        }

        let mut cumulative = 0.0;
        for (i, &letter) in self.nodes.typed_letters.iter().enumerate() {
            cumulative += TYPE_DELAYS[i.min(TYPE_DELAYS.len() - 1)];
            let position = if i == 0 {
                Position::After(0.2)
            } else {
                Position::WithPrevious
            };
            tl.push(
                TweenSpec::to(
                    letter,
                    PropPatch::new().visible(true).opacity(1.0).y(0.0),
                    0.08,
                )
                .delay(cumulative)
                .easing(Easing::PowerOut(2)),
                position,
            );
        }
        // The cursor tag lands on the last typed letter, then clears.
        if let Some(&last) = self.nodes.typed_letters.last() {
            tl.push(
                TweenSpec::to(last, PropPatch::new().class("cursor-blink"), 0.0)
                    .delay(cumulative + 0.1),
                Position::WithPrevious,
            );
            tl.push(
                TweenSpec::to(last, PropPatch::new().class(""), 0.0).delay(cumulative + 0.5),
                Position::WithPrevious,
            );
        }
        self.finish_phase(tl, scheduler)
    }

    /// The stem grows into a media card while the star flies off.
    fn schedule_stem(&self, scheduler: &mut dyn TransitionScheduler) -> MotionId {
        let wide = self.viewport_w > 768.0;
        let mut tl = Timeline::new();

        if let Some(card) = self.nodes.stem_card {
            let (w, h) = if wide { (280.0, 340.0) } else { (180.0, 180.0) };
            tl.push(
                TweenSpec::to(
                    card,
                    PropPatch::new().visible(true).scale(1.0).width(w).height(h),
                    1.8,
                )
                .easing(Easing::PowerInOut(2)),
                Position::After(0.4),
            );
        }
        if let Some(stem) = self.nodes.stem {
            tl.push(
                TweenSpec::to(stem, PropPatch::new().opacity(0.0), 0.0),
                Position::WithPrevious,
            );
        }
        if let Some(star) = self.nodes.star {
            tl.push(
                TweenSpec::to(
                    star,
                    PropPatch::new()
                        .scale(0.0)
                        .x_by(200.0)
                        .y_by(-200.0)
                        .rotation_by(360.0),
                    0.8,
                )
                .easing(Easing::PowerInOut(2)),
                Position::WithPrevious,
            );
        }
        if wide {
            if let Some(content) = self.nodes.content {
                tl.push(
                    TweenSpec::to(content, PropPatch::new().width(self.viewport_w * 0.75), 1.2)
                        .easing(Easing::PowerOut(2)),
                    Position::WithPrevious,
                );
            }
        }
        let cards: Vec<TweenSpec> = self
            .nodes
            .media_cards
            .iter()
            .map(|&card| {
                TweenSpec::to(card, PropPatch::new().opacity(1.0).scale(1.0), 0.5)
                    .easing(Easing::BackOut(1.4))
            })
            .collect();
        tl.stagger(cards, 0.8, Position::Overlap(1.8));
        self.finish_phase(tl, scheduler)
    }

    /// Logo container pop, flower spin, path draw, star unblur.
    fn schedule_logo(&self, scheduler: &mut dyn TransitionScheduler) -> MotionId {
        let mut tl = Timeline::new();

        if let Some(container) = self.nodes.logo_container {
            tl.push(
                TweenSpec::to(container, PropPatch::new().opacity(1.0).scale(1.02), 0.5)
                    .easing(Easing::BackOut(1.4)),
                Position::Sequential,
            );
            tl.push(
                TweenSpec::to(container, PropPatch::new().scale(1.0), 0.15)
                    .easing(Easing::PowerOut(1)),
                Position::Sequential,
            );
        }
        if let Some(flower) = self.nodes.flower {
            tl.push(
                TweenSpec::to(flower, PropPatch::new().opacity(1.0).scale(1.0), 0.5)
                    .easing(Easing::BackOut(1.4)),
                Position::After(0.2),
            );
            tl.push(
                TweenSpec::to(flower, PropPatch::new().rotation_by(1065.0), 3.5)
                    .easing(Easing::PowerOut(4)),
                Position::WithPrevious,
            );
        }
        if let Some(path) = self.nodes.word_path {
            tl.push(
                TweenSpec::to(path, PropPatch::new().opacity(1.0), 0.25),
                Position::After(0.2),
            );
            tl.push(
                TweenSpec::to(path, PropPatch::new().width(100.0), 2.5)
                    .easing(Easing::PowerInOut(2)),
                Position::Sequential,
            );
        }
        if let Some(star) = self.nodes.logo_star {
            tl.push(
                TweenSpec::to(star, PropPatch::new().opacity(1.0).blur(0.0), 0.25)
                    .easing(Easing::BackOut(1.4)),
                Position::After(0.05),
            );
        }
        self.finish_phase(tl, scheduler)
    }

    /// Floating cards plus the photo cycle, until teardown.
    fn start_ambient_loops(
        &mut self,
        now: f64,
        arena: &mut NodeArena,
        scheduler: &mut dyn TransitionScheduler,
    ) {
        tracing::info!("hero sequence running; starting ambient loops");
        for (i, &card) in self.nodes.media_cards.iter().enumerate() {
            scheduler.animate(
                TweenSpec::to(
                    card,
                    PropPatch::new().x_by(4.0).y_by(4.0).rotation_by(0.5),
                    3.5 + 0.3 * i as f32,
                )
                .delay(0.2 * i as f32)
                .easing(Easing::SineInOut)
                .yoyo()
                .repeat_forever(),
            );
        }
        if let (Some(photo), false) = (self.nodes.photo, self.photos.is_empty()) {
            scheduler.set(arena, photo, &PropPatch::new().class(self.photos[0].clone()));
            self.photo_cycle = Some(Interval::new(PHOTO_CYCLE_PERIOD, now));
        }
    }

    /// One photo transition: fade out, flash, swap (via the countdown),
    /// flash down, fade back in.
    fn schedule_photo_transition(&mut self, now: f64, scheduler: &mut dyn TransitionScheduler) {
        let Some(photo) = self.nodes.photo else {
            return;
        };
        let mut tl = Timeline::new();
        tl.push(
            TweenSpec::to(photo, PropPatch::new().opacity(0.0), 0.15)
                .easing(Easing::PowerIn(1)),
            Position::Sequential,
        );
        if let Some(flash) = self.nodes.flash {
            tl.push(
                TweenSpec::to(flash, PropPatch::new().opacity(0.8), 0.08)
                    .easing(Easing::PowerOut(1)),
                Position::Sequential,
            );
            tl.push(
                TweenSpec::to(flash, PropPatch::new().opacity(0.0), 0.12)
                    .easing(Easing::PowerIn(1)),
                Position::Sequential,
            );
        }
        tl.push(
            TweenSpec::to(photo, PropPatch::new().opacity(1.0), 0.15)
                .easing(Easing::PowerOut(1)),
            Position::Sequential,
        );
        scheduler.schedule(tl);
        self.photo_swap.arm(now, PHOTO_SWAP_OFFSET);
    }

    fn swap_photo(&mut self, arena: &mut NodeArena, scheduler: &mut dyn TransitionScheduler) {
        let Some(photo) = self.nodes.photo else {
            return;
        };
        if self.photos.is_empty() {
            return;
        }
        self.photo_index = (self.photo_index + 1) % self.photos.len();
        scheduler.set(
            arena,
            photo,
            &PropPatch::new().class(self.photos[self.photo_index].clone()),
        );
    }

    /// Appends the gate marker and schedules the timeline. The marker is a
    /// zero-duration tween at the timeline's end, so the phase completes
    /// even when every real node was missing.
    fn finish_phase(
        &self,
        mut tl: Timeline,
        scheduler: &mut dyn TransitionScheduler,
    ) -> MotionId {
        tl.push(
            TweenSpec::to(self.nodes.marker, PropPatch::new(), 0.0),
            Position::Sequential,
        );
        // The marker is always the last entry pushed.
        let ids = scheduler.schedule(tl);
        ids[ids.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardust_motion::scheduler::TweenEngine;

    fn full_nodes(arena: &mut NodeArena) -> HeroNodes {
        HeroNodes {
            content: Some(arena.alloc("content")),
            navigation: Some(arena.alloc("navigation")),
            halo: Some(arena.alloc("halo")),
            field: Some(arena.alloc("field")),
            footer: Some(arena.alloc("footer")),
            tail_letters: (0..3).map(|i| arena.alloc(format!("tail-{i}"))).collect(),
            typed_letters: (0..3).map(|i| arena.alloc(format!("typed-{i}"))).collect(),
            stem: Some(arena.alloc("stem")),
            star: Some(arena.alloc("star")),
            stem_card: Some(arena.alloc("stem-card")),
            media_cards: (0..4).map(|i| arena.alloc(format!("card-{i}"))).collect(),
            logo_container: Some(arena.alloc("logo")),
            flower: Some(arena.alloc("flower")),
            word_path: Some(arena.alloc("word-path")),
            logo_star: Some(arena.alloc("logo-star")),
            photo: Some(arena.alloc("photo")),
            flash: Some(arena.alloc("flash")),
            marker: arena.alloc_hidden("hero-marker"),
        }
    }

    fn run(
        hero: &mut HeroSequence,
        engine: &mut TweenEngine,
        arena: &mut NodeArena,
        from: f64,
        to: f64,
    ) {
        let mut now = from;
        while now < to {
            now += 0.05;
            let events = engine.tick(0.05, arena);
            hero.absorb(&events, now, arena, engine);
            hero.tick(now, arena, engine);
        }
    }

    #[test]
    fn test_sequence_reaches_running() {
        let mut arena = NodeArena::new();
        let nodes = full_nodes(&mut arena);
        let content = nodes.content.unwrap();
        let mut hero = HeroSequence::new(nodes, 1920.0, vec!["pic-1".into(), "pic-2".into()]);
        let mut engine = TweenEngine::new();

        hero.play(&mut arena, &mut engine);
        assert!((arena.get(content).unwrap().props.opacity).abs() < 1e-6);

        run(&mut hero, &mut engine, &mut arena, 0.0, 20.0);
        assert!(hero.is_running());
        assert!((arena.get(content).unwrap().props.opacity - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_missing_nodes_never_stall() {
        let mut arena = NodeArena::new();
        let nodes = HeroNodes::empty(arena.alloc_hidden("hero-marker"));
        let mut hero = HeroSequence::new(nodes, 1280.0, Vec::new());
        let mut engine = TweenEngine::new();

        hero.play(&mut arena, &mut engine);
        run(&mut hero, &mut engine, &mut arena, 0.0, 2.0);
        assert!(hero.is_running(), "empty phases must gate through markers");
    }

    #[test]
    fn test_photo_cycle_advances_and_wraps() {
        let mut arena = NodeArena::new();
        let nodes = full_nodes(&mut arena);
        let photo = nodes.photo.unwrap();
        let mut hero = HeroSequence::new(
            nodes,
            1920.0,
            vec!["pic-1".into(), "pic-2".into(), "pic-3".into()],
        );
        let mut engine = TweenEngine::new();

        hero.play(&mut arena, &mut engine);
        run(&mut hero, &mut engine, &mut arena, 0.0, 20.0);
        assert!(hero.is_running());
        let start_index = hero.photo_index();

        // Within one photo period plus the swap offset, the index advances.
        let mut now = 20.0;
        let mut changed = false;
        while now < 20.0 + PHOTO_CYCLE_PERIOD + 1.0 {
            now += 0.05;
            let events = engine.tick(0.05, &mut arena);
            hero.absorb(&events, now, &mut arena, &mut engine);
            hero.tick(now, &mut arena, &mut engine);
            if hero.photo_index() != start_index {
                changed = true;
                break;
            }
        }
        assert!(changed, "the photo cycle must advance");
        assert!(hero.photo_index() < 3);
        assert!(arena.get(photo).unwrap().class.starts_with("pic-"));
    }

    #[test]
    fn test_typed_letters_become_visible() {
        let mut arena = NodeArena::new();
        let nodes = full_nodes(&mut arena);
        let typed = nodes.typed_letters.clone();
        let mut hero = HeroSequence::new(nodes, 1920.0, Vec::new());
        let mut engine = TweenEngine::new();

        hero.play(&mut arena, &mut engine);
        run(&mut hero, &mut engine, &mut arena, 0.0, 20.0);
        for letter in typed {
            let node = arena.get(letter).unwrap();
            assert!(node.visible);
            assert!((node.props.opacity - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut arena = NodeArena::new();
        let nodes = full_nodes(&mut arena);
        let mut hero = HeroSequence::new(nodes, 1920.0, Vec::new());
        let mut engine = TweenEngine::new();

        hero.play(&mut arena, &mut engine);
        let scheduled = engine.active_count();
        hero.play(&mut arena, &mut engine);
        assert_eq!(engine.active_count(), scheduled);
    }
}
