//! The stage context.
//!
//! One object owns the clock, the event queue, the node arena, the chosen
//! transition scheduler, the particle field with its governor, and every
//! page component. The embedder constructs it once, feeds it boundary
//! events, ticks it, and tears it down explicitly.

use std::sync::Arc;

use thiserror::Error;

use stardust_core::{
    CoreError, DensityTier, DeviceProfile, RandomSource, StageConfig, StageEvent, StageEventQueue,
    TickClock,
};
use stardust_effects::{FieldStats, Governor, LabelLayout, LabelTarget, ParticleField};
use stardust_motion::node::NodeArena;
use stardust_motion::scheduler::TransitionScheduler;
use stardust_page::{
    AudioSource, CompactPlayer, HeroNodes, HeroSequence, Preloader, PreloaderNodes,
    PreloaderPhase, SubmissionMeta, SubmitOutcome, Track, WaitlistError, WaitlistForm,
    WaitlistStatus, WaitlistTransport,
};

use crate::input::InputEvent;

/// Height of the player's wave surface, in CSS pixels.
const WAVE_HEIGHT: f32 = 60.0;
/// The wave surface spans this fraction of the viewport width.
const WAVE_WIDTH_RATIO: f32 = 0.3;

/// Errors constructing the stage.
#[derive(Error, Debug)]
pub enum StageError {
    /// Configuration or tier validation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The waitlist handler could not be built.
    #[error(transparent)]
    Waitlist(#[from] WaitlistError),
}

/// What the page actually contains. Absent elements degrade their feature.
#[derive(Debug, Clone)]
pub struct PageManifest {
    /// The hero label text the mask renders.
    pub label_text: String,
    /// Whether the label element exists.
    pub label_present: bool,
    /// Whether the preloader logo and overlay exist.
    pub preloader_present: bool,
    /// Whether the waitlist form and input exist.
    pub form_present: bool,
    /// Player playlist.
    pub tracks: Vec<Track>,
    /// Photo cycle sources.
    pub photos: Vec<String>,
    /// Browser user agent, forwarded with waitlist submissions.
    pub user_agent: String,
    /// Referrer URL.
    pub referrer: String,
    /// URL of the page itself.
    pub page_url: String,
}

impl Default for PageManifest {
    fn default() -> Self {
        Self {
            label_text: "Stardust".to_string(),
            label_present: true,
            preloader_present: true,
            form_present: true,
            tracks: vec![Track {
                title: "Audio recordings".to_string(),
                artist: "You".to_string(),
                src: "/assets/audio/ambient.mp3".to_string(),
            }],
            photos: (1..=4).map(|i| format!("pic-{i}")).collect(),
            user_agent: String::new(),
            referrer: String::new(),
            page_url: String::new(),
        }
    }
}

/// Injected capabilities. Production wires entropy randomness, the tween
/// engine, the HTTP transport and a real audio backend; tests substitute
/// seeded and scripted implementations without touching stage code.
pub struct StageDeps {
    /// Randomness for emission offsets, variants and jitter.
    pub rng: Box<dyn RandomSource>,
    /// The transition scheduler implementation.
    pub scheduler: Box<dyn TransitionScheduler>,
    /// The waitlist endpoint transport.
    pub transport: Arc<dyn WaitlistTransport>,
    /// The audio backend.
    pub audio: Box<dyn AudioSource>,
}

/// The stage context. See the crate docs for the ownership story.
pub struct Stage {
    clock: TickClock,
    queue: StageEventQueue,
    arena: NodeArena,
    scheduler: Box<dyn TransitionScheduler>,
    rng: Box<dyn RandomSource>,
    tier: DensityTier,
    viewport: (f32, f32),
    field: Option<ParticleField>,
    governor: Governor,
    preloader: Preloader,
    hero: HeroSequence,
    player: CompactPlayer,
    waitlist: WaitlistForm,
    label_text: String,
    label_present: bool,
    user_agent: String,
    referrer: String,
    page_url: String,
}

impl Stage {
    /// Builds the whole stage from configuration, the device profile, the
    /// page manifest and the injected capabilities.
    pub fn new(
        config: StageConfig,
        profile: &DeviceProfile,
        manifest: PageManifest,
        deps: StageDeps,
    ) -> Result<Self, StageError> {
        config.validate()?;
        let tier = DensityTier::classify(profile, &config.tiers);
        let viewport = (profile.viewport_w, profile.viewport_h);
        tracing::info!(?tier, ?viewport, "constructing stage");

        let mut arena = NodeArena::new();

        let preloader_nodes = if manifest.preloader_present {
            PreloaderNodes {
                logo: Some(arena.alloc("preloader-logo")),
                overlay: Some(arena.alloc("preloader-overlay")),
                counter: Some(arena.alloc("preloader-counter")),
                warm_stop: Some(arena.alloc("gradient-warm")),
                deep_stop: Some(arena.alloc("gradient-deep")),
            }
        } else {
            PreloaderNodes::default()
        };
        let preloader = Preloader::new(config.preloader.clone(), preloader_nodes);

        let label_node = manifest
            .label_present
            .then(|| arena.alloc("hero-label"));
        let hero_nodes = HeroNodes {
            content: Some(arena.alloc("hero-content")),
            navigation: Some(arena.alloc("navigation")),
            halo: Some(arena.alloc("halo")),
            field: Some(arena.alloc("particle-field")),
            footer: Some(arena.alloc("footer")),
            tail_letters: (0..3).map(|i| arena.alloc(format!("tail-letter-{i}"))).collect(),
            typed_letters: (0..3)
                .map(|i| arena.alloc_hidden(format!("typed-letter-{i}")))
                .collect(),
            stem: Some(arena.alloc("stem")),
            star: Some(arena.alloc("star")),
            stem_card: Some(arena.alloc_hidden("stem-card")),
            media_cards: (0..4).map(|i| arena.alloc(format!("media-card-{i}"))).collect(),
            logo_container: Some(arena.alloc("logo-container")),
            flower: Some(arena.alloc("flower")),
            word_path: Some(arena.alloc("word-path")),
            logo_star: Some(arena.alloc("logo-star")),
            photo: Some(arena.alloc("photo")),
            flash: Some(arena.alloc_hidden("photo-flash")),
            marker: arena.alloc_hidden("hero-marker"),
        };
        let hero = HeroSequence::new(hero_nodes, viewport.0, manifest.photos.clone());

        let label = label_node.map(|node| LabelTarget {
            text: manifest.label_text.clone(),
            layout: label_layout(viewport, &manifest.label_text),
            node: Some(node),
        });
        let field = ParticleField::new(&config, tier, viewport, label, &mut arena, 0.0);
        let governor = Governor::new(&config);

        let player = CompactPlayer::new(
            config.player.clone(),
            deps.audio,
            manifest.tracks.clone(),
            (viewport.0 * WAVE_WIDTH_RATIO, WAVE_HEIGHT),
        );
        let waitlist = WaitlistForm::new(
            config.waitlist.clone(),
            deps.transport,
            manifest.form_present,
        )?;

        Ok(Self {
            clock: TickClock::new(),
            queue: StageEventQueue::new(),
            arena,
            scheduler: deps.scheduler,
            rng: deps.rng,
            tier,
            viewport,
            field,
            governor,
            preloader,
            hero,
            player,
            waitlist,
            label_text: manifest.label_text,
            label_present: manifest.label_present,
            user_agent: manifest.user_agent,
            referrer: manifest.referrer,
            page_url: manifest.page_url,
        })
    }

    /// Kicks off the preloader. Called once after construction.
    pub fn start(&mut self) {
        let now = self.clock.now();
        self.preloader
            .start(now, &mut self.arena, self.scheduler.as_mut(), &mut self.queue);
    }

    /// Advances the stage by `dt` seconds, in a fixed order: clock, the
    /// scheduler, event absorption, component timers, and finally the
    /// stage event queue.
    pub fn tick(&mut self, dt: f64) {
        self.clock.advance(dt);
        let now = self.clock.now();

        let events = self.scheduler.tick(dt as f32, &mut self.arena);
        self.preloader.absorb(&events, now, &mut self.queue);
        self.hero
            .absorb(&events, now, &mut self.arena, self.scheduler.as_mut());
        if let Some(field) = &mut self.field {
            field.absorb(&events, &mut self.arena);
        }

        self.preloader.tick(
            now,
            self.scheduler.as_mut(),
            &mut self.queue,
            self.rng.as_mut(),
        );
        self.hero.tick(now, &mut self.arena, self.scheduler.as_mut());
        self.governor.tick(now, self.field.as_mut(), &mut self.queue);
        if !self.governor.is_hidden() {
            if let Some(field) = &mut self.field {
                field.tick(
                    now,
                    &mut self.arena,
                    self.scheduler.as_mut(),
                    self.rng.as_mut(),
                );
            }
        }
        self.player.tick(now);
        self.waitlist.tick(now);

        for event in self.queue.drain() {
            match event {
                StageEvent::ContentReady => {
                    self.hero.play(&mut self.arena, self.scheduler.as_mut());
                }
                StageEvent::MaskRebuilt { points } => {
                    tracing::debug!(points, "anchor cloud refreshed");
                }
            }
        }
    }

    /// Routes one boundary event.
    pub fn handle(&mut self, event: InputEvent) {
        let now = self.clock.now();
        match event {
            InputEvent::PointerDown { x, y } => {
                if self.governor.is_hidden() {
                    return;
                }
                if let Some(field) = &mut self.field {
                    field.pointer_pressed(x, y, now, self.scheduler.as_mut(), self.rng.as_mut());
                }
            }
            InputEvent::KeyDown {
                key,
                focus_on_body,
            } => self.player.key(key, focus_on_body),
            InputEvent::Resized { width, height } => {
                self.viewport = (width, height);
                let layout = self
                    .label_present
                    .then(|| label_layout(self.viewport, &self.label_text));
                self.governor.viewport_resized(width, height, layout, now);
                self.hero.viewport_resized(width);
                self.player
                    .viewport_resized(width * WAVE_WIDTH_RATIO, WAVE_HEIGHT, now);
            }
            InputEvent::VisibilityChanged { hidden } => {
                self.governor.visibility_changed(
                    hidden,
                    now,
                    self.field.as_mut(),
                    &mut self.arena,
                    self.scheduler.as_mut(),
                );
            }
            InputEvent::LoadFinished => self.preloader.loaded(),
            InputEvent::FontsReady => {
                if let Some(field) = &mut self.field {
                    field.fonts_ready(now, &mut self.queue);
                }
            }
            InputEvent::WaveSeek { fraction } => self.player.seek_to_fraction(fraction, now),
            InputEvent::WaitlistSubmit { email } => {
                let meta = SubmissionMeta {
                    client_timestamp: format!("{now:.3}"),
                    user_agent: self.user_agent.clone(),
                    referrer: self.referrer.clone(),
                    page_url: self.page_url.clone(),
                    honeypot: String::new(),
                };
                let outcome = self.waitlist.submit(now, &email, meta);
                if outcome != SubmitOutcome::Accepted {
                    tracing::debug!(?outcome, "waitlist submission not dispatched");
                }
            }
            InputEvent::WaitlistInputEdited => self.waitlist.input_edited(),
            InputEvent::WaitlistDismissed => self.waitlist.dismiss(),
        }
    }

    /// Cancels every timer and in-flight transition and sweeps the pool.
    pub fn teardown(&mut self) {
        tracing::info!("stage teardown");
        self.hero.stop();
        if let Some(field) = &mut self.field {
            field.pause();
            field.sweep(&mut self.arena, self.scheduler.as_mut());
        }
        self.scheduler.cancel_all();
        let _ = self.queue.drain();
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// The density tier the stage classified itself into.
    #[must_use]
    pub const fn tier(&self) -> DensityTier {
        self.tier
    }

    /// Field counters, absent when the tier disables the field.
    #[must_use]
    pub fn field_stats(&self) -> Option<FieldStats> {
        self.field.as_ref().map(ParticleField::stats)
    }

    /// Current waitlist state.
    #[must_use]
    pub fn waitlist_status(&self) -> &WaitlistStatus {
        self.waitlist.status()
    }

    /// Current preloader phase.
    #[must_use]
    pub fn preloader_phase(&self) -> PreloaderPhase {
        self.preloader.phase()
    }

    /// Whether the hero sequence reached its ambient loops.
    #[must_use]
    pub fn hero_is_running(&self) -> bool {
        self.hero.is_running()
    }

    /// The player widget.
    #[must_use]
    pub fn player(&self) -> &CompactPlayer {
        &self.player
    }

    /// Transitions currently scheduled or running.
    #[must_use]
    pub fn active_motions(&self) -> usize {
        self.scheduler.active_count()
    }
}

/// Estimates the label's measured box from the viewport. The embedder
/// replaces this with real metrics through resize events; the estimate
/// only seeds the first mask.
fn label_layout(viewport: (f32, f32), text: &str) -> LabelLayout {
    let font_size = (viewport.0 * 0.1).clamp(48.0, 200.0);
    let width = text.chars().count() as f32 * font_size * 7.0 / 6.0;
    let height = font_size * 1.4;
    LabelLayout {
        left: (viewport.0 - width) / 2.0,
        top: viewport.1 * 0.3,
        width,
        height,
        font_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardust_core::SeededRandom;
    use stardust_motion::scheduler::TweenEngine;
    use stardust_page::{SilentAudio, Submission, TransportError, WaitlistResponse};

    struct NullTransport;
    impl WaitlistTransport for NullTransport {
        fn submit(
            &self,
            _endpoint: &str,
            _submission: &Submission,
        ) -> Result<WaitlistResponse, TransportError> {
            Ok(WaitlistResponse::default())
        }
    }

    fn deps() -> StageDeps {
        StageDeps {
            rng: Box::new(SeededRandom::new(7)),
            scheduler: Box::new(TweenEngine::new()),
            transport: Arc::new(NullTransport),
            audio: Box::new(SilentAudio),
        }
    }

    #[test]
    fn test_desktop_stage_has_a_field() {
        let stage = Stage::new(
            StageConfig::default(),
            &DeviceProfile::desktop(1920.0, 1080.0),
            PageManifest::default(),
            deps(),
        )
        .unwrap();
        assert_eq!(stage.tier(), DensityTier::High);
        assert_eq!(stage.field_stats().unwrap().capacity, 900);
    }

    #[test]
    fn test_handheld_stage_has_no_field() {
        let mut profile = DeviceProfile::desktop(1920.0, 1080.0);
        profile.is_handheld = true;
        let stage = Stage::new(
            StageConfig::default(),
            &profile,
            PageManifest::default(),
            deps(),
        )
        .unwrap();
        assert!(stage.field_stats().is_none());
    }

    #[test]
    fn test_teardown_clears_motions() {
        let mut stage = Stage::new(
            StageConfig::default(),
            &DeviceProfile::desktop(1440.0, 900.0),
            PageManifest::default(),
            deps(),
        )
        .unwrap();
        stage.start();
        stage.handle(InputEvent::FontsReady);
        for _ in 0..40 {
            stage.tick(0.05);
        }
        assert!(stage.active_motions() > 0);

        stage.teardown();
        assert_eq!(stage.active_motions(), 0);
        assert_eq!(stage.field_stats().unwrap().active, 0);
    }

    #[test]
    fn test_label_layout_is_centered() {
        let layout = label_layout((1920.0, 1080.0), "Stardust");
        assert!(layout.left > 0.0);
        assert!((layout.left * 2.0 + layout.width - 1920.0).abs() < 1.0);
        assert!((layout.font_size - 192.0).abs() < 1e-4);
    }
}
