//! The compact audio player widget.
//!
//! Audio decoding and output are a capability behind [`AudioSource`]; the
//! widget owns everything the page computed itself: the synthesized wave
//! geometry, the nearest-point playhead, track cycling, the loop toggle
//! and the seek guard that suppresses time-update echo right after a seek.

use stardust_core::{Countdown, Debounce, PlayerConfig};

/// Notifications drained from the audio backend once per tick.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioNotice {
    /// Track metadata arrived; duration is now known.
    MetadataLoaded {
        /// Track duration in seconds.
        duration: f64,
    },
    /// Playback position advanced.
    TimeUpdate {
        /// Current position in seconds.
        position: f64,
    },
    /// The track played to its end.
    Ended,
    /// Decoding or playback failed.
    Failed {
        /// Backend-supplied description.
        message: String,
    },
}

/// Capability boundary to the audio backend.
pub trait AudioSource {
    /// Loads a new source URL, discarding the current one.
    fn load(&mut self, src: &str);
    /// Starts or resumes playback.
    fn play(&mut self);
    /// Pauses playback.
    fn pause(&mut self);
    /// Seeks to an absolute position in seconds.
    fn seek(&mut self, position: f64);
    /// Sets whether the backend loops at end of track.
    fn set_looping(&mut self, looping: bool);
    /// Drains pending notifications.
    fn poll(&mut self) -> Vec<AudioNotice>;
}

/// Backend used when the page has no audio element: accepts every command
/// and reports nothing. The widget stays functional but silent.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioSource for SilentAudio {
    fn load(&mut self, _src: &str) {}
    fn play(&mut self) {}
    fn pause(&mut self) {}
    fn seek(&mut self, _position: f64) {}
    fn set_looping(&mut self, _looping: bool) {}
    fn poll(&mut self) -> Vec<AudioNotice> {
        Vec::new()
    }
}

/// One playlist entry.
#[derive(Debug, Clone)]
pub struct Track {
    /// Display title.
    pub title: String,
    /// Display artist.
    pub artist: String,
    /// Source URL handed to the backend.
    pub src: String,
}

/// Keys the player responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKey {
    /// Toggle play/pause; only honored when focus is on the stage body.
    Space,
    /// Next track.
    ArrowRight,
    /// Previous track.
    ArrowLeft,
}

/// The compact player.
pub struct CompactPlayer {
    config: PlayerConfig,
    audio: Box<dyn AudioSource>,
    tracks: Vec<Track>,
    current_track: usize,
    playing: bool,
    looping: bool,
    /// Whole seconds, the way the display rounds.
    total_time: u64,
    current_time: u64,
    wave: Vec<(f32, f32)>,
    playhead: (f32, f32),
    surface: (f32, f32),
    resize: Debounce,
    seek_guard: Countdown,
}

impl CompactPlayer {
    /// Creates the player over a backend and playlist. Looping starts on,
    /// matching the page default.
    #[must_use]
    pub fn new(
        config: PlayerConfig,
        mut audio: Box<dyn AudioSource>,
        tracks: Vec<Track>,
        surface: (f32, f32),
    ) -> Self {
        audio.set_looping(true);
        if let Some(track) = tracks.first() {
            audio.load(&track.src);
        }
        let resize = Debounce::new(config.resize_debounce);
        let mut player = Self {
            config,
            audio,
            tracks,
            current_track: 0,
            playing: false,
            looping: true,
            total_time: 0,
            current_time: 0,
            wave: Vec::new(),
            playhead: (0.0, 0.0),
            surface,
            resize,
            seek_guard: Countdown::new(),
        };
        player.rebuild_wave();
        player
    }

    /// Whether playback is running.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether end-of-track loops.
    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }

    /// Index of the current track.
    #[must_use]
    pub const fn current_track(&self) -> usize {
        self.current_track
    }

    /// The sampled wave geometry.
    #[must_use]
    pub fn wave_points(&self) -> &[(f32, f32)] {
        &self.wave
    }

    /// Playhead position, snapped to the nearest wave point.
    #[must_use]
    pub const fn playhead(&self) -> (f32, f32) {
        self.playhead
    }

    /// Playback progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_time == 0 {
            0.0
        } else {
            self.current_time as f64 / self.total_time as f64
        }
    }

    /// Current position rendered as `m:ss`.
    #[must_use]
    pub fn time_display(&self) -> String {
        format_time(self.current_time)
    }

    /// Toggles play/pause.
    pub fn toggle_play_pause(&mut self) {
        self.playing = !self.playing;
        if self.playing {
            self.audio.play();
        } else {
            self.audio.pause();
        }
    }

    /// Toggles looping; returns the new state.
    pub fn toggle_loop(&mut self) -> bool {
        self.looping = !self.looping;
        self.audio.set_looping(self.looping);
        self.looping
    }

    /// Keyboard control. Space is ignored unless focus is on the body, so
    /// typing in the waitlist input never toggles playback.
    pub fn key(&mut self, key: PlayerKey, focus_on_body: bool) {
        match key {
            PlayerKey::Space if focus_on_body => self.toggle_play_pause(),
            PlayerKey::Space => {}
            PlayerKey::ArrowRight => self.next_track(),
            PlayerKey::ArrowLeft => self.previous_track(),
        }
    }

    /// Advances to the next track, wrapping.
    pub fn next_track(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.current_track = (self.current_track + 1) % self.tracks.len();
        self.load_current();
    }

    /// Steps to the previous track, wrapping.
    pub fn previous_track(&mut self) {
        if self.tracks.is_empty() {
            return;
        }
        self.current_track = (self.current_track + self.tracks.len() - 1) % self.tracks.len();
        self.load_current();
    }

    fn load_current(&mut self) {
        self.playing = false;
        self.audio.pause();
        self.audio.load(&self.tracks[self.current_track].src);
        self.rebuild_wave();
    }

    /// Seek from a click on the wave, as a fraction of its width. A short
    /// guard window swallows the stale time updates that echo back.
    pub fn seek_to_fraction(&mut self, fraction: f64, now: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        let target = self.total_time as f64 * fraction;
        self.audio.seek(target);
        self.current_time = target as u64;
        self.seek_guard.arm(now, self.config.seek_guard);
        self.update_playhead();
    }

    /// The widget was resized; the wave re-derives after the quiet window.
    pub fn viewport_resized(&mut self, width: f32, height: f32, now: f64) {
        self.surface = (width, height);
        self.resize.poke(now);
    }

    /// One player tick: settle resizes, expire the seek guard, drain
    /// backend notices.
    pub fn tick(&mut self, now: f64) {
        if self.resize.ready(now) {
            self.rebuild_wave();
        }
        let _ = self.seek_guard.fire(now);
        for notice in self.audio.poll() {
            self.handle_notice(notice);
        }
    }

    fn handle_notice(&mut self, notice: AudioNotice) {
        match notice {
            AudioNotice::MetadataLoaded { duration } => {
                self.total_time = duration.max(0.0) as u64;
                // Start a third of the way in, where the track has opened up.
                let start = self.total_time as f64 / self.config.start_divisor;
                self.audio.seek(start);
                self.current_time = start as u64;
                self.update_playhead();
            }
            AudioNotice::TimeUpdate { position } => {
                if !self.seek_guard.is_armed() {
                    self.current_time = position.max(0.0) as u64;
                    self.update_playhead();
                }
            }
            AudioNotice::Ended => {
                if self.looping {
                    self.audio.seek(0.0);
                    self.current_time = 0;
                    self.audio.play();
                    self.update_playhead();
                } else {
                    self.next_track();
                }
            }
            AudioNotice::Failed { message } => {
                tracing::warn!(message, "audio playback failed");
                self.playing = false;
            }
        }
    }

    /// Samples the layered-sine wave across the widget width.
    fn rebuild_wave(&mut self) {
        let width = self.surface.0.max(60.0);
        let height = self.surface.1.max(20.0);
        let step = self.config.wave_step.max(0.5);

        self.wave.clear();
        let mut x = 0.0f32;
        while x <= width {
            self.wave.push((x, wave_y(x, width, height)));
            x += step;
        }
        self.update_playhead();
    }

    /// Snaps the playhead to the sampled point nearest the progress x.
    fn update_playhead(&mut self) {
        if self.wave.is_empty() {
            return;
        }
        let target_x = self.progress() as f32 * self.surface.0.max(60.0);
        let mut closest = self.wave[0];
        let mut best = (closest.0 - target_x).abs();
        for &point in &self.wave[1..] {
            let distance = (point.0 - target_x).abs();
            if distance < best {
                best = distance;
                closest = point;
            }
        }
        self.playhead = closest;
    }
}

/// Three layered sines under a sine envelope, centered on the widget.
fn wave_y(x: f32, width: f32, height: f32) -> f32 {
    use std::f32::consts::PI;
    let u = x / width;
    let wave1 = (u * PI * 3.0).sin() * 2.5;
    let wave2 = (u * PI * 6.0 + 1.0).sin() * 1.2;
    let wave3 = (u * PI * 9.0 + 2.0).sin() * 0.8;
    let envelope = (u * PI).sin() * 0.8 + 0.2;
    height / 2.0 + (wave1 + wave2 + wave3) * envelope
}

/// Renders whole seconds as `m:ss`.
fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
