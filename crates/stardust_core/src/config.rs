//! # Stage Configuration
//!
//! One `StageConfig` is loaded (or defaulted) at startup and handed to the
//! stage constructor. Defaults are the production tuning constants; every
//! cadence that shipped as a magic number in the page lives here instead.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::tier::{DensityTier, TierThresholds};

/// Top-level configuration for the stage runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Density tier boundaries.
    pub tiers: TierThresholds,
    /// Particle field capacities and emitter cadences.
    pub field: FieldConfig,
    /// Text mask sampling parameters.
    pub mask: MaskConfig,
    /// Preloader timings and palette.
    pub preloader: PreloaderConfig,
    /// Compact player parameters.
    pub player: PlayerConfig,
    /// Waitlist endpoint and guards.
    pub waitlist: WaitlistConfig,
}

impl StageConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field invariants.
    pub fn validate(&self) -> CoreResult<()> {
        self.tiers.validate()?;
        self.field.validate()?;
        Ok(())
    }
}

/// Capacities and emitter cadences for the particle field.
///
/// Interval and stagger values are seconds; spreads are the full width of a
/// centered jitter window, in CSS pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Pool capacity on the low tier.
    pub capacity_low: usize,
    /// Pool capacity on the medium tier.
    pub capacity_medium: usize,
    /// Pool capacity on the high tier.
    pub capacity_high: usize,

    /// Ambient emitter period.
    pub ambient_interval: f64,
    /// Particles per ambient firing.
    pub ambient_count: u32,
    /// Stagger between ambient particles within one firing.
    pub ambient_stagger: f64,

    /// Field-wide burst period.
    pub burst_interval: f64,
    /// Particles per field burst.
    pub burst_count: u32,
    /// Stagger within a field burst.
    pub burst_stagger: f64,

    /// Text burst period.
    pub text_burst_interval: f64,
    /// Anchor points sampled per text burst.
    pub text_burst_samples: usize,
    /// Batch size within a text burst.
    pub text_burst_batch: usize,
    /// Gap between text burst batches.
    pub text_burst_gap: f64,
    /// Jitter window around each sampled anchor.
    pub text_burst_spread: f32,
    /// Delay between mask readiness and the first text burst.
    pub first_burst_delay: f64,

    /// Anchor drip period.
    pub drip_interval: f64,
    /// Anchors per drip.
    pub drip_count: u32,
    /// Stagger within a drip.
    pub drip_stagger: f64,
    /// Jitter window around each drip anchor.
    pub drip_spread: f32,

    /// Halo scatter period.
    pub halo_interval: f64,
    /// Particles per halo scatter.
    pub halo_count: u32,
    /// Stagger within a halo scatter.
    pub halo_stagger: f64,
    /// Halo extent as a multiple of the label box.
    pub halo_extent: f32,

    /// Particles per pointer burst.
    pub pointer_count: u32,
    /// Stagger within a pointer burst.
    pub pointer_stagger: f64,
    /// Jitter window around the pointer.
    pub pointer_spread: f32,

    /// Quiet window before a resize rebuilds the mask.
    pub resize_debounce: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            capacity_low: 300,
            capacity_medium: 600,
            capacity_high: 900,
            ambient_interval: 0.08,
            ambient_count: 4,
            ambient_stagger: 0.025,
            burst_interval: 3.0,
            burst_count: 60,
            burst_stagger: 0.03,
            text_burst_interval: 5.0,
            text_burst_samples: 120,
            text_burst_batch: 8,
            text_burst_gap: 0.06,
            text_burst_spread: 25.0,
            first_burst_delay: 1.0,
            drip_interval: 3.0,
            drip_count: 5,
            drip_stagger: 0.06,
            drip_spread: 30.0,
            halo_interval: 2.0,
            halo_count: 15,
            halo_stagger: 0.04,
            halo_extent: 3.0,
            pointer_count: 60,
            pointer_stagger: 0.012,
            pointer_spread: 200.0,
            resize_debounce: 0.1,
        }
    }
}

impl FieldConfig {
    /// Pool capacity for a tier. `None` disables the field.
    #[must_use]
    pub fn capacity(&self, tier: DensityTier) -> Option<usize> {
        match tier {
            DensityTier::Off => None,
            DensityTier::Low => Some(self.capacity_low),
            DensityTier::Medium => Some(self.capacity_medium),
            DensityTier::High => Some(self.capacity_high),
        }
    }

    fn validate(&self) -> CoreResult<()> {
        for (tier, capacity) in [
            ("low", self.capacity_low),
            ("medium", self.capacity_medium),
            ("high", self.capacity_high),
        ] {
            if capacity == 0 {
                return Err(CoreError::ZeroCapacity { tier });
            }
        }
        Ok(())
    }
}

/// Text mask sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Font size divided by this yields the base sampling stride.
    pub stride_divisor: f32,
    /// Lower bound on the sampling stride, in raster pixels.
    pub min_stride: u32,
    /// Coverage above this fraction counts a pixel as opaque.
    pub alpha_threshold: f32,
    /// Offscreen raster inflation around the measured label box.
    pub canvas_inflation: f32,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            stride_divisor: 70.0,
            min_stride: 2,
            alpha_threshold: 0.5,
            canvas_inflation: 1.5,
        }
    }
}

/// One gradient crossfade step of the preloader logo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteStop {
    /// First gradient stop, hex RGB like `"#FF9D53"`.
    pub warm: String,
    /// Second gradient stop.
    pub deep: String,
}

/// Preloader timings, destination coordinates and palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Minimum time the preloader stays up, regardless of load speed.
    pub min_display: f64,
    /// Period of the simulated progress counter.
    pub counter_interval: f64,
    /// Duration of the 0.95 to 1.0 completion ramp.
    pub ramp_duration: f64,
    /// Pause between the completion ramp and the exit animation.
    pub exit_delay: f64,
    /// Period of one palette crossfade.
    pub palette_step: f64,
    /// Gradient palette cycled while loading.
    pub palette: Vec<PaletteStop>,
    /// Destination latitude rendered at 100% progress. South is negative.
    pub dest_lat: f64,
    /// Destination longitude rendered at 100% progress.
    pub dest_lng: f64,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            min_display: 2.0,
            counter_interval: 0.1,
            ramp_duration: 0.5,
            exit_delay: 0.8,
            palette_step: 0.8,
            palette: vec![
                PaletteStop {
                    warm: "#FF9D53".to_string(),
                    deep: "#F56900".to_string(),
                },
                PaletteStop {
                    warm: "#E4D8CA".to_string(),
                    deep: "#D5C3AD".to_string(),
                },
                PaletteStop {
                    warm: "#8EF78D".to_string(),
                    deep: "#42E560".to_string(),
                },
                PaletteStop {
                    warm: "#BD98FA".to_string(),
                    deep: "#9960F7".to_string(),
                },
            ],
            dest_lat: -7.946,
            dest_lng: 14.375,
        }
    }
}

/// Compact player parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Horizontal distance between wave sample points, in pixels.
    pub wave_step: f32,
    /// Quiet window before a resize re-derives the wave.
    pub resize_debounce: f64,
    /// Window after a seek during which time updates are ignored.
    pub seek_guard: f64,
    /// Playback starts at `duration / start_divisor` once metadata loads.
    pub start_divisor: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            wave_step: 2.0,
            resize_debounce: 0.25,
            seek_guard: 0.1,
            start_divisor: 3.0,
        }
    }
}

/// Waitlist endpoint and local submission guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitlistConfig {
    /// The remote endpoint receiving the form post.
    pub endpoint: String,
    /// Minimum spacing between submissions, in seconds.
    pub debounce: f64,
    /// How long status messages stay up before auto-hiding.
    pub auto_hide: f64,
}

impl Default for WaitlistConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://hooks.stardust.example/waitlist".to_string(),
            debounce: 2.0,
            auto_hide: 5.0,
        }
    }
}
