//! # Density Tiers
//!
//! Coarse performance classification used to scale particle density, emitter
//! cadence and mask sampling on constrained devices. The classification runs
//! once at stage construction; there is no runtime re-tiering.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// What the stage knows about the device before animating.
#[derive(Debug, Clone, Copy)]
pub struct DeviceProfile {
    /// Viewport width in CSS pixels.
    pub viewport_w: f32,
    /// Viewport height in CSS pixels.
    pub viewport_h: f32,
    /// The primary pointer is coarse (touch).
    pub coarse_pointer: bool,
    /// Handheld user agent. The field is disabled entirely on handhelds.
    pub is_handheld: bool,
    /// The user asked for reduced data/CPU usage.
    pub save_data: bool,
}

impl DeviceProfile {
    /// A desktop profile, useful as a test fixture.
    #[must_use]
    pub fn desktop(viewport_w: f32, viewport_h: f32) -> Self {
        Self {
            viewport_w,
            viewport_h,
            coarse_pointer: false,
            is_handheld: false,
            save_data: false,
        }
    }
}

/// Viewport-width boundaries between tiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    /// Below this width the field is off entirely.
    pub off_below: f32,
    /// Below this width the low tier applies.
    pub low_below: f32,
    /// Below this width the medium tier applies; high otherwise.
    pub medium_below: f32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            off_below: 321.0,
            low_below: 768.0,
            medium_below: 1440.0,
        }
    }
}

impl TierThresholds {
    /// Validates that the boundaries increase.
    pub fn validate(&self) -> CoreResult<()> {
        if self.off_below < self.low_below && self.low_below < self.medium_below {
            Ok(())
        } else {
            Err(CoreError::TierThresholdOrder {
                off: self.off_below,
                low: self.low_below,
                medium: self.medium_below,
            })
        }
    }
}

/// Density tier. Scales pool capacity, emission counts and mask stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DensityTier {
    /// Field disabled: handhelds and very narrow viewports.
    Off,
    /// Constrained: reduced capacity, coarser mask.
    Low,
    /// Mid-size viewports.
    Medium,
    /// Wide viewports, full density.
    High,
}

impl DensityTier {
    /// Classifies a device against the configured thresholds.
    #[must_use]
    pub fn classify(profile: &DeviceProfile, thresholds: &TierThresholds) -> Self {
        if profile.is_handheld || profile.viewport_w < thresholds.off_below {
            return Self::Off;
        }
        if profile.save_data || profile.viewport_w < thresholds.low_below {
            return Self::Low;
        }
        if profile.viewport_w < thresholds.medium_below {
            return Self::Medium;
        }
        Self::High
    }

    /// Whether the field runs at all on this tier.
    #[must_use]
    pub const fn field_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Multiplier applied to the mask sampling stride: coarser on Low.
    #[must_use]
    pub const fn mask_coarseness(self) -> u32 {
        match self {
            Self::Off | Self::Low => 2,
            Self::Medium | Self::High => 1,
        }
    }
}
