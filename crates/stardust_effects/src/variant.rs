//! Visual particle variants.
//!
//! The variant only picks a class tag; sizing and color live in CSS. The
//! anchor-seeded roll is weighted toward the plain dust so sparkles stay
//! rare enough to read as accents.

use stardust_core::RandomSource;

/// Visual weight class of one particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleVariant {
    /// The plain default mote.
    Dust,
    /// Smallest mote.
    Tiny,
    /// Larger mote.
    Medium,
    /// Bright accent.
    Sparkle,
    /// Blue-tinted accent.
    BlueSparkle,
    /// Pink-tinted accent.
    PinkSparkle,
}

impl ParticleVariant {
    /// Class tag applied to the particle node.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Dust => "magic-particle",
            Self::Tiny => "magic-particle tiny",
            Self::Medium => "magic-particle medium",
            Self::Sparkle => "magic-particle sparkle",
            Self::BlueSparkle => "magic-particle blue-sparkle",
            Self::PinkSparkle => "magic-particle pink-sparkle",
        }
    }

    /// Weighted roll for anchor-seeded particles.
    ///
    /// Weights: tiny 20%, dust 30%, medium 20%, sparkle 15%, blue 8%,
    /// pink 7%.
    pub fn roll_anchor(rng: &mut dyn RandomSource) -> Self {
        let roll = rng.unit();
        if roll < 0.2 {
            Self::Tiny
        } else if roll < 0.5 {
            Self::Dust
        } else if roll < 0.7 {
            Self::Medium
        } else if roll < 0.85 {
            Self::Sparkle
        } else if roll < 0.93 {
            Self::BlueSparkle
        } else {
            Self::PinkSparkle
        }
    }

    /// Uniform roll for ambient particles: no colored sparkles.
    pub fn roll_ambient(rng: &mut dyn RandomSource) -> Self {
        const AMBIENT: [ParticleVariant; 4] = [
            ParticleVariant::Tiny,
            ParticleVariant::Dust,
            ParticleVariant::Medium,
            ParticleVariant::Sparkle,
        ];
        AMBIENT[rng.index(AMBIENT.len())]
    }
}
