//! Easing curves matching the page's motion language.
//!
//! The power family is numbered the way designers speak about it:
//! `PowerOut(2)` is the familiar "power2.out" cubic settle. Back easing
//! carries its overshoot amount so call sites read like the motion spec
//! they were tuned against.

/// Easing function applied to normalized progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Straight interpolation.
    Linear,
    /// Accelerating polynomial; `PowerIn(2)` is cubic.
    PowerIn(u8),
    /// Decelerating polynomial; the stage default.
    PowerOut(u8),
    /// Symmetric polynomial ease.
    PowerInOut(u8),
    /// Sine acceleration.
    SineIn,
    /// Sine deceleration.
    SineOut,
    /// Symmetric sine ease, used by the floating loops.
    SineInOut,
    /// Anticipation pull-back with the given overshoot amount.
    BackIn(f32),
    /// Overshooting settle with the given overshoot amount.
    BackOut(f32),
    /// No interpolation: jumps to the end state.
    Instant,
}

impl Default for Easing {
    fn default() -> Self {
        Self::PowerOut(2)
    }
}

impl Easing {
    /// Applies the curve to a progress value, clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::PowerIn(power) => t.powi(Self::exponent(power)),
            Self::PowerOut(power) => 1.0 - (1.0 - t).powi(Self::exponent(power)),
            Self::PowerInOut(power) => {
                let exp = Self::exponent(power);
                if t < 0.5 {
                    0.5 * (2.0 * t).powi(exp)
                } else {
                    1.0 - 0.5 * (2.0 - 2.0 * t).powi(exp)
                }
            }
            Self::SineIn => 1.0 - (t * std::f32::consts::FRAC_PI_2).cos(),
            Self::SineOut => (t * std::f32::consts::FRAC_PI_2).sin(),
            Self::SineInOut => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Self::BackIn(overshoot) => {
                let s = overshoot;
                (s + 1.0) * t * t * t - s * t * t
            }
            Self::BackOut(overshoot) => {
                let s = overshoot;
                let u = t - 1.0;
                1.0 + (s + 1.0) * u * u * u + s * u * u
            }
            Self::Instant => 1.0,
        }
    }

    /// `power1` is quadratic, `power2` cubic, `power4` quintic.
    fn exponent(power: u8) -> i32 {
        i32::from(power.clamp(1, 8)) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        let curves = [
            Easing::Linear,
            Easing::PowerIn(2),
            Easing::PowerOut(2),
            Easing::PowerInOut(4),
            Easing::SineIn,
            Easing::SineOut,
            Easing::SineInOut,
            Easing::BackOut(1.7),
        ];
        for curve in curves {
            assert!(curve.apply(0.0).abs() < 1e-5, "{curve:?} at 0");
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-5, "{curve:?} at 1");
        }
    }

    #[test]
    fn test_power_out_decelerates() {
        // Halfway through, a decelerating curve is past the halfway value.
        assert!(Easing::PowerOut(2).apply(0.5) > 0.5);
        assert!(Easing::PowerIn(2).apply(0.5) < 0.5);
    }

    #[test]
    fn test_back_out_overshoots() {
        let mut peak: f32 = 0.0;
        for i in 0..=100 {
            peak = peak.max(Easing::BackOut(1.7).apply(i as f32 / 100.0));
        }
        assert!(peak > 1.0, "back.out must overshoot: {peak}");
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert!((Easing::PowerOut(2).apply(1.5) - 1.0).abs() < 1e-6);
        assert!(Easing::PowerOut(2).apply(-0.5).abs() < 1e-6);
    }
}
