//! # Stardust Core
//!
//! The shared runtime under every stage component:
//! - A virtual tick clock and the timer primitives polled from it
//! - A fixed-capacity slot pool for reusable particle handles
//! - An injectable random source (entropy in production, seeded in tests)
//! - Density tiers, stage configuration, the stage event queue
//!
//! ## Design Philosophy
//!
//! One cooperative scheduling domain. Components never read ambient time or
//! ambient randomness; both are handed in by the stage so tests can drive
//! them explicitly.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod events;
pub mod pool;
pub mod rng;
pub mod tier;
pub mod time;

pub use config::{
    FieldConfig, MaskConfig, PlayerConfig, PreloaderConfig, StageConfig, WaitlistConfig,
};
pub use error::{CoreError, CoreResult};
pub use events::{StageEvent, StageEventQueue};
pub use pool::{SlotId, SlotPool};
pub use rng::{EntropyRandom, RandomSource, SeededRandom};
pub use tier::{DensityTier, DeviceProfile, TierThresholds};
pub use time::{Countdown, Debounce, Interval, TickClock};
