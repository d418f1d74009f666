//! # Stardust
//!
//! The animated runtime of a marketing landing stage: a preloader, a hero
//! animation sequence, a decorative particle field, a compact audio player
//! and an email waitlist form, all driven by one cooperative tick clock
//! inside an explicit [`Stage`] context.
//!
//! ## Design Philosophy
//!
//! - **One context object.** The stage owns every timer, pool and node.
//!   Nothing reads ambient time, randomness or globals; tests construct a
//!   stage with seeded deps and drive the clock by hand.
//! - **Capabilities at the seams.** The animation engine, audio backend
//!   and waitlist endpoint are traits chosen at construction.
//! - **Graceful degradation.** A missing page element disables exactly one
//!   feature, with a log line. Nothing is fatal to the stage.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod input;
pub mod stage;

pub use input::InputEvent;
pub use stage::{PageManifest, Stage, StageDeps, StageError};

// The crates behind the stage, re-exported for embedders and tests.
pub use stardust_core as core;
pub use stardust_effects as effects;
pub use stardust_motion as motion;
pub use stardust_page as page;
