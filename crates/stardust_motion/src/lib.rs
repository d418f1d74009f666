//! # Stardust Motion
//!
//! The animation capability the rest of the stage is written against:
//!
//! - [`NodeArena`] holds the DOM-like targets (position, opacity, scale,
//!   tint, visibility) that transitions drive.
//! - [`TweenSpec`] describes one timed property transition; [`Timeline`]
//!   composes them with relative placement and stagger.
//! - [`TransitionScheduler`] is the seam: [`TweenEngine`] interpolates,
//!   [`SnapScheduler`] applies end states immediately for degraded
//!   environments. The implementation is chosen once at construction,
//!   never per call.
//!
//! Completion is reported as [`MotionEvent`]s returned from `tick`, which
//! is how the particle pool learns a motion profile finished without any
//! callback plumbing.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod easing;
pub mod node;
pub mod scheduler;
pub mod timeline;
pub mod tween;

pub use easing::Easing;
pub use node::{Goal, NodeArena, NodeId, PropPatch, Rgb, VisualProps};
pub use scheduler::{SnapScheduler, TransitionScheduler, TweenEngine};
pub use timeline::{Position, Timeline};
pub use tween::{MotionEvent, MotionId, TweenSpec};
