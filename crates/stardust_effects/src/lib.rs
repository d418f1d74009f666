//! # Stardust Effects
//!
//! The particle engine behind the hero text: a fixed pool of reusable
//! particle slots, a text mask sampler that turns the rendered label into
//! an anchor point cloud, several independently-timed emitters, and the
//! governor that pauses everything while the page is hidden.
//!
//! ## Design Philosophy
//!
//! Emission is best-effort: an emitter that finds no free slot silently
//! skips that request. There is no queueing and no backpressure; the pool
//! capacity is the density ceiling, chosen per tier.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod emitter;
pub mod field;
pub mod governor;
pub mod mask;
pub mod profile;
pub mod variant;

pub use emitter::{EmissionKind, EmitterBank, PendingEmission};
pub use field::{FieldStats, LabelTarget, ParticleField, ParticleSlot};
pub use governor::Governor;
pub use mask::{LabelLayout, MaskPoint, PointCloud, TextMaskSampler};
pub use variant::ParticleVariant;
