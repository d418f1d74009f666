//! Three-phase particle motion profiles.
//!
//! Every acquired slot plays the same shape: fade/scale in, a long upward
//! drift with horizontal wander, and a fade-out that overlaps the drift
//! tail. The fade-out entry is always pushed last, so the final id returned
//! by the scheduler is the one whose completion frees the slot.

use stardust_core::RandomSource;
use stardust_motion::easing::Easing;
use stardust_motion::node::{NodeId, PropPatch};
use stardust_motion::timeline::{Position, Timeline};
use stardust_motion::tween::TweenSpec;

/// Ambient profile: quick entrance, a 3-5 s drift, 1 s fade-out.
#[must_use]
pub fn ambient(node: NodeId, x: f32, y: f32, rng: &mut dyn RandomSource) -> Timeline {
    let mut tl = Timeline::new();
    tl.push(
        TweenSpec::to(node, PropPatch::new().opacity(0.7).scale(1.0), 0.3)
            .easing(Easing::PowerOut(2)),
        Position::Sequential,
    );
    tl.push(
        TweenSpec::to(
            node,
            PropPatch::new()
                .y(y - 60.0 - rng.unit() * 40.0)
                .x(x + rng.jitter(60.0)),
            3.0 + rng.unit() * 2.0,
        )
        .easing(Easing::PowerOut(1)),
        Position::At(0.0),
    );
    tl.push(
        TweenSpec::to(node, PropPatch::new().opacity(0.0).scale(0.5), 1.0)
            .easing(Easing::PowerIn(2)),
        Position::Overlap(1.0),
    );
    tl
}

/// Anchor profile: slower and brighter, 6-9 s drift, 2 s fade-out. Used for
/// particles seeded from the text mask so the label appears to shed light.
#[must_use]
pub fn anchor(node: NodeId, x: f32, y: f32, rng: &mut dyn RandomSource) -> Timeline {
    let mut tl = Timeline::new();
    tl.push(
        TweenSpec::to(node, PropPatch::new().opacity(0.9).scale(1.0), 0.4)
            .easing(Easing::PowerOut(2)),
        Position::Sequential,
    );
    tl.push(
        TweenSpec::to(
            node,
            PropPatch::new()
                .y(y - 25.0 - rng.unit() * 20.0)
                .x(x + rng.jitter(50.0)),
            6.0 + rng.unit() * 3.0,
        )
        .easing(Easing::PowerOut(1)),
        Position::At(0.0),
    );
    tl.push(
        TweenSpec::to(node, PropPatch::new().opacity(0.0).scale(0.5), 2.0)
            .easing(Easing::PowerIn(2)),
        Position::Overlap(2.0),
    );
    tl
}

/// Upper bound on any profile's span, in seconds. A slot acquired now is
/// guaranteed free again within this much virtual time.
pub const MAX_PROFILE_SPAN: f64 = 9.0;
