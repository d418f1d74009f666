//! Mask sampling benchmark.
//!
//! The mask rebuilds on every settled resize; the raster scan must stay
//! well under a frame.

use criterion::{criterion_group, criterion_main, Criterion};
use stardust_core::{DensityTier, MaskConfig};
use stardust_effects::{LabelLayout, TextMaskSampler};

fn mask_rebuild(c: &mut Criterion) {
    let sampler = TextMaskSampler::new(MaskConfig::default());
    let layout = LabelLayout {
        left: 200.0,
        top: 300.0,
        width: 900.0,
        height: 180.0,
        font_size: 160.0,
    };

    c.bench_function("mask_rebuild_high_tier", |b| {
        b.iter(|| sampler.rebuild("STARDUST", &layout, DensityTier::High));
    });

    c.bench_function("mask_rebuild_low_tier", |b| {
        b.iter(|| sampler.rebuild("STARDUST", &layout, DensityTier::Low));
    });
}

criterion_group!(benches, mask_rebuild);
criterion_main!(benches);
