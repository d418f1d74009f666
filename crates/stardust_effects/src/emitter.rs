//! Emission scheduling.
//!
//! Five periodic emitters plus the pointer burst, each producing a batch of
//! time-staggered emission requests per firing. The bank only generates
//! requests; acquiring slots and starting profiles is the field's job, so a
//! request whose due time arrives after the pool fills is simply dropped.

use stardust_core::{Countdown, FieldConfig, Interval, RandomSource};

use crate::mask::{LabelLayout, PointCloud};

/// What kind of particle a request wants and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionKind {
    /// Ambient particle. `None` means a random viewport position.
    Ambient {
        /// Explicit spawn position, if the emitter picked one.
        at: Option<(f32, f32)>,
    },
    /// Anchor-seeded particle at a jittered mask point.
    Anchor {
        /// Horizontal spawn coordinate.
        x: f32,
        /// Vertical spawn coordinate.
        y: f32,
    },
}

/// One emission request waiting for its due time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingEmission {
    /// Virtual time at which the request becomes due.
    pub due: f64,
    /// The request itself.
    pub kind: EmissionKind,
}

/// The five periodic emitters.
///
/// Intervals interleave by due time; there is no cross-emitter ordering
/// beyond that. Pausing the bank silences every interval and drops nothing
/// retroactively.
#[derive(Debug)]
pub struct EmitterBank {
    ambient: Interval,
    field_burst: Interval,
    text_burst: Interval,
    anchor_drip: Interval,
    halo: Interval,
    /// Armed when a fresh mask arrives; fires the first text burst early.
    first_text_burst: Countdown,
}

impl EmitterBank {
    /// Creates the bank with every interval anchored at `now`.
    #[must_use]
    pub fn new(config: &FieldConfig, now: f64) -> Self {
        Self {
            ambient: Interval::new(config.ambient_interval, now),
            field_burst: Interval::new(config.burst_interval, now),
            text_burst: Interval::new(config.text_burst_interval, now),
            anchor_drip: Interval::new(config.drip_interval, now),
            halo: Interval::new(config.halo_interval, now),
            first_text_burst: Countdown::new(),
        }
    }

    /// Arms the one-shot early text burst after a mask rebuild.
    pub fn mask_ready(&mut self, now: f64, delay: f64) {
        self.first_text_burst.arm(now, delay);
    }

    /// Suspends every interval.
    pub fn pause(&mut self) {
        self.ambient.pause();
        self.field_burst.pause();
        self.text_burst.pause();
        self.anchor_drip.pause();
        self.halo.pause();
        self.first_text_burst.cancel();
    }

    /// Resumes every interval from a clean anchor; no catch-up firings.
    pub fn resume(&mut self, now: f64) {
        self.ambient.resume(now);
        self.field_burst.resume(now);
        self.text_burst.resume(now);
        self.anchor_drip.resume(now);
        self.halo.resume(now);
    }

    /// Polls every emitter and returns the requests that fired.
    ///
    /// Anchor-seeded emitters are inert while `cloud` is absent or empty;
    /// the halo scatter is inert without a label box. Neither is an error.
    pub fn tick(
        &mut self,
        now: f64,
        config: &FieldConfig,
        cloud: Option<&PointCloud>,
        label_box: Option<&LabelLayout>,
        rng: &mut dyn RandomSource,
    ) -> Vec<PendingEmission> {
        let mut out = Vec::new();

        for _ in 0..self.ambient.due(now) {
            for i in 0..config.ambient_count {
                out.push(PendingEmission {
                    due: now + f64::from(i) * config.ambient_stagger,
                    kind: EmissionKind::Ambient { at: None },
                });
            }
        }

        for _ in 0..self.field_burst.due(now) {
            for i in 0..config.burst_count {
                out.push(PendingEmission {
                    due: now + f64::from(i) * config.burst_stagger,
                    kind: EmissionKind::Ambient { at: None },
                });
            }
        }

        let mut text_bursts = self.text_burst.due(now);
        if self.first_text_burst.fire(now) {
            text_bursts += 1;
        }
        if let Some(cloud) = cloud.filter(|c| !c.is_empty()) {
            for _ in 0..text_bursts {
                self.push_text_burst(&mut out, now, config, cloud, rng);
            }

            for _ in 0..self.anchor_drip.due(now) {
                for i in 0..config.drip_count {
                    if let Some(point) = cloud.get(rng.index(cloud.len())) {
                        out.push(PendingEmission {
                            due: now + f64::from(i) * config.drip_stagger,
                            kind: EmissionKind::Anchor {
                                x: point.x + rng.jitter(config.drip_spread),
                                y: point.y + rng.jitter(config.drip_spread),
                            },
                        });
                    }
                }
            }
        } else {
            // Drain the counters so a late mask doesn't trigger a backlog.
            let _ = self.anchor_drip.due(now);
        }

        if let Some(label_box) = label_box {
            for _ in 0..self.halo.due(now) {
                for i in 0..config.halo_count {
                    let x = label_box.left + rng.jitter(label_box.width * config.halo_extent);
                    let y = label_box.top + rng.jitter(label_box.height * config.halo_extent);
                    out.push(PendingEmission {
                        due: now + f64::from(i) * config.halo_stagger,
                        kind: EmissionKind::Ambient { at: Some((x, y)) },
                    });
                }
            }
        } else {
            let _ = self.halo.due(now);
        }

        out
    }

    /// A full text burst: sample the cloud, emit in staggered batches.
    fn push_text_burst(
        &self,
        out: &mut Vec<PendingEmission>,
        now: f64,
        config: &FieldConfig,
        cloud: &PointCloud,
        rng: &mut dyn RandomSource,
    ) {
        let samples = config.text_burst_samples.min(cloud.len());
        let batch = config.text_burst_batch.max(1);
        for i in 0..samples {
            if let Some(point) = cloud.get(rng.index(cloud.len())) {
                out.push(PendingEmission {
                    due: now + (i / batch) as f64 * config.text_burst_gap,
                    kind: EmissionKind::Anchor {
                        x: point.x + rng.jitter(config.text_burst_spread),
                        y: point.y + rng.jitter(config.text_burst_spread),
                    },
                });
            }
        }
    }

    /// Pointer burst: a dense scatter around the press position. Not tied
    /// to any interval; called straight from input handling.
    pub fn pointer_burst(
        config: &FieldConfig,
        now: f64,
        x: f32,
        y: f32,
        rng: &mut dyn RandomSource,
    ) -> Vec<PendingEmission> {
        (0..config.pointer_count)
            .map(|i| PendingEmission {
                due: now + f64::from(i) * config.pointer_stagger,
                kind: EmissionKind::Ambient {
                    at: Some((
                        x + rng.jitter(config.pointer_spread),
                        y + rng.jitter(config.pointer_spread),
                    )),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stardust_core::{DensityTier, MaskConfig, SeededRandom};

    use crate::mask::TextMaskSampler;

    fn cloud() -> PointCloud {
        let layout = LabelLayout {
            left: 100.0,
            top: 100.0,
            width: 400.0,
            height: 120.0,
            font_size: 100.0,
        };
        TextMaskSampler::new(MaskConfig::default()).rebuild("STAR", &layout, DensityTier::High)
    }

    #[test]
    fn test_ambient_cadence() {
        let config = FieldConfig::default();
        let mut bank = EmitterBank::new(&config, 0.0);
        let mut rng = SeededRandom::new(1);

        // One ambient period: exactly one firing of ambient_count requests.
        let out = bank.tick(0.08, &config, None, None, &mut rng);
        assert_eq!(out.len(), config.ambient_count as usize);
        // Staggered within the firing.
        assert!(out[1].due > out[0].due);
    }

    #[test]
    fn test_anchor_emitters_inert_without_cloud() {
        let config = FieldConfig::default();
        let mut bank = EmitterBank::new(&config, 0.0);
        let mut rng = SeededRandom::new(2);

        let out = bank.tick(6.0, &config, None, None, &mut rng);
        assert!(out
            .iter()
            .all(|p| matches!(p.kind, EmissionKind::Ambient { .. })));
    }

    #[test]
    fn test_text_burst_batches() {
        let config = FieldConfig::default();
        let mut bank = EmitterBank::new(&config, 0.0);
        let mut rng = SeededRandom::new(3);
        let cloud = cloud();

        bank.mask_ready(0.0, 1.0);
        let out = bank.tick(1.0, &config, Some(&cloud), None, &mut rng);
        let anchors: Vec<_> = out
            .iter()
            .filter(|p| matches!(p.kind, EmissionKind::Anchor { .. }))
            .collect();
        assert_eq!(anchors.len(), config.text_burst_samples.min(cloud.len()));
        // Batches share a due time; later batches come later.
        assert!(anchors[0].due < anchors[anchors.len() - 1].due);
    }

    #[test]
    fn test_paused_bank_emits_nothing() {
        let config = FieldConfig::default();
        let mut bank = EmitterBank::new(&config, 0.0);
        let mut rng = SeededRandom::new(4);

        bank.pause();
        let out = bank.tick(30.0, &config, Some(&cloud()), None, &mut rng);
        assert!(out.is_empty());

        // Resume re-anchors; the next period fires again.
        bank.resume(30.0);
        let out = bank.tick(30.0 + config.ambient_interval, &config, None, None, &mut rng);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_pointer_burst_count_and_spread() {
        let config = FieldConfig::default();
        let mut rng = SeededRandom::new(5);
        let out = EmitterBank::pointer_burst(&config, 1.0, 500.0, 400.0, &mut rng);
        assert_eq!(out.len(), config.pointer_count as usize);
        for p in &out {
            let EmissionKind::Ambient { at: Some((x, y)) } = p.kind else {
                panic!("pointer bursts are positioned ambient requests");
            };
            assert!((x - 500.0).abs() <= config.pointer_spread / 2.0);
            assert!((y - 400.0).abs() <= config.pointer_spread / 2.0);
        }
    }
}
