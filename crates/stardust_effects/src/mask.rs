//! The text mask sampler.
//!
//! Renders the hero label onto an offscreen grayscale raster, scans it at a
//! stride derived from the font size and the density tier, and collects the
//! screen-space coordinates of covered pixels. The resulting point cloud is
//! what makes particles appear to emanate from the text.
//!
//! Clouds are regenerated wholesale on font readiness and on debounced
//! resize; a stale cloud is discarded, never patched.

use stardust_core::{DensityTier, MaskConfig};

/// Measured layout of the label element, in screen-space CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    /// Left edge of the label box.
    pub left: f32,
    /// Top edge of the label box.
    pub top: f32,
    /// Width of the label box.
    pub width: f32,
    /// Height of the label box.
    pub height: f32,
    /// Computed font size, in pixels.
    pub font_size: f32,
}

/// One emission anchor in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskPoint {
    /// Horizontal screen coordinate.
    pub x: f32,
    /// Vertical screen coordinate.
    pub y: f32,
}

/// Sparse set of anchor points sampled from the rendered label.
///
/// Read-only to emitters between regenerations.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    points: Vec<MaskPoint>,
}

impl PointCloud {
    /// Number of anchor points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Borrows a point by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<MaskPoint> {
        self.points.get(index).copied()
    }

    /// Iterates over every anchor point.
    pub fn iter(&self) -> impl Iterator<Item = MaskPoint> + '_ {
        self.points.iter().copied()
    }
}

/// 6x6 bitmap face used for the offscreen raster, one row per byte, the low
/// six bits left-to-right. Uppercase Latin only; the label is rendered
/// case-folded. Anything outside A-Z advances the pen without marking.
const GLYPHS_6X6: [[u8; 6]; 26] = [
    // A
    [0b001100, 0b010010, 0b100001, 0b111111, 0b100001, 0b100001],
    // B
    [0b111110, 0b100001, 0b111110, 0b100001, 0b100001, 0b111110],
    // C
    [0b011110, 0b100001, 0b100000, 0b100000, 0b100001, 0b011110],
    // D
    [0b111100, 0b100010, 0b100001, 0b100001, 0b100010, 0b111100],
    // E
    [0b111111, 0b100000, 0b111110, 0b100000, 0b100000, 0b111111],
    // F
    [0b111111, 0b100000, 0b111110, 0b100000, 0b100000, 0b100000],
    // G
    [0b011110, 0b100000, 0b100111, 0b100001, 0b100001, 0b011110],
    // H
    [0b100001, 0b100001, 0b111111, 0b100001, 0b100001, 0b100001],
    // I
    [0b011100, 0b001000, 0b001000, 0b001000, 0b001000, 0b011100],
    // J
    [0b000111, 0b000010, 0b000010, 0b000010, 0b100010, 0b011100],
    // K
    [0b100010, 0b100100, 0b111000, 0b100100, 0b100010, 0b100001],
    // L
    [0b100000, 0b100000, 0b100000, 0b100000, 0b100000, 0b111111],
    // M
    [0b100001, 0b110011, 0b101101, 0b100001, 0b100001, 0b100001],
    // N
    [0b100001, 0b110001, 0b101001, 0b100101, 0b100011, 0b100001],
    // O
    [0b011110, 0b100001, 0b100001, 0b100001, 0b100001, 0b011110],
    // P
    [0b111110, 0b100001, 0b111110, 0b100000, 0b100000, 0b100000],
    // Q
    [0b011110, 0b100001, 0b100001, 0b100101, 0b100010, 0b011101],
    // R
    [0b111110, 0b100001, 0b111110, 0b100100, 0b100010, 0b100001],
    // S
    [0b011111, 0b100000, 0b011110, 0b000001, 0b000001, 0b111110],
    // T
    [0b111110, 0b001000, 0b001000, 0b001000, 0b001000, 0b001000],
    // U
    [0b100001, 0b100001, 0b100001, 0b100001, 0b100001, 0b011110],
    // V
    [0b100001, 0b100001, 0b100001, 0b010010, 0b010010, 0b001100],
    // W
    [0b100001, 0b100001, 0b100001, 0b101101, 0b110011, 0b100001],
    // X
    [0b100001, 0b010010, 0b001100, 0b001100, 0b010010, 0b100001],
    // Y
    [0b100010, 0b010100, 0b001000, 0b001000, 0b001000, 0b001000],
    // Z
    [0b111111, 0b000010, 0b000100, 0b001000, 0b010000, 0b111111],
];

/// Glyph cells per advance: 6 for the glyph plus 1 of spacing.
const GLYPH_ADVANCE: usize = 7;

/// Samples anchor points from an offscreen rendering of the label.
#[derive(Debug, Clone)]
pub struct TextMaskSampler {
    config: MaskConfig,
}

impl TextMaskSampler {
    /// Creates a sampler with the given mask parameters.
    #[must_use]
    pub fn new(config: MaskConfig) -> Self {
        Self { config }
    }

    /// Sampling stride in raster pixels for a font size and tier.
    #[must_use]
    pub fn stride(&self, font_size: f32, tier: DensityTier) -> usize {
        let base = (font_size / self.config.stride_divisor).floor() as u32;
        (base.max(self.config.min_stride) * tier.mask_coarseness()) as usize
    }

    /// Rebuilds the point cloud for a label at the given layout.
    ///
    /// The raster is inflated around the measured box the way the page's
    /// offscreen canvas was, so sampled coordinates map back into screen
    /// space with a constant offset. An empty label or a degenerate layout
    /// yields an empty cloud.
    #[must_use]
    pub fn rebuild(&self, label: &str, layout: &LabelLayout, tier: DensityTier) -> PointCloud {
        let canvas_w = (layout.width * self.config.canvas_inflation).ceil() as usize;
        let canvas_h = (layout.height * self.config.canvas_inflation).ceil() as usize;
        if canvas_w == 0 || canvas_h == 0 || label.is_empty() {
            return PointCloud::default();
        }

        let raster = rasterize(label, layout.font_size, canvas_w, canvas_h);

        let stride = self.stride(layout.font_size, tier).max(1);
        let threshold = self.config.alpha_threshold;
        let offset_x = layout.left - (canvas_w as f32 - layout.width) / 2.0;
        let offset_y = layout.top - (canvas_h as f32 - layout.height) / 2.0;

        let mut points = Vec::new();
        let mut y = 0usize;
        while y < canvas_h {
            let mut x = 0usize;
            while x < canvas_w {
                let coverage = f32::from(raster[y * canvas_w + x]) / 255.0;
                if coverage > threshold {
                    points.push(MaskPoint {
                        x: offset_x + x as f32,
                        y: offset_y + y as f32,
                    });
                }
                x += stride;
            }
            y += stride;
        }

        tracing::debug!(label, points = points.len(), stride, "rebuilt text mask");
        PointCloud { points }
    }
}

/// Draws the label centered on a coverage raster. Cells are filled at full
/// coverage; the threshold comparison happens at sampling time.
fn rasterize(label: &str, font_size: f32, canvas_w: usize, canvas_h: usize) -> Vec<u8> {
    let mut raster = vec![0u8; canvas_w * canvas_h];

    // One glyph cell in raster pixels. A 6-cell glyph spans the font size.
    let cell = (font_size / 6.0).max(1.0);
    let glyph_count = label.chars().count();
    let text_w = (glyph_count * GLYPH_ADVANCE).saturating_sub(1) as f32 * cell;
    let text_h = 6.0 * cell;
    let origin_x = (canvas_w as f32 - text_w) / 2.0;
    let origin_y = (canvas_h as f32 - text_h) / 2.0;

    for (index, ch) in label.chars().enumerate() {
        let Some(glyph) = glyph_for(ch) else {
            continue;
        };
        let pen_x = origin_x + (index * GLYPH_ADVANCE) as f32 * cell;
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..6 {
                if bits & (1 << (5 - col)) == 0 {
                    continue;
                }
                fill_cell(
                    &mut raster,
                    canvas_w,
                    canvas_h,
                    pen_x + col as f32 * cell,
                    origin_y + row as f32 * cell,
                    cell,
                );
            }
        }
    }
    raster
}

fn glyph_for(ch: char) -> Option<&'static [u8; 6]> {
    let folded = ch.to_ascii_uppercase();
    if folded.is_ascii_uppercase() {
        Some(&GLYPHS_6X6[(folded as u8 - b'A') as usize])
    } else {
        None
    }
}

fn fill_cell(raster: &mut [u8], canvas_w: usize, canvas_h: usize, x: f32, y: f32, cell: f32) {
    let x0 = x.max(0.0) as usize;
    let y0 = y.max(0.0) as usize;
    let x1 = ((x + cell).ceil() as usize).min(canvas_w);
    let y1 = ((y + cell).ceil() as usize).min(canvas_h);
    for row in y0..y1 {
        for col in x0..x1 {
            raster[row * canvas_w + col] = 255;
        }
    }
}
