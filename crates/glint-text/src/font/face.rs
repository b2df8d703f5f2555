use std::fmt;
use std::sync::Arc;

use glint_gfx::GlyphMask;
use hashbrown::HashMap;
use parking_lot::Mutex;
use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::{FontRef, Metrics};

use crate::font::{DesignMetrics, FontError, FontMetrics, GlyphId, Result};

/// Loaded font face backed by a font file (TTF/OTF).
///
/// This is a thin wrapper around `swash::FontRef` that owns the
/// underlying font data and exposes metrics, character mapping and
/// coverage rasterization.
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Full font data.
    data: Arc<[u8]>,
    /// Face index within a collection.
    index: u32,
    /// Offset to the table directory for this font.
    offset: u32,
    /// Cache key used internally by swash.
    key: swash::CacheKey,
    /// Extracted font metrics in font units.
    metrics: DesignMetrics,
    /// Rasterized glyphs shared by every size of this face.
    masks: Arc<GlyphMaskCache>,
}

impl FontFace {
    /// Create a font face from raw bytes and a font index within the file.
    pub fn from_bytes(data: Arc<[u8]>, index: usize) -> Result<Self> {
        let font = FontRef::from_index(&data, index).ok_or(FontError::InvalidFont)?;
        let metrics = Self::metrics_from_swash(&font);
        let (offset, key) = (font.offset, font.key);
        Ok(Self {
            data,
            index: index as u32,
            offset,
            key,
            metrics,
            masks: Arc::default(),
        })
    }

    /// Create a font face from raw bytes owned by a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>, index: usize) -> Result<Self> {
        Self::from_bytes(Arc::from(data), index)
    }

    /// Create a font face from a font file on disk.
    pub fn from_path(path: impl AsRef<std::path::Path>, index: usize) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_vec(data, index)
    }

    /// Raw font bytes, shared with the shaper.
    pub fn as_bytes(&self) -> Arc<[u8]> {
        self.data.clone()
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Return a transient `FontRef` for interacting with swash APIs.
    fn as_swash_ref(&self) -> FontRef<'_> {
        FontRef {
            data: &self.data,
            offset: self.offset,
            key: self.key,
        }
    }

    fn metrics_from_swash(font: &FontRef<'_>) -> DesignMetrics {
        // Use default (no variation) coordinates.
        let Metrics {
            units_per_em,
            ascent,
            descent,
            leading,
            cap_height,
            x_height,
            average_width,
            max_width,
            underline_offset,
            stroke_size,
            ..
        } = font.metrics(&[]);

        // OS/2 tables older than version 2 leave these at zero; measure the
        // ink of 'H' and 'x' instead, then fall back to the ascent.
        let cap_height = Self::table_height(cap_height)
            .or_else(|| Self::ink_top(font, 'H'))
            .unwrap_or(ascent);
        let x_height = Self::table_height(x_height)
            .or_else(|| Self::ink_top(font, 'x'))
            .unwrap_or(ascent);

        DesignMetrics {
            ascent,
            descent,
            line_gap: leading,
            units_per_em,
            cap_height: Some(cap_height),
            x_height: Some(x_height),
            average_width,
            max_width,
            underline_offset,
            stroke_size,
        }
    }

    fn table_height(value: f32) -> Option<f32> {
        (value.abs() > f32::EPSILON).then_some(value.abs())
    }

    /// Height of the glyph for `ch` above the baseline, in font units.
    fn ink_top(font: &FontRef<'_>, ch: char) -> Option<f32> {
        let glyph_id = font.charmap().map(ch);
        if glyph_id == 0 {
            return None;
        }
        // size 0 keeps the outline in font units, y up
        let mut context = ScaleContext::new();
        let mut scaler = context.builder(*font).build();
        let top = scaler.scale_outline(glyph_id)?.bounds().max.y;
        (top > 0.0).then_some(top)
    }

    /// Font metrics in font units.
    pub fn metrics(&self) -> DesignMetrics {
        self.metrics
    }

    /// Font metrics scaled to the requested pixel size (px per em).
    pub fn scaled_metrics(&self, font_size: f32) -> FontMetrics {
        self.metrics.scale_to_pixels(font_size)
    }

    /// Glyph for a character, 0 when the face has no mapping for it.
    pub fn glyph_id(&self, ch: char) -> GlyphId {
        self.as_swash_ref().charmap().map(ch)
    }

    /// Horizontal advance of a glyph in pixels.
    pub fn advance_width(&self, glyph_id: GlyphId, font_size: f32) -> f32 {
        self.as_swash_ref()
            .glyph_metrics(&[])
            .scale(font_size)
            .advance_width(glyph_id)
    }

    /// Like [`FontFace::rasterize`], but each (glyph, size, antialias)
    /// combination is rendered once. Empty masks come back as `None`.
    pub fn rasterize_cached(&self, glyph_id: GlyphId, font_size: f32, antialias: bool) -> Option<Arc<GlyphMask>> {
        self.masks.get_or_insert_with((glyph_id, font_size.to_bits(), antialias), || {
            self.rasterize(glyph_id, font_size, antialias)
                .filter(|mask| !mask.is_empty())
        })
    }

    pub(crate) fn cached_mask_count(&self) -> usize {
        self.masks.len()
    }

    /// Rasterize a glyph into a coverage mask placed relative to the pen
    /// position on the baseline.
    pub fn rasterize(&self, glyph_id: GlyphId, font_size: f32, antialias: bool) -> Option<GlyphMask> {
        let mut context = ScaleContext::new();
        let mut scaler = context
            .builder(self.as_swash_ref())
            .size(font_size)
            .hint(!antialias)
            .build();
        let renderer = Render::new(&[
            // Prefer scalable outlines; fall back to bitmaps when available.
            Source::Outline,
            Source::Bitmap(StrikeWith::BestFit),
            Source::ColorBitmap(StrikeWith::BestFit),
        ]);
        let img = renderer.render(&mut scaler, glyph_id)?;

        let width = img.placement.width;
        let height = img.placement.height;
        let mut coverage = match img.content {
            Content::Mask => img.data,
            // Take the alpha channel of color glyphs.
            Content::Color => img.data.chunks_exact(4).map(|px| px[3]).collect(),
            // Average the three subpixel channels.
            Content::SubpixelMask => img
                .data
                .chunks_exact(4)
                .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
                .collect(),
        };
        if !antialias {
            for c in coverage.iter_mut() {
                *c = if *c >= 128 { 255 } else { 0 };
            }
        }

        Some(GlyphMask {
            left: img.placement.left,
            top: -img.placement.top,
            width,
            height,
            coverage,
        })
    }
}

const MAX_CACHED_MASKS: usize = 2048;

type MaskKey = (GlyphId, u32, bool);

/// Glyph masks keyed by glyph, pixel size bits and antialias mode.
#[derive(Default)]
struct GlyphMaskCache {
    map: Mutex<HashMap<MaskKey, Option<Arc<GlyphMask>>>>,
}

impl GlyphMaskCache {
    fn get_or_insert_with(&self, key: MaskKey, render: impl FnOnce() -> Option<GlyphMask>) -> Option<Arc<GlyphMask>> {
        if let Some(mask) = self.map.lock().get(&key) {
            return mask.clone();
        }
        // rendered unlocked; a racing thread may render the same glyph twice
        let mask = render().map(Arc::new);
        let mut map = self.map.lock();
        if map.len() >= MAX_CACHED_MASKS && !map.contains_key(&key) {
            map.clear();
        }
        map.entry(key).or_insert(mask).clone()
    }

    fn len(&self) -> usize {
        self.map.lock().len()
    }
}

impl fmt::Debug for GlyphMaskCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphMaskCache").field("len", &self.len()).finish()
    }
}
