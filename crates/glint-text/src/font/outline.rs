use std::fmt;
use std::sync::Arc;

use fontdue::FontSettings;
use glint_gfx::{GlyphMask, RectF};

use crate::font::{DesignMetrics, FontError, FontFace, FontMetrics, GlyphId, Result};

/// Parsed outline font shared by every size of the same file.
pub struct OutlineData {
    font: fontdue::Font,
    design: DesignMetrics,
}

impl fmt::Debug for OutlineData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineData")
            .field("glyph_count", &self.font.glyph_count())
            .field("units_per_em", &self.design.units_per_em)
            .finish()
    }
}

impl OutlineData {
    pub fn from_bytes(bytes: &[u8], index: u32) -> Result<Self> {
        let settings = FontSettings {
            collection_index: index,
            ..FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(bytes, settings).map_err(|err| {
            log::warn!("outline font rejected: {err}");
            FontError::InvalidFont
        })?;
        // Table-level metrics (underline, cap height) come from the face
        // tables; fontdue only exposes line metrics.
        let design = FontFace::from_vec(bytes.to_vec(), index as usize)?.metrics();
        Ok(Self { font, design })
    }
}

/// Outline font rasterized on the CPU.
#[derive(Debug, Clone)]
pub struct OutlineFont {
    data: Arc<OutlineData>,
    size: f32,
    antialias: bool,
}

impl OutlineFont {
    pub fn new(data: Arc<OutlineData>, size: f32) -> Self {
        Self {
            data,
            size: size.max(1.0),
            antialias: true,
        }
    }

    pub fn from_bytes(bytes: &[u8], size: f32) -> Result<Self> {
        Ok(Self::new(Arc::new(OutlineData::from_bytes(bytes, 0)?), size))
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size.max(1.0);
    }

    pub fn antialias(&self) -> bool {
        self.antialias
    }

    pub fn set_antialias(&mut self, antialias: bool) {
        self.antialias = antialias;
    }

    pub fn metrics(&self) -> FontMetrics {
        let mut metrics = self.data.design.scale_to_pixels(self.size);
        if let Some(line) = self.data.font.horizontal_line_metrics(self.size) {
            metrics.ascent = -line.ascent;
            metrics.descent = -line.descent;
            metrics.leading = line.line_gap;
            metrics.top = metrics.ascent;
            metrics.bottom = metrics.descent;
        }
        if metrics.avg_char_width <= 0.0 {
            metrics.avg_char_width = self.glyph_advance(self.code_point_to_glyph('x'));
        }
        if metrics.underline_thickness <= 0.0 {
            metrics.underline_thickness = (self.size / 14.0).max(1.0);
        }
        metrics
    }

    pub fn height(&self) -> f32 {
        let m = self.metrics();
        (m.descent - m.ascent).ceil()
    }

    pub fn code_point_to_glyph(&self, ch: char) -> GlyphId {
        self.data.font.lookup_glyph_index(ch)
    }

    /// Glyph box relative to the pen position on the baseline; empty for
    /// the missing glyph.
    pub fn glyph_bounds(&self, glyph: GlyphId) -> RectF {
        if glyph == 0 {
            return RectF::default();
        }
        let b = self.data.font.metrics_indexed(glyph, self.size).bounds;
        RectF::new(b.xmin, -(b.ymin + b.height), b.width, b.height)
    }

    pub fn glyph_advance(&self, glyph: GlyphId) -> f32 {
        self.data.font.metrics_indexed(glyph, self.size).advance_width
    }

    pub fn kerning(&self, left: GlyphId, right: GlyphId) -> f32 {
        self.data
            .font
            .horizontal_kern_indexed(left, right, self.size)
            .unwrap_or(0.0)
    }

    pub fn rasterize(&self, glyph: GlyphId) -> Option<Arc<GlyphMask>> {
        let (m, mut coverage) = self.data.font.rasterize_indexed(glyph, self.size);
        if m.width == 0 || m.height == 0 {
            return None;
        }
        if !self.antialias {
            for c in coverage.iter_mut() {
                *c = if *c >= 128 { 255 } else { 0 };
            }
        }
        Some(Arc::new(GlyphMask {
            left: m.xmin,
            top: -(m.ymin + m.height as i32),
            width: m.width as u32,
            height: m.height as u32,
            coverage,
        }))
    }
}
