use std::sync::Arc;

use glint_gfx::{GlyphMask, RectF};

use crate::font::{FontFace, FontMetrics, GlyphId};

/// Font shaped with harfrust and rasterized with swash.
#[derive(Debug, Clone)]
pub struct NativeFont {
    face: Arc<FontFace>,
    size: f32,
    antialias: bool,
}

impl NativeFont {
    pub fn new(face: Arc<FontFace>, size: f32) -> Self {
        Self {
            face,
            size: size.max(1.0),
            antialias: true,
        }
    }

    pub fn face(&self) -> &Arc<FontFace> {
        &self.face
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
        self.face.scaled_metrics(self.size)
    }

    pub fn height(&self) -> f32 {
        let m = self.metrics();
        (m.descent - m.ascent + m.leading).ceil()
    }

    pub fn code_point_to_glyph(&self, ch: char) -> GlyphId {
        self.face.glyph_id(ch)
    }

    /// Ink box relative to the pen position on the baseline; empty for
    /// glyphs without coverage (spaces) and for the missing glyph.
    pub fn glyph_bounds(&self, glyph: GlyphId) -> RectF {
        if glyph == 0 {
            return RectF::default();
        }
        match self.rasterize(glyph) {
            Some(mask) => mask.bounds().to_f32(),
            None => RectF::default(),
        }
    }

    pub fn glyph_advance(&self, glyph: GlyphId) -> f32 {
        self.face.advance_width(glyph, self.size)
    }

    pub fn rasterize(&self, glyph: GlyphId) -> Option<Arc<GlyphMask>> {
        self.face.rasterize_cached(glyph, self.size, self.antialias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontKind;
    use crate::FontMgr;

    fn default_native(size: f32) -> Option<NativeFont> {
        let font = FontMgr::new().default_font(size)?;
        match font.kind() {
            FontKind::Native(native) => Some(native.clone()),
            _ => None,
        }
    }

    #[test]
    fn missing_glyph_has_no_bounds() {
        let Some(font) = default_native(16.0) else {
            return;
        };
        assert!(font.glyph_bounds(0).is_empty());
        assert_eq!(font.glyph_bounds(0), RectF::default());
        let a = font.code_point_to_glyph('a');
        assert!(!font.glyph_bounds(a).is_empty());
    }

    #[test]
    fn cap_height_is_above_the_baseline() {
        let Some(font) = default_native(16.0) else {
            return;
        };
        let m = font.metrics();
        assert!(m.cap_height < 0.0);
        assert!(m.x_height < 0.0);
        assert!(m.cap_height >= m.ascent);
    }

    #[test]
    fn masks_are_rendered_once_per_size() {
        let Some(mut font) = default_native(16.0) else {
            return;
        };
        let g = font.code_point_to_glyph('g');
        let before = font.face().cached_mask_count();
        let first = font.rasterize(g);
        let second = font.rasterize(g);
        assert!(first.is_some());
        assert!(matches!((&first, &second), (Some(a), Some(b)) if Arc::ptr_eq(a, b)));
        assert_eq!(font.face().cached_mask_count(), before + 1);

        font.set_size(32.0);
        let bigger = font.rasterize(g);
        assert!(bigger.is_some_and(|mask| mask.height > first.map_or(0, |m| m.height)));
    }
}
