pub mod face;
pub mod loader;
pub mod manager;
pub mod metrics;
pub mod native;
pub mod outline;
pub mod sprite_sheet;

pub use face::FontFace;
pub use loader::{FontCache, FontKey};
pub use manager::{FontMgr, FontMgrRef};
pub use metrics::{DesignMetrics, FontMetrics};
pub use native::NativeFont;
pub use outline::{OutlineData, OutlineFont};
pub use sprite_sheet::SpriteSheetFont;

use std::sync::Arc;

use glint_gfx::{GlyphMask, RectF, SurfaceError};

/// Glyph index within a font.
pub type GlyphId = u16;

/// Errors that can occur while loading fonts.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("font I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid font data")]
    InvalidFont,
    #[error("sprite sheet image: {0}")]
    Surface(#[from] SurfaceError),
    #[error("sprite sheet contains no glyph regions")]
    EmptySpriteSheet,
    #[error("no font matches {0:?}")]
    NotFound(String),
}

/// Convenient result alias for font-related operations.
pub type Result<T> = std::result::Result<T, FontError>;

/// Shared font handle.
pub type FontRef = Arc<Font>;

/// Runtime tag of a font backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontType {
    SpriteSheet,
    FreeType,
    Native,
}

#[derive(Debug, Clone)]
pub enum FontKind {
    /// Bitmap glyphs on a sprite sheet.
    SpriteSheet(SpriteSheetFont),
    /// CPU-rasterized outline font.
    FreeType(OutlineFont),
    /// Shaped with harfrust, rasterized with swash.
    Native(NativeFont),
}

/// A font backend plus an optional fallback consulted for code points
/// the backend does not cover.
#[derive(Debug, Clone)]
pub struct Font {
    kind: FontKind,
    fallback: Option<FontRef>,
}

impl Font {
    pub fn new(kind: FontKind) -> Self {
        Self {
            kind,
            fallback: None,
        }
    }

    pub fn into_ref(self) -> FontRef {
        Arc::new(self)
    }

    pub fn kind(&self) -> &FontKind {
        &self.kind
    }

    pub fn font_type(&self) -> FontType {
        match self.kind {
            FontKind::SpriteSheet(_) => FontType::SpriteSheet,
            FontKind::FreeType(_) => FontType::FreeType,
            FontKind::Native(_) => FontType::Native,
        }
    }

    pub fn fallback(&self) -> Option<&FontRef> {
        self.fallback.as_ref()
    }

    pub fn set_fallback(&mut self, fallback: Option<FontRef>) {
        self.fallback = fallback;
    }

    pub fn with_fallback(mut self, fallback: FontRef) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// This font followed by its fallbacks, in lookup order.
    pub fn chain(&self) -> FallbackChain<'_> {
        FallbackChain { next: Some(self) }
    }

    pub fn is_scalable(&self) -> bool {
        !matches!(self.kind, FontKind::SpriteSheet(_))
    }

    /// Nominal size in pixels; sprite sheets report their height.
    pub fn size(&self) -> f32 {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.height(),
            FontKind::FreeType(f) => f.size(),
            FontKind::Native(f) => f.size(),
        }
    }

    /// Copy of this font at another size; sprite sheets are not scalable
    /// and are returned unchanged.
    pub fn with_size(&self, size: f32) -> Font {
        let mut font = self.clone();
        match &mut font.kind {
            FontKind::SpriteSheet(_) => {}
            FontKind::FreeType(f) => f.set_size(size),
            FontKind::Native(f) => f.set_size(size),
        }
        font
    }

    pub fn antialias(&self) -> bool {
        match &self.kind {
            FontKind::SpriteSheet(_) => false,
            FontKind::FreeType(f) => f.antialias(),
            FontKind::Native(f) => f.antialias(),
        }
    }

    pub fn with_antialias(&self, antialias: bool) -> Font {
        let mut font = self.clone();
        match &mut font.kind {
            FontKind::SpriteSheet(_) => {}
            FontKind::FreeType(f) => f.set_antialias(antialias),
            FontKind::Native(f) => f.set_antialias(antialias),
        }
        font
    }

    /// Line height in pixels.
    pub fn height(&self) -> f32 {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.height(),
            FontKind::FreeType(f) => f.height(),
            FontKind::Native(f) => f.height(),
        }
    }

    pub fn metrics(&self) -> FontMetrics {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.metrics(),
            FontKind::FreeType(f) => f.metrics(),
            FontKind::Native(f) => f.metrics(),
        }
    }

    /// Glyph for `ch`, or 0 when this font (ignoring fallbacks) lacks it.
    pub fn code_point_to_glyph(&self, ch: char) -> GlyphId {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.code_point_to_glyph(ch),
            FontKind::FreeType(f) => f.code_point_to_glyph(ch),
            FontKind::Native(f) => f.code_point_to_glyph(ch),
        }
    }

    pub fn has_code_point(&self, ch: char) -> bool {
        self.code_point_to_glyph(ch) != 0
    }

    /// Glyph box relative to its pen position. Zero-area boxes are
    /// returned as is (whitespace, missing glyphs).
    pub fn glyph_bounds(&self, glyph: GlyphId) -> RectF {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.glyph_bounds(glyph),
            FontKind::FreeType(f) => f.glyph_bounds(glyph),
            FontKind::Native(f) => f.glyph_bounds(glyph),
        }
    }

    pub fn glyph_advance(&self, glyph: GlyphId) -> f32 {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.glyph_advance(glyph),
            FontKind::FreeType(f) => f.glyph_advance(glyph),
            FontKind::Native(f) => f.glyph_advance(glyph),
        }
    }

    /// Coverage mask of a glyph. Sprite sheet glyphs have none; they are
    /// copied from the sheet.
    pub fn rasterize(&self, glyph: GlyphId) -> Option<Arc<GlyphMask>> {
        match &self.kind {
            FontKind::SpriteSheet(_) => None,
            FontKind::FreeType(f) => f.rasterize(glyph),
            FontKind::Native(f) => f.rasterize(glyph),
        }
    }

    /// Width of `text` laid out without shaping, ignoring fallbacks.
    pub fn text_length(&self, text: &str) -> f32 {
        match &self.kind {
            FontKind::SpriteSheet(f) => f.text_length(text),
            _ => text
                .chars()
                .map(|ch| self.glyph_advance(self.code_point_to_glyph(ch)))
                .sum(),
        }
    }
}

impl From<SpriteSheetFont> for Font {
    fn from(font: SpriteSheetFont) -> Self {
        Font::new(FontKind::SpriteSheet(font))
    }
}

impl From<OutlineFont> for Font {
    fn from(font: OutlineFont) -> Self {
        Font::new(FontKind::FreeType(font))
    }
}

impl From<NativeFont> for Font {
    fn from(font: NativeFont) -> Self {
        Font::new(FontKind::Native(font))
    }
}

/// Iterator over a font and its fallbacks.
pub struct FallbackChain<'a> {
    next: Option<&'a Font>,
}

impl<'a> Iterator for FallbackChain<'a> {
    type Item = &'a Font;

    fn next(&mut self) -> Option<&'a Font> {
        let current = self.next?;
        self.next = current.fallback.as_deref();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ascii_font, latin1_font};

    #[test]
    fn chain_walks_fallbacks_in_order() {
        let last = Font::from(latin1_font(9)).into_ref();
        let primary = Font::from(ascii_font(7)).with_fallback(last.clone());
        let heights: Vec<f32> = primary.chain().map(|f| f.height()).collect();
        assert_eq!(heights, vec![7.0, 9.0]);
    }

    #[test]
    fn sprite_sheets_ignore_size_and_antialias() {
        let font = Font::from(ascii_font(7));
        assert_eq!(font.font_type(), FontType::SpriteSheet);
        assert!(!font.is_scalable());
        assert_eq!(font.with_size(30.0).height(), 7.0);
        assert!(!font.with_antialias(true).antialias());
    }

    #[test]
    fn has_code_point_ignores_fallback() {
        let font = Font::from(ascii_font(7)).with_fallback(Font::from(latin1_font(7)).into_ref());
        assert!(font.has_code_point('A'));
        assert!(!font.has_code_point('é'));
        assert!(font.chain().any(|f| f.has_code_point('é')));
    }
}
