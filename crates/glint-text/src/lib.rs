//! glint-text: fonts, text blobs and text drawing.
//!
//! - fonts: sprite sheet bitmaps, CPU outline fonts and native (harfrust
//!   shaped) fonts behind one [`Font`] type with fallback chains
//! - [`TextBlob`]: positioned glyph runs, with fallback fonts spliced in
//!   for code points the primary font lacks
//! - drawing entry points for [`glint_gfx::Surface`]

pub mod bidi;
pub mod blob;
pub mod draw;
pub mod font;
pub mod shaping;
pub mod unicode;

#[cfg(test)]
mod testing;

pub use blob::{GlyphRun, OffsetHandler, Run, RunHandler, RunInfo, TextBlob, TextBlobRef};
pub use draw::{
    DrawTextDelegate, TextAlign, draw_text, draw_text_aligned, draw_text_blob, draw_text_with_shaper,
};
pub use font::{
    DesignMetrics, Font, FontError, FontKind, FontMetrics, FontMgr, FontMgrRef, FontRef, FontType,
    GlyphId, NativeFont, OutlineFont, SpriteSheetFont,
};
pub use unicode::Utf8Decoder;
