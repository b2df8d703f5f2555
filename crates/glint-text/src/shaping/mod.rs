//! Blob builders, one per font backend.
//!
//! [`shape`] is the entry point used by [`crate::TextBlob::make_with_shaper`]:
//! sprite sheet fonts splice in fallback blobs for code points they lack,
//! native fonts go through bidi analysis and harfrust, and outline fonts
//! use the simple glyph-by-glyph layout.

pub mod native;
pub mod simple;
pub mod sprite;

use crate::blob::{RunHandler, TextBlob};
use crate::font::{FontMgr, FontRef, FontType};

/// How deep fallback blobs may nest inside each other.
const MAX_FALLBACK_DEPTH: usize = 8;

pub(crate) fn shape(
    mgr: &FontMgr,
    font: &FontRef,
    text: &str,
    handler: Option<&mut (dyn RunHandler + '_)>,
    depth: usize,
) -> Option<TextBlob> {
    if depth > MAX_FALLBACK_DEPTH {
        log::warn!("fallback fonts nested deeper than {MAX_FALLBACK_DEPTH} levels, giving up on {text:?}");
        return None;
    }
    match font.font_type() {
        FontType::SpriteSheet => Some(sprite::make_with_shaper(mgr, font, text, handler, depth)),
        FontType::Native => native::shape(mgr, font, text, handler),
        FontType::FreeType => Some(simple::make(font, text, handler)),
    }
}
