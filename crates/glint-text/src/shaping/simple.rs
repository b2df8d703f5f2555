use glint_gfx::PointF;

use crate::blob::{GlyphRun, Run, RunHandler, TextBlob};
use crate::font::{FontKind, FontRef, GlyphId};

/// Left-to-right layout of one glyph per code point, without shaping.
///
/// Glyphs sit on a baseline at `-ascent` so the blob's top-left corner is
/// the origin. Outline fonts apply pair kerning between glyphs.
pub fn make(font: &FontRef, text: &str, handler: Option<&mut (dyn RunHandler + '_)>) -> TextBlob {
    let baseline = -font.metrics().ascent;
    let mut run = GlyphRun::new(font.clone(), 0);
    run.utf8_range.end = text.len();
    let mut pen_x = 0.0;
    let mut previous: Option<GlyphId> = None;

    for (i, ch) in text.char_indices() {
        let glyph = font.code_point_to_glyph(ch);
        if glyph == 0 {
            continue;
        }
        if let (Some(prev), FontKind::FreeType(outline)) = (previous, font.kind()) {
            pen_x += outline.kerning(prev, glyph);
        }
        run.add(glyph, PointF::new(pen_x, baseline), i as u32);
        pen_x += font.glyph_advance(glyph);
        previous = Some(glyph);
    }

    if run.is_empty() {
        return TextBlob::new(font.clone(), Vec::new());
    }
    if let Some(handler) = handler {
        handler.commit_run_buffer(&run.info());
    }
    TextBlob::new(font.clone(), vec![Run::Glyphs(run)])
}
