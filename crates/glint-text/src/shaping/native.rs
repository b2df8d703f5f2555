use core::ops::Range;

use glint_gfx::PointF;
use harfrust::{
    Direction as HbDirection, FontRef as HbFontRef, ShaperData, ShaperInstance,
    UnicodeBuffer as HbUnicodeBuffer,
};

use crate::bidi::{self, BaseDirection};
use crate::blob::{GlyphRun, Run, RunHandler, TextBlob};
use crate::font::{FontKind, FontMgr, FontRef, GlyphId, NativeFont};

/// Stretch of one level run drawn with a single font.
struct Item {
    range: Range<usize>,
    font: usize,
    rtl: bool,
    line: usize,
}

/// Shapes `text` with harfrust after bidi analysis and font itemization.
///
/// Each paragraph is a line. Runs are visually positioned but stored (and
/// reported to `handler`) in logical order; RTL runs hold their glyphs in
/// visual order with descending clusters. Returns `None` for empty text
/// or when `font` is not a native font.
pub(crate) fn shape(
    mgr: &FontMgr,
    font: &FontRef,
    text: &str,
    handler: Option<&mut (dyn RunHandler + '_)>,
) -> Option<TextBlob> {
    if text.is_empty() || native(font).is_none() {
        return None;
    }

    let fonts = candidates(mgr, font);
    let mut items = Vec::new();
    let paragraphs = bidi::paragraphs(text, BaseDirection::Auto);
    for (line, para) in paragraphs.iter().enumerate() {
        for level_run in &para.runs {
            let mut run_items = itemize(text, level_run.range.clone(), &fonts, line, level_run.is_rtl());
            if level_run.is_rtl() {
                run_items.reverse();
            }
            items.extend(run_items);
        }
    }

    let used = |item: &Item| fonts[item.font].metrics();
    let ascent = items.iter().map(|item| -used(item).ascent).fold(0.0_f32, f32::max);
    let line_height = font.metrics().line_height().max(font.height());

    let mut runs: Vec<GlyphRun> = Vec::with_capacity(items.len());
    let mut pen_x = 0.0;
    let mut current_line = 0;
    for item in &items {
        if item.line != current_line {
            current_line = item.line;
            pen_x = 0.0;
        }
        let baseline = ascent + line_height * item.line as f32;
        if let Some(run) = shape_item(text, item, &fonts[item.font], baseline, &mut pen_x) {
            runs.push(run);
        }
    }
    runs.sort_by_key(|run| run.utf8_range.start);

    if let Some(handler) = handler {
        for run in &runs {
            handler.commit_run_buffer(&run.info());
        }
    }
    Some(TextBlob::new(font.clone(), runs.into_iter().map(Run::Glyphs).collect()))
}

fn native(font: &FontRef) -> Option<&NativeFont> {
    match font.kind() {
        FontKind::Native(native) => Some(native),
        _ => None,
    }
}

/// `font`, the native fonts of its fallback chain, then the default font.
fn candidates(mgr: &FontMgr, font: &FontRef) -> Vec<FontRef> {
    let size = font.size();
    let mut fonts = vec![font.clone()];
    fonts.extend(
        font.chain()
            .skip(1)
            .filter(|f| matches!(f.kind(), FontKind::Native(_)))
            .map(|f| f.with_size(size).into_ref()),
    );
    if let Some(default) = mgr.default_font(size) {
        fonts.push(default.with_antialias(font.antialias()).into_ref());
    }
    fonts
}

/// Splits `range` into items of consecutive characters sharing a font.
/// A character stays with the current item's font when it has it, so
/// spaces and marks do not break runs.
fn itemize(text: &str, range: Range<usize>, fonts: &[FontRef], line: usize, rtl: bool) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();
    for (offset, ch) in text[range.clone()].char_indices() {
        let start = range.start + offset;
        let end = start + ch.len_utf8();
        let stays = |item: &Item| fonts[item.font].has_code_point(ch) || ch.is_whitespace() || ch.is_control();
        let font = match items.last() {
            Some(item) if stays(item) => item.font,
            _ => fonts.iter().position(|f| f.has_code_point(ch)).unwrap_or(0),
        };
        match items.last_mut() {
            Some(item) if item.font == font => item.range.end = end,
            _ => items.push(Item {
                range: start..end,
                font,
                rtl,
                line,
            }),
        }
    }
    items
}

fn shape_item(text: &str, item: &Item, font: &FontRef, baseline: f32, pen_x: &mut f32) -> Option<GlyphRun> {
    let native = native(font)?;
    let face = native.face();
    let data = face.as_bytes();
    let hb_font = match HbFontRef::from_index(&data, face.index()) {
        Ok(hb_font) => hb_font,
        Err(err) => {
            log::warn!("harfrust rejected font data: {err}");
            return None;
        }
    };

    let shaper_data = ShaperData::new(&hb_font);
    let instance = ShaperInstance::from_variations(&hb_font, core::iter::empty::<harfrust::Variation>());
    let shaper = shaper_data
        .shaper(&hb_font)
        .instance(Some(&instance))
        .point_size(None)
        .build();

    let mut buffer = HbUnicodeBuffer::new();
    buffer.push_str(&text[item.range.clone()]);
    buffer.set_direction(if item.rtl {
        HbDirection::RightToLeft
    } else {
        HbDirection::LeftToRight
    });
    buffer.guess_segment_properties();

    let glyph_buffer = shaper.shape(buffer, &[]);
    let infos = glyph_buffer.glyph_infos();
    let positions = glyph_buffer.glyph_positions();

    // harfrust works in design units.
    let units_per_em = face.metrics().units_per_em;
    let scale = if units_per_em != 0 {
        native.size() / units_per_em as f32
    } else {
        1.0
    };

    let mut run = GlyphRun::new(font.clone(), item.range.start);
    run.utf8_range.end = item.range.end;
    run.rtl = item.rtl;
    for (info, pos) in infos.iter().zip(positions.iter()) {
        let x = *pen_x + pos.x_offset as f32 * scale;
        let y = baseline - pos.y_offset as f32 * scale;
        run.add(info.glyph_id as GlyphId, PointF::new(x, y), info.cluster);
        *pen_x += pos.x_advance as f32 * scale;
    }
    Some(run)
}
