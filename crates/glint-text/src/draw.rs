//! Drawing entry points that compose text blobs onto a [`Surface`].

use glint_gfx::{Color, Paint, PointF, RectF, Surface};

use crate::blob::{RunHandler, RunInfo, TextBlob};
use crate::font::{FontKind, FontMgr, FontRef, FontType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-character hooks called while [`draw_text`] paints.
///
/// Bounds are in surface coordinates.
pub trait DrawTextDelegate {
    /// Called before each character; may change the colors used for it.
    fn pre_process_char(&mut self, _index: usize, _ch: char, _fg: &mut Color, _bg: &mut Color, _bounds: &RectF) {}

    /// Returning false stops drawing at this character.
    fn pre_draw_char(&mut self, _bounds: &RectF) -> bool {
        true
    }

    fn post_draw_char(&mut self, _bounds: &RectF) {}
}

/// Paints glyphs as the shaper commits runs, consulting the delegate for
/// every glyph.
struct AdapterBuilder<'s, 'd, 't> {
    surface: Option<&'s mut dyn Surface>,
    text: &'t str,
    fg: Color,
    bg: Color,
    origin: PointF,
    delegate: &'d mut dyn DrawTextDelegate,
    stopped: bool,
}

impl RunHandler for AdapterBuilder<'_, '_, '_> {
    fn commit_run_buffer(&mut self, info: &RunInfo<'_>) {
        for i in 0..info.glyph_count() {
            if self.stopped {
                return;
            }
            let range = info.glyph_utf8_range(i);
            let ch = self
                .text
                .get(range.clone())
                .and_then(|s| s.chars().next())
                .unwrap_or('\0');
            let bounds = info.glyph_bounds(i).offset(self.origin);

            self.delegate
                .pre_process_char(range.start, ch, &mut self.fg, &mut self.bg, &bounds);
            if !self.delegate.pre_draw_char(&bounds) {
                self.stopped = true;
                return;
            }
            if let Some(surface) = self.surface.as_deref_mut() {
                if !self.bg.is_none() {
                    surface.fill_rect(bounds.round_out(), self.bg);
                }
                paint_glyph(surface, info, i, self.origin, self.fg);
            }
            self.delegate.post_draw_char(&bounds);
        }
    }
}

/// Draws `text` with its top-left corner at `(x, y)` and returns the
/// painted bounds. With no surface the text is only measured.
///
/// When `font` lacks a code point and one of its fallbacks has it, the
/// whole string is drawn with that fallback, vertically centered on the
/// original font's line.
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    surface: Option<&mut dyn Surface>,
    mgr: &FontMgr,
    font: &FontRef,
    text: &str,
    fg: Color,
    bg: Color,
    x: f32,
    mut y: f32,
    delegate: Option<&mut dyn DrawTextDelegate>,
) -> RectF {
    let font = resolve_fallback(font, text, &mut y);
    let origin = PointF::new(x, y);

    match delegate {
        Some(delegate) => {
            let mut adapter = AdapterBuilder {
                surface,
                text,
                fg,
                bg,
                origin,
                delegate,
                stopped: false,
            };
            TextBlob::make_with_shaper(mgr, &font, text, Some(&mut adapter as &mut dyn RunHandler))
                .map(|blob| blob.bounds().offset(origin))
                .unwrap_or_default()
        }
        None => {
            let Some(blob) = TextBlob::make_with_shaper(mgr, &font, text, None) else {
                return RectF::default();
            };
            let bounds = blob.bounds().offset(origin);
            if let Some(surface) = surface {
                if !bg.is_none() {
                    surface.fill_rect(bounds.round_out(), bg);
                }
                draw_text_blob(surface, &blob, origin, &Paint::with_color(fg));
            }
            bounds
        }
    }
}

/// Walks the string and switches to the first fallback that has a code
/// point `font` lacks, stopping when no fallback has it.
fn resolve_fallback(font: &FontRef, text: &str, y: &mut f32) -> FontRef {
    let mut current = font.clone();
    for ch in text.chars() {
        if current.fallback().is_none() {
            break;
        }
        if current.has_code_point(ch) {
            continue;
        }

        let mut next = current.fallback().cloned();
        loop {
            match next {
                Some(ref candidate) if !candidate.has_code_point(ch) => next = candidate.fallback().cloned(),
                _ => break,
            }
        }
        let Some(next) = next else {
            break;
        };
        *y += current.height() / 2.0 - next.height() / 2.0;
        current = next;
    }
    current
}

/// Paints every glyph of `blob` with `paint`'s color, `pos` being the
/// blob's top-left corner.
pub fn draw_text_blob(surface: &mut dyn Surface, blob: &TextBlob, pos: PointF, paint: &Paint) {
    blob.visit_runs(|info| {
        for i in 0..info.glyph_count() {
            paint_glyph(surface, info, i, pos, paint.color);
        }
    });
}

/// Draws `text` without shaping or fallbacks, aligned horizontally
/// around `pos.x`.
pub fn draw_text_aligned(
    surface: &mut dyn Surface,
    font: &FontRef,
    text: &str,
    pos: PointF,
    paint: &Paint,
    align: TextAlign,
) {
    let blob = TextBlob::make(font, text);
    draw_text_blob(surface, &blob, aligned(pos, &blob, align), paint);
}

/// Draws shaped text (bidi, ligatures, fallbacks) aligned around `pos.x`.
/// Only native fonts are shaped; other fonts draw nothing.
pub fn draw_text_with_shaper(
    surface: &mut dyn Surface,
    mgr: &FontMgr,
    font: &FontRef,
    text: &str,
    pos: PointF,
    paint: &Paint,
    align: TextAlign,
) {
    if font.font_type() != FontType::Native {
        return;
    }
    let Some(blob) = TextBlob::make_with_shaper(mgr, font, text, None) else {
        return;
    };
    draw_text_blob(surface, &blob, aligned(pos, &blob, align), paint);
}

fn aligned(mut pos: PointF, blob: &TextBlob, align: TextAlign) -> PointF {
    match align {
        TextAlign::Left => {}
        TextAlign::Center => pos.x -= blob.bounds().w / 2.0,
        TextAlign::Right => pos.x -= blob.bounds().w,
    }
    pos
}

fn paint_glyph(surface: &mut dyn Surface, info: &RunInfo<'_>, i: usize, origin: PointF, color: Color) {
    let glyph = info.glyphs[i];
    if glyph == 0 {
        return;
    }
    let pos = (info.glyph_position(i) + origin).round();
    match info.font.kind() {
        FontKind::SpriteSheet(sprite) => {
            let src = sprite.glyph_bounds_on_sheet(glyph);
            surface.draw_colored_rgba_surface(&**sprite.sheet(), color, Color::NONE, src, pos);
        }
        FontKind::FreeType(_) | FontKind::Native(_) => {
            if let Some(mask) = info.font.rasterize(glyph) {
                surface.draw_alpha_mask(&mask, pos, color);
            }
        }
    }
}
