//! Sprite sheet fixtures shared by unit tests.

use glint_gfx::{Color, Rect, RgbaSurface, Surface};

use crate::font::SpriteSheetFont;

pub(crate) const KEY: Color = Color::rgb(0, 0, 0);
pub(crate) const INK: Color = Color::rgb(255, 255, 255);

/// One-row sheet with a region of the given width per glyph, starting at
/// code point `' '`.
pub(crate) fn sheet(widths: &[i32], glyph_height: i32) -> RgbaSurface {
    let width = 1 + widths.iter().map(|w| w + 1).sum::<i32>();
    let mut sheet = RgbaSurface::new(width, glyph_height + 2).unwrap();
    sheet.clear(KEY);
    let mut x = 1;
    for &w in widths {
        sheet.fill_rect(Rect::new(x, 1, w, glyph_height), INK);
        x += w + 1;
    }
    sheet
}

fn font_up_to(last: char, glyph_height: i32, width: impl Fn(u32) -> i32) -> SpriteSheetFont {
    let widths: Vec<i32> = (' ' as u32..=last as u32).map(width).collect();
    SpriteSheetFont::from_surface(sheet(&widths, glyph_height).into_shared()).unwrap()
}

/// Covers `' '..='~'`; every glyph is 4px wide.
pub(crate) fn ascii_font(glyph_height: i32) -> SpriteSheetFont {
    font_up_to('~', glyph_height, |_| 4)
}

/// Covers `' '..='ÿ'`; every glyph is 6px wide.
pub(crate) fn latin1_font(glyph_height: i32) -> SpriteSheetFont {
    font_up_to('ÿ', glyph_height, |_| 6)
}
