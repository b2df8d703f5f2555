#![allow(dead_code)]

use std::path::PathBuf;

use glint_gfx::{Color, Rect, RgbaSurface, Surface};
use glint_text::{Font, FontRef, SpriteSheetFont};

/// Sprite sheet font covering `' '..=last`, every glyph `width` x `height`.
pub fn sprite_font(last: char, width: i32, height: i32) -> FontRef {
    let count = last as i32 - ' ' as i32 + 1;
    let mut sheet = RgbaSurface::new(1 + count * (width + 1), height + 2).unwrap();
    sheet.clear(Color::BLACK);
    for n in 0..count {
        sheet.fill_rect(Rect::new(1 + n * (width + 1), 1, width, height), Color::WHITE);
    }
    let font = SpriteSheetFont::from_surface(sheet.into_shared()).unwrap();
    Font::from(font).into_ref()
}

/// Path of any TrueType/OpenType file installed on this machine.
pub fn system_font_file() -> Option<PathBuf> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    db.faces().find_map(|face| match &face.source {
        fontdb::Source::File(path) if face.index == 0 => Some(path.clone()),
        _ => None,
    })
}
