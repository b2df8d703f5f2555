use std::path::Path;

use glint_gfx::{Color, Rect, RectF, RgbaSurface, Surface, SurfaceRef};

use crate::font::{FontError, FontMetrics, GlyphId, Result};

/// Glyph index reported for code points the sheet does not contain.
pub const MISSING_GLYPH: GlyphId = 0;
/// Reserved glyph index with no image.
pub const NULL_GLYPH: GlyphId = 1;

/// A region whose first pixel has this color is skipped.
const UNUSABLE_MARKER: Color = Color::rgb(255, 0, 0);

/// Code point used for the bounds of glyphs missing from the sheet.
const REPLACEMENT_CHAR: u32 = 128;

/// Bitmap font whose glyphs are rectangles on a sprite sheet.
///
/// Glyph `n` (n >= 2) is the `n-2`th region found scanning the sheet
/// left-to-right, top-to-bottom, and maps to code point `' ' + n - 2`.
#[derive(Debug, Clone)]
pub struct SpriteSheetFont {
    sheet: SurfaceRef,
    glyphs: Vec<Rect>,
}

impl SpriteSheetFont {
    pub fn from_surface(sheet: SurfaceRef) -> Result<Self> {
        let mut glyphs = vec![Rect::default(), Rect::default()];
        scan_glyphs(sheet.as_ref(), &mut glyphs);
        if glyphs.len() <= 2 {
            return Err(FontError::EmptySpriteSheet);
        }
        log::debug!("sprite sheet font with {} glyphs", glyphs.len() - 2);
        Ok(Self { sheet, glyphs })
    }

    /// Loads a sheet image and scales it by an integer factor before scanning.
    pub fn load(path: impl AsRef<Path>, scale: i32) -> Result<Self> {
        let mut sheet = RgbaSurface::load(path)?;
        sheet.apply_scale(scale);
        Self::from_surface(sheet.into_shared())
    }

    pub fn sheet(&self) -> &SurfaceRef {
        &self.sheet
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn code_point_to_glyph(&self, ch: char) -> GlyphId {
        self.glyph_for(ch as u32)
    }

    fn glyph_for(&self, cp: u32) -> GlyphId {
        let index = cp as i64 - ' ' as i64 + 2;
        if index >= 0 && (index as usize) < self.glyphs.len() && !self.glyphs[index as usize].is_empty() {
            index as GlyphId
        } else {
            MISSING_GLYPH
        }
    }

    /// Size of a glyph at the pen position; unknown glyphs take the size
    /// of the replacement character.
    pub fn glyph_bounds(&self, glyph: GlyphId) -> RectF {
        let rc = match self.glyphs.get(glyph as usize) {
            Some(rc) => *rc,
            None => self.char_bounds_cp(REPLACEMENT_CHAR),
        };
        RectF::new(0.0, 0.0, rc.w as f32, rc.h as f32)
    }

    /// Location of a glyph image on the sheet.
    pub fn glyph_bounds_on_sheet(&self, glyph: GlyphId) -> Rect {
        self.glyphs.get(glyph as usize).copied().unwrap_or_default()
    }

    /// Sheet rectangle used to draw `ch`, or the replacement character's.
    pub fn char_bounds(&self, ch: char) -> Rect {
        self.char_bounds_cp(ch as u32)
    }

    fn char_bounds_cp(&self, cp: u32) -> Rect {
        let mut glyph = self.glyph_for(cp);
        if glyph == MISSING_GLYPH {
            glyph = self.glyph_for(REPLACEMENT_CHAR);
        }
        if glyph == MISSING_GLYPH {
            Rect::default()
        } else {
            self.glyphs[glyph as usize]
        }
    }

    pub fn height(&self) -> f32 {
        self.char_bounds(' ').h as f32
    }

    pub fn glyph_advance(&self, glyph: GlyphId) -> f32 {
        self.glyph_bounds(glyph).w
    }

    pub fn text_length(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.char_bounds(ch).w as f32).sum()
    }

    pub fn metrics(&self) -> FontMetrics {
        let height = self.height();
        FontMetrics {
            top: -height,
            ascent: -height,
            cap_height: -height,
            avg_char_width: self.char_bounds(' ').w as f32,
            max_char_width: self.glyphs.iter().map(|g| g.w).max().unwrap_or(0) as f32,
            underline_thickness: 1.0,
            underline_position: 0.5,
            ..FontMetrics::default()
        }
    }
}

/// Appends every key-color delimited region of `sheet` to `glyphs`.
fn scan_glyphs(sheet: &dyn Surface, glyphs: &mut Vec<Rect>) {
    let (width, height) = (sheet.width(), sheet.height());
    if width == 0 || height == 0 {
        return;
    }
    let key = sheet.pixel(0, 0);
    let mut bounds = Rect::new(0, 0, 1, 1);

    loop {
        // Skip key-colored pixels; at the end of a row continue below the
        // tallest region of that row.
        loop {
            if bounds.x >= width {
                bounds.x = 0;
                bounds.y += bounds.h;
                bounds.h = 1;
                if bounds.y >= height {
                    return;
                }
                continue;
            }
            if sheet.pixel(bounds.x, bounds.y) != key {
                break;
            }
            bounds.x += 1;
        }

        let first = sheet.pixel(bounds.x, bounds.y);

        bounds.w = 0;
        while bounds.x + bounds.w < width && sheet.pixel(bounds.x + bounds.w, bounds.y) != key {
            bounds.w += 1;
        }
        bounds.h = 0;
        while bounds.y + bounds.h < height && sheet.pixel(bounds.x, bounds.y + bounds.h) != key {
            bounds.h += 1;
        }

        glyphs.push(if first != UNUSABLE_MARKER {
            bounds
        } else {
            Rect::default()
        });
        bounds.x += bounds.w;
    }
}
