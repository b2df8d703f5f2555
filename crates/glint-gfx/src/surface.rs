use std::path::Path;
use std::sync::Arc;

use image::{Rgba, RgbaImage};

use crate::color::Color;
use crate::geometry::{Point, Rect, RectF};
use crate::paint::{Paint, PaintStyle};

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid surface size {0}x{1}")]
    InvalidSize(i32, i32),
}

/// Shared, immutable surface (sprite sheets, drag images).
pub type SurfaceRef = Arc<RgbaSurface>;

/// 8-bit coverage mask for one rasterized glyph.
///
/// `left`/`top` place the mask relative to the pen position on the
/// baseline, y growing downwards.
#[derive(Debug, Clone, Default)]
pub struct GlyphMask {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl GlyphMask {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.left, self.top, self.width as i32, self.height as i32)
    }

    pub fn coverage_at(&self, x: u32, y: u32) -> u8 {
        self.coverage
            .get((y * self.width + x) as usize)
            .copied()
            .unwrap_or(0)
    }
}

/// A 2D drawing target.
///
/// Implementors provide pixel access; composite operations have default
/// implementations built on top of it.
pub trait Surface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// Pixel at `(x, y)`, or `Color::NONE` outside the surface.
    fn pixel(&self, x: i32, y: i32) -> Color;

    /// Writes a pixel without blending; out-of-bounds writes are ignored.
    fn put_pixel(&mut self, x: i32, y: i32, color: Color);

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if color.is_none() || !self.bounds().contains(Point::new(x, y)) {
            return;
        }
        let dst = self.pixel(x, y);
        self.put_pixel(x, y, color.blend_over(dst));
    }

    fn clear(&mut self, color: Color) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.put_pixel(x, y, color);
            }
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_none() {
            return;
        }
        let area = rect.intersect(&self.bounds());
        for y in area.y..area.y2() {
            for x in area.x..area.x2() {
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn draw_rect(&mut self, rect: RectF, paint: &Paint) {
        let r = rect.round_out();
        match paint.style {
            PaintStyle::Fill => self.fill_rect(r, paint.color),
            PaintStyle::Stroke | PaintStyle::StrokeAndFill => {
                if paint.style == PaintStyle::StrokeAndFill {
                    self.fill_rect(r, paint.color);
                }
                let t = paint.stroke_width.max(1.0).round() as i32;
                self.fill_rect(Rect::new(r.x, r.y, r.w, t), paint.color);
                self.fill_rect(Rect::new(r.x, r.y2() - t, r.w, t), paint.color);
                self.fill_rect(Rect::new(r.x, r.y + t, t, r.h - 2 * t), paint.color);
                self.fill_rect(Rect::new(r.x2() - t, r.y + t, t, r.h - 2 * t), paint.color);
            }
        }
    }

    /// Copies `src_rect` of `src` to `dst`, using the source alpha as
    /// coverage for `fg`. `bg` (unless `Color::NONE`) is painted first
    /// under the whole copied area.
    fn draw_colored_rgba_surface(
        &mut self,
        src: &dyn Surface,
        fg: Color,
        bg: Color,
        src_rect: Rect,
        dst: Point,
    ) {
        let src_rect = src_rect.intersect(&src.bounds());
        if !bg.is_none() {
            self.fill_rect(Rect::new(dst.x, dst.y, src_rect.w, src_rect.h), bg);
        }
        for v in 0..src_rect.h {
            for u in 0..src_rect.w {
                let s = src.pixel(src_rect.x + u, src_rect.y + v);
                if s.a == 0 {
                    continue;
                }
                self.blend_pixel(dst.x + u, dst.y + v, fg.with_coverage(s.a));
            }
        }
    }

    /// Paints `color` through a glyph coverage mask whose pen origin is `origin`.
    fn draw_alpha_mask(&mut self, mask: &GlyphMask, origin: Point, color: Color) {
        if mask.is_empty() || color.is_none() {
            return;
        }
        let x0 = origin.x + mask.left;
        let y0 = origin.y + mask.top;
        for v in 0..mask.height {
            for u in 0..mask.width {
                let c = mask.coverage_at(u, v);
                if c == 0 {
                    continue;
                }
                self.blend_pixel(x0 + u as i32, y0 + v as i32, color.with_coverage(c));
            }
        }
    }
}

/// CPU surface backed by an `image::RgbaImage`.
#[derive(Debug, Clone)]
pub struct RgbaSurface {
    image: RgbaImage,
}

impl RgbaSurface {
    pub fn new(width: i32, height: i32) -> Result<Self, SurfaceError> {
        if width < 0 || height < 0 {
            return Err(SurfaceError::InvalidSize(width, height));
        }
        Ok(Self {
            image: RgbaImage::new(width as u32, height as u32),
        })
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decodes any format enabled on the `image` crate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SurfaceError> {
        let path = path.as_ref();
        let image = image::open(path)?.to_rgba8();
        log::debug!(
            "loaded surface {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self { image })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SurfaceError> {
        self.image.save(path)?;
        Ok(())
    }

    /// Nearest-neighbour upscale by an integer factor; `scale <= 1` is a no-op.
    pub fn apply_scale(&mut self, scale: i32) {
        if scale <= 1 {
            return;
        }
        let w = self.image.width() * scale as u32;
        let h = self.image.height() * scale as u32;
        self.image =
            image::imageops::resize(&self.image, w, h, image::imageops::FilterType::Nearest);
    }

    /// Reallocates to a new size, discarding contents.
    pub fn resize(&mut self, width: i32, height: i32) {
        let (w, h) = (width.max(0) as u32, height.max(0) as u32);
        if self.image.width() != w || self.image.height() != h {
            self.image = RgbaImage::new(w, h);
        }
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_shared(self) -> SurfaceRef {
        Arc::new(self)
    }
}

impl Surface for RgbaSurface {
    fn width(&self) -> i32 {
        self.image.width() as i32
    }

    fn height(&self) -> i32 {
        self.image.height() as i32
    }

    fn pixel(&self, x: i32, y: i32) -> Color {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return Color::NONE;
        }
        Color::from_array(self.image.get_pixel(x as u32, y as u32).0)
    }

    fn put_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return;
        }
        self.image.put_pixel(x as u32, y as u32, Rgba(color.to_array()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_clipped_to_surface() {
        let mut s = RgbaSurface::new(4, 4).unwrap();
        s.fill_rect(Rect::new(2, 2, 10, 10), Color::WHITE);
        assert_eq!(s.pixel(3, 3), Color::WHITE);
        assert_eq!(s.pixel(1, 1), Color::NONE);
        assert_eq!(s.pixel(10, 10), Color::NONE);
    }

    #[test]
    fn colored_blit_tints_with_source_alpha() {
        let mut sheet = RgbaSurface::new(2, 1).unwrap();
        sheet.put_pixel(0, 0, Color::rgba(255, 255, 255, 255));
        sheet.put_pixel(1, 0, Color::rgba(255, 255, 255, 0));

        let mut dst = RgbaSurface::new(4, 4).unwrap();
        dst.draw_colored_rgba_surface(
            &sheet,
            Color::rgb(200, 0, 0),
            Color::NONE,
            Rect::new(0, 0, 2, 1),
            Point::new(1, 1),
        );
        assert_eq!(dst.pixel(1, 1), Color::rgb(200, 0, 0));
        assert_eq!(dst.pixel(2, 1), Color::NONE);
    }

    #[test]
    fn apply_scale_multiplies_dimensions() {
        let mut s = RgbaSurface::new(3, 2).unwrap();
        s.put_pixel(0, 0, Color::WHITE);
        s.apply_scale(2);
        assert_eq!((s.width(), s.height()), (6, 4));
        assert_eq!(s.pixel(1, 1), Color::WHITE);
    }

    #[test]
    fn load_round_trips_through_png() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sheet.png");
        let mut s = RgbaSurface::new(2, 2)?;
        s.put_pixel(1, 0, Color::rgb(1, 2, 3));
        s.save(&path)?;
        let loaded = RgbaSurface::load(&path)?;
        assert_eq!(loaded.pixel(1, 0), Color::rgb(1, 2, 3));
        Ok(())
    }
}
