//! glint-gfx: geometry, colors and CPU surfaces shared by the text and
//! window layers.

pub mod color;
pub mod geometry;
pub mod paint;
pub mod surface;

pub use color::Color;
pub use geometry::{Point, PointF, Rect, RectF, Size};
pub use paint::{Paint, PaintStyle};
pub use surface::{GlyphMask, RgbaSurface, Surface, SurfaceError, SurfaceRef};
