/// Unpremultiplied sRGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent; drawing entry points treat it as "do not paint".
    pub const NONE: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        self.a == 0
    }

    #[inline]
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn from_array(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }

    /// Same color with alpha scaled by `coverage` (0..=255).
    #[inline]
    pub fn with_coverage(self, coverage: u8) -> Self {
        let a = (self.a as u32 * coverage as u32 + 127) / 255;
        Self { a: a as u8, ..self }
    }

    /// Source-over composition of `self` onto `dst`.
    pub fn blend_over(self, dst: Color) -> Color {
        if self.a == 255 || dst.a == 0 {
            return self;
        }
        if self.a == 0 {
            return dst;
        }
        let sa = self.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let channel = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: channel(self.r, dst.r),
            g: channel(self.g, dst.g),
            b: channel(self.b, dst.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces_destination() {
        let out = Color::rgb(10, 20, 30).blend_over(Color::WHITE);
        assert_eq!(out, Color::rgb(10, 20, 30));
    }

    #[test]
    fn transparent_source_keeps_destination() {
        assert_eq!(Color::NONE.blend_over(Color::WHITE), Color::WHITE);
    }

    #[test]
    fn half_coverage_mixes_channels() {
        let src = Color::BLACK.with_coverage(128);
        let out = src.blend_over(Color::WHITE);
        assert_eq!(out.a, 255);
        assert!(out.r > 120 && out.r < 135, "got {}", out.r);
    }
}
