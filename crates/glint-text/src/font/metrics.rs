/// Face-level metrics in font units.
#[derive(Debug, Clone, Copy)]
pub struct DesignMetrics {
    /// Ascent above baseline (positive).
    pub ascent: f32,
    /// Descent below baseline (positive).
    pub descent: f32,
    /// Line gap (leading).
    pub line_gap: f32,
    /// Units per em.
    pub units_per_em: u16,
    /// Cap height (optional).
    pub cap_height: Option<f32>,
    /// X-height (optional).
    pub x_height: Option<f32>,
    /// Average advance width, zero if unknown.
    pub average_width: f32,
    /// Maximum advance width, zero if unknown.
    pub max_width: f32,
    /// Distance from baseline to the underline (positive above).
    pub underline_offset: f32,
    /// Underline/strikeout stroke thickness.
    pub stroke_size: f32,
}

impl DesignMetrics {
    /// Calculate line height (ascent + descent + line_gap).
    pub fn line_height(&self) -> f32 {
        self.ascent + self.descent + self.line_gap
    }

    /// Scale metrics to pixel size, where `font_size` is in logical pixels
    /// (px per em). The result follows the baseline-relative sign
    /// convention of [`FontMetrics`].
    pub fn scale_to_pixels(&self, font_size: f32) -> FontMetrics {
        let scale = if self.units_per_em != 0 {
            font_size / self.units_per_em as f32
        } else {
            1.0
        };
        let ascent = -self.ascent * scale;
        let descent = self.descent * scale;
        FontMetrics {
            top: ascent,
            ascent,
            descent,
            bottom: descent,
            leading: self.line_gap * scale,
            avg_char_width: self.average_width * scale,
            max_char_width: self.max_width * scale,
            x_height: -self.x_height.unwrap_or(0.0) * scale,
            cap_height: -self.cap_height.unwrap_or(0.0) * scale,
            underline_thickness: self.stroke_size * scale,
            underline_position: -self.underline_offset * scale,
        }
    }

    /// Scale metrics for a font size specified in points at a given DPI.
    ///
    /// `px = pt * dpi / 72.0`.
    pub fn scale_from_points(&self, font_size_pt: f32, dpi: f32) -> FontMetrics {
        let px = font_size_pt * dpi / 72.0;
        self.scale_to_pixels(px)
    }
}

/// Pixel metrics relative to the baseline, y growing downwards: values
/// above the baseline (ascent, cap height) are negative, values below it
/// (descent) are positive.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FontMetrics {
    pub top: f32,
    pub ascent: f32,
    pub descent: f32,
    pub bottom: f32,
    pub leading: f32,
    pub avg_char_width: f32,
    pub max_char_width: f32,
    pub x_height: f32,
    pub cap_height: f32,
    pub underline_thickness: f32,
    /// Distance from baseline to the top of the underline stroke.
    pub underline_position: f32,
}

impl FontMetrics {
    /// Line height implied by the metrics (`descent - ascent + leading`).
    pub fn line_height(&self) -> f32 {
        self.descent - self.ascent + self.leading
    }
}
