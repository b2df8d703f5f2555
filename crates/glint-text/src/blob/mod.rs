//! Immutable glyph runs produced by the shapers.

pub mod run_info;

pub use run_info::{OffsetHandler, RunHandler, RunInfo};

use core::ops::Range;
use std::sync::{Arc, OnceLock};

use glint_gfx::{PointF, RectF};

use crate::font::{FontMgr, FontRef, FontType, GlyphId};
use crate::shaping;

pub type TextBlobRef = Arc<TextBlob>;

/// Glyphs of one font with their positions and clusters.
#[derive(Debug, Clone)]
pub struct GlyphRun {
    pub font: FontRef,
    pub utf8_range: Range<usize>,
    pub rtl: bool,
    pub point: PointF,
    pub glyphs: Vec<GlyphId>,
    pub positions: Vec<PointF>,
    pub offsets: Option<Vec<PointF>>,
    pub clusters: Vec<u32>,
}

impl GlyphRun {
    pub fn new(font: FontRef, start: usize) -> Self {
        Self {
            font,
            utf8_range: start..start,
            rtl: false,
            point: PointF::default(),
            glyphs: Vec::new(),
            positions: Vec::new(),
            offsets: None,
            clusters: Vec::new(),
        }
    }

    pub fn add(&mut self, glyph: GlyphId, pos: PointF, cluster: u32) {
        self.glyphs.push(glyph);
        self.positions.push(pos);
        self.clusters.push(cluster);
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn info(&self) -> RunInfo<'_> {
        RunInfo {
            font: &self.font,
            utf8_range: self.utf8_range.clone(),
            rtl: self.rtl,
            point: self.point,
            glyphs: &self.glyphs,
            positions: &self.positions,
            offsets: self.offsets.as_deref(),
            clusters: &self.clusters,
        }
    }
}

/// A run of a blob: either its own glyphs or a blob built from a
/// substring with another font.
#[derive(Debug, Clone)]
pub enum Run {
    Glyphs(GlyphRun),
    Nested {
        blob: TextBlobRef,
        /// Byte offset of the substring within the outer text.
        utf8_offset: usize,
        /// Origin of the nested blob in outer blob coordinates.
        origin: PointF,
    },
}

/// Shaped text: runs of positioned glyphs with lazily computed bounds.
#[derive(Debug)]
pub struct TextBlob {
    font: FontRef,
    runs: Vec<Run>,
    bounds: OnceLock<RectF>,
}

impl TextBlob {
    pub fn new(font: FontRef, runs: Vec<Run>) -> Self {
        Self {
            font,
            runs,
            bounds: OnceLock::new(),
        }
    }

    /// Lays out `text` glyph by glyph with `font` alone, skipping code
    /// points it does not cover.
    pub fn make(font: &FontRef, text: &str) -> TextBlobRef {
        let blob = match font.font_type() {
            FontType::SpriteSheet => shaping::sprite::make(font, text),
            FontType::FreeType | FontType::Native => shaping::simple::make(font, text, None),
        };
        Arc::new(blob)
    }

    /// Shapes `text`, composing runs from fallback fonts for code points
    /// `font` does not cover. `handler` sees every run (including the
    /// ones of nested blobs) with ranges relative to `text`.
    pub fn make_with_shaper(
        mgr: &FontMgr,
        font: &FontRef,
        text: &str,
        handler: Option<&mut (dyn RunHandler + '_)>,
    ) -> Option<TextBlobRef> {
        shaping::shape(mgr, font, text, handler, 0).map(Arc::new)
    }

    pub fn font(&self) -> &FontRef {
        &self.font
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Union of all glyph bounds, computed on first use.
    pub fn bounds(&self) -> RectF {
        *self.bounds.get_or_init(|| {
            let mut bounds = RectF::default();
            self.visit_runs(|info| bounds = bounds.union(&info.bounds()));
            bounds
        })
    }

    /// Drops the cached bounds so the next [`TextBlob::bounds`] recomputes them.
    pub fn invalidate_bounds(&mut self) {
        self.bounds.take();
    }

    /// Calls `visitor` once per run in text order, flattening nested
    /// blobs with their ranges and origins translated to this blob.
    pub fn visit_runs(&self, mut visitor: impl FnMut(&RunInfo<'_>)) {
        self.visit_translated(0, PointF::default(), &mut visitor);
    }

    fn visit_translated(&self, utf8_offset: usize, origin: PointF, visitor: &mut dyn FnMut(&RunInfo<'_>)) {
        for run in &self.runs {
            match run {
                Run::Glyphs(run) => {
                    let mut info = run.info();
                    info.utf8_range = info.utf8_range.start + utf8_offset..info.utf8_range.end + utf8_offset;
                    info.point = info.point + origin;
                    visitor(&info);
                }
                Run::Nested {
                    blob,
                    utf8_offset: nested_offset,
                    origin: nested_origin,
                } => blob.visit_translated(utf8_offset + nested_offset, origin + *nested_origin, visitor),
            }
        }
    }

    /// Number of glyph runs after flattening.
    pub fn run_count(&self) -> usize {
        let mut count = 0;
        self.visit_runs(|_| count += 1);
        count
    }
}
