use core::ops::Range;

use glint_gfx::{PointF, RectF};

use crate::font::{FontRef, GlyphId};

/// Read-only view of one glyph run, as seen by run handlers and visitors.
///
/// Positions are relative to `point`; `utf8_range` and the clusters index
/// into the text the blob was built from.
#[derive(Debug, Clone)]
pub struct RunInfo<'a> {
    pub font: &'a FontRef,
    pub utf8_range: Range<usize>,
    pub rtl: bool,
    pub point: PointF,
    pub glyphs: &'a [GlyphId],
    pub positions: &'a [PointF],
    pub offsets: Option<&'a [PointF]>,
    /// Byte offset of each glyph's cluster, relative to `utf8_range.start`.
    pub clusters: &'a [u32],
}

impl RunInfo<'_> {
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Byte range of the source text represented by glyph `i`.
    ///
    /// Glyphs of RTL runs are stored in visual order, so the cluster of
    /// the previous glyph (not the next one) closes glyph `i`'s range.
    pub fn glyph_utf8_range(&self, i: usize) -> Range<usize> {
        debug_assert!(i < self.glyph_count());
        let base = self.utf8_range.start;
        let start = base + self.clusters[i] as usize;
        let end = if self.rtl {
            if i == 0 {
                self.utf8_range.end
            } else {
                base + self.clusters[i - 1] as usize
            }
        } else if i + 1 < self.clusters.len() {
            base + self.clusters[i + 1] as usize
        } else {
            self.utf8_range.end
        };
        start..end
    }

    /// Pen position of glyph `i` including its offset, in blob coordinates.
    pub fn glyph_position(&self, i: usize) -> PointF {
        let mut pos = self.point + self.positions[i];
        if let Some(offsets) = self.offsets {
            pos += offsets[i];
        }
        pos
    }

    /// Bounds of glyph `i` in blob coordinates.
    ///
    /// Glyphs without ink (spaces) get a box of the font's average char
    /// width by its cap height so they still occupy room in the layout.
    pub fn glyph_bounds(&self, i: usize) -> RectF {
        let mut bounds = self.font.glyph_bounds(self.glyphs[i]);
        if bounds.is_empty() {
            let metrics = self.font.metrics();
            bounds.w = metrics.avg_char_width;
            bounds.h = -metrics.cap_height;
            bounds.y = metrics.cap_height;
        }
        bounds.offset(self.glyph_position(i))
    }

    /// Union of every glyph's bounds.
    pub fn bounds(&self) -> RectF {
        (0..self.glyph_count()).fold(RectF::default(), |acc, i| acc.union(&self.glyph_bounds(i)))
    }
}

/// Receives each run while a blob is being built.
pub trait RunHandler {
    fn commit_run_buffer(&mut self, info: &RunInfo<'_>);
}

impl<F> RunHandler for F
where
    F: FnMut(&RunInfo<'_>),
{
    fn commit_run_buffer(&mut self, info: &RunInfo<'_>) {
        self(info)
    }
}

/// Forwards runs of a blob built from a substring, rewriting their byte
/// ranges and origin so they describe the full string.
pub struct OffsetHandler<'h, 'a> {
    original: Option<&'h mut (dyn RunHandler + 'a)>,
    utf8_offset: usize,
    origin: PointF,
}

impl<'h, 'a> OffsetHandler<'h, 'a> {
    pub fn new(original: Option<&'h mut (dyn RunHandler + 'a)>, utf8_offset: usize, origin: PointF) -> Self {
        Self {
            original,
            utf8_offset,
            origin,
        }
    }
}

impl RunHandler for OffsetHandler<'_, '_> {
    fn commit_run_buffer(&mut self, info: &RunInfo<'_>) {
        let Some(original) = self.original.as_deref_mut() else {
            return;
        };
        let mut global = info.clone();
        global.utf8_range = info.utf8_range.start + self.utf8_offset..info.utf8_range.end + self.utf8_offset;
        global.point = info.point + self.origin;
        original.commit_run_buffer(&global);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::Font;
    use crate::testing::ascii_font;

    fn run<'a>(font: &'a FontRef, rtl: bool, range: Range<usize>, clusters: &'a [u32], glyphs: &'a [GlyphId], positions: &'a [PointF]) -> RunInfo<'a> {
        RunInfo {
            font,
            utf8_range: range,
            rtl,
            point: PointF::default(),
            glyphs,
            positions,
            offsets: None,
            clusters,
        }
    }

    #[test]
    fn ltr_ranges_end_at_next_cluster() {
        let font = Font::from(ascii_font(5)).into_ref();
        let positions = [PointF::default(); 3];
        // "ab" ligature then "c", within a run starting at byte 10
        let info = run(&font, false, 10..14, &[0, 2, 3], &[2, 3, 4], &positions);
        assert_eq!(info.glyph_utf8_range(0), 10..12);
        assert_eq!(info.glyph_utf8_range(1), 12..13);
        assert_eq!(info.glyph_utf8_range(2), 13..14);
    }

    #[test]
    fn rtl_ranges_end_at_previous_cluster() {
        let font = Font::from(ascii_font(5)).into_ref();
        let positions = [PointF::default(); 3];
        // three 2-byte letters in visual order: last letter first
        let info = run(&font, true, 4..10, &[4, 2, 0], &[2, 3, 4], &positions);
        assert_eq!(info.glyph_utf8_range(0), 8..10);
        assert_eq!(info.glyph_utf8_range(1), 6..8);
        assert_eq!(info.glyph_utf8_range(2), 4..6);
    }

    #[test]
    fn glyph_ranges_partition_the_run() {
        let font = Font::from(ascii_font(5)).into_ref();
        let positions = [PointF::default(); 4];
        for (rtl, clusters) in [(false, [0u32, 1, 3, 6]), (true, [6u32, 3, 1, 0])] {
            let info = run(&font, rtl, 0..7, &clusters, &[2, 3, 4, 5], &positions);
            let mut ranges: Vec<_> = (0..4).map(|i| info.glyph_utf8_range(i)).collect();
            ranges.sort_by_key(|r| r.start);
            assert_eq!(ranges.first().map(|r| r.start), Some(0));
            assert_eq!(ranges.last().map(|r| r.end), Some(7));
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start, "rtl={rtl}");
            }
        }
    }

    #[test]
    fn glyph_bounds_include_point_and_offsets() {
        let font = Font::from(ascii_font(5)).into_ref();
        let positions = [PointF::new(0.0, 0.0), PointF::new(4.0, 0.0)];
        let offsets = [PointF::new(0.0, 0.0), PointF::new(1.0, 2.0)];
        let mut info = run(&font, false, 0..2, &[0, 1], &[2, 3], &positions);
        info.offsets = Some(&offsets);
        info.point = PointF::new(10.0, 20.0);
        assert_eq!(info.glyph_bounds(1), RectF::new(15.0, 22.0, 4.0, 5.0));
        assert_eq!(info.bounds(), RectF::new(10.0, 20.0, 9.0, 7.0));
    }

    #[test]
    fn offset_handler_translates_to_full_string() {
        let font = Font::from(ascii_font(5)).into_ref();
        let positions = [PointF::default()];
        let info = run(&font, false, 0..2, &[0], &[2], &positions);

        let mut seen = Vec::new();
        let mut collect = |info: &RunInfo<'_>| seen.push((info.utf8_range.clone(), info.point));
        let mut handler = OffsetHandler::new(Some(&mut collect), 7, PointF::new(3.0, 1.0));
        handler.commit_run_buffer(&info);
        assert_eq!(seen, vec![(7..9, PointF::new(3.0, 1.0))]);
    }
}
