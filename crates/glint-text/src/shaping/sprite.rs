use std::mem;
use std::sync::Arc;

use glint_gfx::PointF;

use crate::blob::{GlyphRun, OffsetHandler, Run, RunHandler, TextBlob};
use crate::font::{Font, FontMgr, FontRef, sprite_sheet::MISSING_GLYPH};
use crate::unicode::Utf8Decoder;

/// Lays out `text` with the sprite sheet alone. Code points without a
/// glyph are skipped.
pub fn make(font: &FontRef, text: &str) -> TextBlob {
    let mut run = GlyphRun::new(font.clone(), 0);
    let mut pos = PointF::default();
    let mut decoder = Utf8Decoder::from(text);

    loop {
        let i = decoder.pos();
        let Some(ch) = decoder.next() else {
            break;
        };
        let glyph = font.code_point_to_glyph(ch);
        if glyph == MISSING_GLYPH {
            continue;
        }
        let bounds = font.glyph_bounds(glyph);
        if bounds.is_empty() {
            continue;
        }
        run.add(glyph, pos, i as u32);
        pos.x += bounds.w;
    }
    run.utf8_range.end = decoder.pos();

    let runs = if run.is_empty() {
        Vec::new()
    } else {
        vec![Run::Glyphs(run)]
    };
    TextBlob::new(font.clone(), runs)
}

/// Lays out `text` with the sprite sheet, building a nested blob with a
/// fallback font for each stretch of code points the sheet lacks.
///
/// The nested blob sits on the sheet's baseline and its runs reach
/// `handler` with byte ranges and origin rewritten for the full `text`.
/// Stretches no fallback can render are left out of the blob.
pub(crate) fn make_with_shaper(
    mgr: &FontMgr,
    font: &FontRef,
    text: &str,
    mut handler: Option<&mut (dyn RunHandler + '_)>,
    depth: usize,
) -> TextBlob {
    let mut runs = Vec::new();
    let mut run = GlyphRun::new(font.clone(), 0);
    let mut pos = PointF::default();
    let mut decoder = Utf8Decoder::from(text);

    loop {
        let i = decoder.pos();
        let Some(ch) = decoder.next() else {
            break;
        };

        let glyph = font.code_point_to_glyph(ch);
        if glyph != MISSING_GLYPH {
            let bounds = font.glyph_bounds(glyph);
            if !bounds.is_empty() {
                let cluster = (i - run.utf8_range.start) as u32;
                run.add(glyph, pos, cluster);
                pos.x += bounds.w;
            }
            continue;
        }

        run.utf8_range.end = i;
        if !run.is_empty() {
            let done = mem::replace(&mut run, GlyphRun::new(font.clone(), i));
            commit(&mut runs, done, handler.as_deref_mut());
        }

        // Extend the gap up to the next code point the sheet has.
        let mut gap = decoder.clone();
        loop {
            let before = gap.clone();
            match gap.next() {
                None => break,
                Some(next) if font.has_code_point(next) => {
                    gap = before;
                    break;
                }
                Some(_) => {}
            }
        }
        decoder = gap;
        let j = decoder.pos();

        match fallback_for(mgr, font, ch) {
            Some(fallback) => {
                let metrics = font.metrics();
                let fallback_metrics = fallback.metrics();
                let aligned = PointF::new(pos.x, pos.y - metrics.ascent + fallback_metrics.ascent);

                let mut sub_handler = OffsetHandler::new(handler.as_deref_mut(), i, aligned);
                let sub = super::shape(
                    mgr,
                    &fallback,
                    &text[i..j],
                    Some(&mut sub_handler as &mut dyn RunHandler),
                    depth + 1,
                );
                if let Some(sub) = sub.filter(|blob| !blob.runs().is_empty()) {
                    pos.x += sub.bounds().w;
                    runs.push(Run::Nested {
                        blob: Arc::new(sub),
                        utf8_offset: i,
                        origin: aligned,
                    });
                }
            }
            None => log::debug!("no fallback font for {:?}", &text[i..j]),
        }

        run = GlyphRun::new(font.clone(), j);
    }

    run.utf8_range.end = decoder.pos();
    if !run.is_empty() {
        commit(&mut runs, run, handler);
    }
    TextBlob::new(font.clone(), runs)
}

fn commit(runs: &mut Vec<Run>, run: GlyphRun, handler: Option<&mut (dyn RunHandler + '_)>) {
    if let Some(handler) = handler {
        handler.commit_run_buffer(&run.info());
    }
    runs.push(Run::Glyphs(run));
}

/// First font after `font` in its chain that has `ch`, else the manager's
/// default font, sized and antialiased like `font`.
fn fallback_for(mgr: &FontMgr, font: &Font, ch: char) -> Option<FontRef> {
    let size = font.height();
    let found = font
        .chain()
        .skip(1)
        .find(|candidate| candidate.has_code_point(ch))
        .map(|candidate| candidate.with_size(size));
    let fallback = match found {
        Some(fallback) => fallback,
        None => mgr.default_font(size)?.with_size(size),
    };
    Some(fallback.with_antialias(font.antialias()).into_ref())
}

#[cfg(test)]
mod tests {
    use core::ops::Range;

    use super::*;
    use crate::blob::RunInfo;
    use crate::testing::{ascii_font, latin1_font};

    fn ascii_with_latin1_fallback() -> FontRef {
        let fallback = Font::from(latin1_font(7)).into_ref();
        Font::from(ascii_font(5)).with_fallback(fallback).into_ref()
    }

    fn flattened_ranges(blob: &TextBlob) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        blob.visit_runs(|info| ranges.push(info.utf8_range.clone()));
        ranges
    }

    #[test]
    fn make_skips_code_points_without_glyphs() {
        let font = Font::from(ascii_font(5)).into_ref();
        let blob = make(&font, "aé b");
        let Run::Glyphs(run) = &blob.runs()[0] else {
            panic!("expected a glyph run");
        };
        assert_eq!(run.clusters, vec![0, 3, 4]);
        assert_eq!(run.positions[2], PointF::new(8.0, 0.0));
        assert_eq!(run.utf8_range, 0..5);
        assert_eq!(blob.bounds().w, 12.0);
    }

    #[test]
    fn fallback_runs_report_offsets_in_the_full_string() {
        let font = ascii_with_latin1_fallback();
        let text = "Hi é!";
        let blob = make_with_shaper(&FontMgr::empty(), &font, text, None, 0);

        assert_eq!(flattened_ranges(&blob), vec![0..3, 3..5, 5..6]);
        assert!(matches!(blob.runs()[1], Run::Nested { utf8_offset: 3, .. }));
        blob.visit_runs(|info| {
            let slice = &text[info.utf8_range.clone()];
            assert!(!slice.is_empty());
        });
    }

    #[test]
    fn fallback_sits_on_the_primary_baseline() {
        let font = ascii_with_latin1_fallback();
        let blob = make_with_shaper(&FontMgr::empty(), &font, "Hi é!", None, 0);
        let Run::Nested { origin, .. } = &blob.runs()[1] else {
            panic!("expected a nested run");
        };
        // baselines: 5px primary, 7px fallback
        assert_eq!(*origin, PointF::new(12.0, -2.0));

        let Run::Glyphs(last) = &blob.runs()[2] else {
            panic!("expected a glyph run");
        };
        assert_eq!(last.positions[0].x, 18.0);
    }

    #[test]
    fn handler_sees_translated_runs_in_text_order() {
        let font = ascii_with_latin1_fallback();
        let mut seen = Vec::new();
        let mut collect = |info: &RunInfo<'_>| seen.push((info.utf8_range.clone(), info.point));
        make_with_shaper(
            &FontMgr::empty(),
            &font,
            "Hi é!",
            Some(&mut collect as &mut dyn RunHandler),
            0,
        );
        assert_eq!(
            seen,
            vec![
                (0..3, PointF::default()),
                (3..5, PointF::new(12.0, -2.0)),
                (5..6, PointF::default()),
            ]
        );
    }

    #[test]
    fn glyph_ranges_cover_the_text_without_gaps() {
        let font = ascii_with_latin1_fallback();
        let text = "a é ü b";
        let blob = make_with_shaper(&FontMgr::empty(), &font, text, None, 0);

        let mut ranges = Vec::new();
        blob.visit_runs(|info| ranges.extend((0..info.glyph_count()).map(|i| info.glyph_utf8_range(i))));
        ranges.sort_by_key(|r| r.start);
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(text.len()));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn unresolved_code_points_are_not_rendered() {
        let font = Font::from(ascii_font(5)).into_ref();
        let blob = make_with_shaper(&FontMgr::empty(), &font, "a\u{263a}b", None, 0);
        assert_eq!(flattened_ranges(&blob), vec![0..1, 4..5]);
        assert_eq!(blob.bounds().w, 8.0);
    }

    #[test]
    fn trailing_gap_still_flushes_pending_run() {
        let font = Font::from(ascii_font(5)).into_ref();
        let blob = make_with_shaper(&FontMgr::empty(), &font, "ab\u{263a}\u{263b}", None, 0);
        assert_eq!(flattened_ranges(&blob), vec![0..2]);

        let font = ascii_with_latin1_fallback();
        let blob = make_with_shaper(&FontMgr::empty(), &font, "abé", None, 0);
        assert_eq!(flattened_ranges(&blob), vec![0..2, 2..4]);
    }
}
