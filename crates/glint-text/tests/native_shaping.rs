mod common;

use core::ops::Range;

use glint_text::{FontMgr, FontType, RunInfo, TextBlob};

fn partitions(ranges: &mut [Range<usize>], len: usize) -> bool {
    ranges.sort_by_key(|r| r.start);
    ranges.first().map(|r| r.start) == Some(0)
        && ranges.last().map(|r| r.end) == Some(len)
        && ranges.windows(2).all(|pair| pair[0].end == pair[1].start)
}

#[test]
fn latin_text_shapes_into_one_ltr_run() {
    let mgr = FontMgr::new();
    let Some(font) = mgr.default_font(16.0) else {
        return;
    };
    assert_eq!(font.font_type(), FontType::Native);

    let text = "Hello, world";
    let blob = TextBlob::make_with_shaper(&mgr, &font, text, None).unwrap();
    let mut rtl = Vec::new();
    let mut ranges = Vec::new();
    blob.visit_runs(|info| {
        rtl.push(info.rtl);
        ranges.extend((0..info.glyph_count()).map(|i| info.glyph_utf8_range(i)));
    });
    assert!(rtl.iter().all(|r| !r));
    assert!(partitions(&mut ranges, text.len()));

    let bounds = blob.bounds();
    assert!(bounds.w > 0.0);
    // top-left origin: ink stays below y = 0 (give a pixel for rounding)
    assert!(bounds.y >= -1.0);
}

#[test]
fn mixed_direction_runs_keep_utf8_round_trip() {
    let mgr = FontMgr::new();
    let Some(font) = mgr.default_font(16.0) else {
        return;
    };
    let text = "abc אבג def";

    let mut runs: Vec<(Range<usize>, bool)> = Vec::new();
    let mut ranges = Vec::new();
    let mut collect = |info: &RunInfo<'_>| {
        runs.push((info.utf8_range.clone(), info.rtl));
        ranges.extend((0..info.glyph_count()).map(|i| info.glyph_utf8_range(i)));
    };
    TextBlob::make_with_shaper(&mgr, &font, text, Some(&mut collect)).unwrap();

    assert!(runs.iter().any(|(range, rtl)| *rtl && text[range.clone()].contains('א')));
    assert!(runs.windows(2).all(|pair| pair[0].0.start < pair[1].0.start));
    assert!(partitions(&mut ranges, text.len()));
}

#[test]
fn empty_text_builds_no_blob() {
    let mgr = FontMgr::new();
    let Some(font) = mgr.default_font(16.0) else {
        return;
    };
    assert!(TextBlob::make_with_shaper(&mgr, &font, "", None).is_none());
}

#[test]
fn outline_font_lays_out_on_the_baseline() -> anyhow::Result<()> {
    let Some(path) = common::system_font_file() else {
        return Ok(());
    };
    let mgr = FontMgr::empty();
    let Ok(font) = mgr.load_true_type_font(&path, 20.0) else {
        // not every installed file is a font fontdue can read
        return Ok(());
    };
    assert_eq!(font.font_type(), FontType::FreeType);

    let blob = TextBlob::make(&font, "AV");
    let baseline = -font.metrics().ascent;
    blob.visit_runs(|info| {
        assert!(info.positions.iter().all(|p| p.y == baseline));
    });
    Ok(())
}

#[test]
fn whitespace_and_missing_glyphs_have_sensible_boxes() {
    let mgr = FontMgr::new();
    let Some(font) = mgr.default_font(16.0) else {
        return;
    };
    assert!(font.glyph_bounds(0).is_empty());

    // a space occupies average char width by cap height
    let blob = TextBlob::make_with_shaper(&mgr, &font, " ", None).unwrap();
    let bounds = blob.bounds();
    assert!(bounds.w > 0.0);
    assert!(bounds.h > 0.0);
    assert!(font.metrics().cap_height < 0.0);
}

#[test]
fn outline_fonts_give_the_missing_glyph_no_box() -> anyhow::Result<()> {
    let Some(path) = common::system_font_file() else {
        return Ok(());
    };
    let font = FontMgr::empty().load_true_type_font(&path, 16.0)?;
    assert_eq!(font.font_type(), FontType::FreeType);
    assert!(font.glyph_bounds(0).is_empty());
    Ok(())
}
