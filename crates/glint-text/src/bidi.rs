//! Bidirectional text analysis built on `unicode-bidi`.
//!
//! The native shaper uses [`paragraphs`] to split text into paragraphs
//! and each paragraph into level runs in visual order.

use core::ops::Range;

use unicode_bidi::{BidiInfo, LTR_LEVEL, Level, RTL_LEVEL};

/// Base direction hint for paragraph analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseDirection {
    /// Detect the paragraph direction from its first strong character.
    #[default]
    Auto,
    Ltr,
    Rtl,
}

impl BaseDirection {
    pub fn to_level(self) -> Option<Level> {
        match self {
            BaseDirection::Auto => None,
            BaseDirection::Ltr => Some(LTR_LEVEL),
            BaseDirection::Rtl => Some(RTL_LEVEL),
        }
    }
}

/// A run of text with a single embedding level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidiRun {
    /// Byte range in the original text.
    pub range: Range<usize>,
    pub level: u8,
}

impl BidiRun {
    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }
}

/// One paragraph and its level runs, in visual (left-to-right) order.
#[derive(Debug, Clone)]
pub struct Paragraph {
    pub range: Range<usize>,
    /// Paragraph embedding level (UAX-9).
    pub level: u8,
    pub runs: Vec<BidiRun>,
}

impl Paragraph {
    pub fn is_rtl(&self) -> bool {
        self.level % 2 == 1
    }
}

/// Splits `text` into paragraphs and each paragraph into level runs
/// ordered for display.
pub fn paragraphs(text: &str, base_dir: BaseDirection) -> Vec<Paragraph> {
    let info = BidiInfo::new(text, base_dir.to_level());
    info.paragraphs
        .iter()
        .map(|para| {
            let (levels, runs) = info.visual_runs(para, para.range.clone());
            let runs = runs
                .into_iter()
                .filter(|run| !run.is_empty())
                .map(|run| BidiRun {
                    level: levels[run.start].number(),
                    range: run,
                })
                .collect();
            Paragraph {
                range: para.range.clone(),
                level: para.level.number(),
                runs,
            }
        })
        .collect()
}

/// Embedding level of every byte of `text`; multi-byte characters repeat
/// their level for each byte.
pub fn levels_per_byte(text: &str, base_dir: BaseDirection) -> Vec<u8> {
    let info = BidiInfo::new(text, base_dir.to_level());
    info.levels.iter().map(|level| level.number()).collect()
}
