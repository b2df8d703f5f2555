use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use glint_config::TextConfig;
use parking_lot::Mutex;

use crate::font::{
    Font, FontCache, FontError, FontFace, FontKey, FontRef, NativeFont, OutlineFont, Result,
    SpriteSheetFont,
};

pub type FontMgrRef = Arc<FontMgr>;

/// Families tried, after the configured one, when looking for a default font.
const DEFAULT_FAMILIES: &[&str] = &["Segoe UI", "SF Pro Text", "Arial", "DejaVu Sans", "Noto Sans"];

/// Loads fonts from files and the system font database.
///
/// An empty manager (no database) answers every lookup with `None`, which
/// callers treat as "no fallback available".
pub struct FontMgr {
    db: Option<Database>,
    cache: Mutex<FontCache>,
    fallback_font: Option<PathBuf>,
    fallback_family: Option<String>,
    default_size: f32,
    antialias: bool,
    sprite_sheet_scale: i32,
}

impl FontMgr {
    /// Manager backed by the fonts installed on this system.
    pub fn new() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("font database loaded {} faces", db.len());
        Self::with_database(db)
    }

    /// Manager with an empty database; add faces with [`FontMgr::add_font_data`].
    pub fn with_database(db: Database) -> Self {
        Self {
            db: Some(db),
            cache: Mutex::new(FontCache::new()),
            fallback_font: None,
            fallback_family: None,
            default_size: 12.0,
            antialias: true,
            sprite_sheet_scale: 1,
        }
    }

    /// Manager without any font source.
    pub fn empty() -> Self {
        Self {
            db: None,
            cache: Mutex::new(FontCache::new()),
            fallback_font: None,
            fallback_family: None,
            default_size: 12.0,
            antialias: true,
            sprite_sheet_scale: 1,
        }
    }

    pub fn from_config(config: &TextConfig) -> Self {
        let mut mgr = Self::new();
        mgr.fallback_font = config.fallback_font.clone();
        mgr.fallback_family = config.fallback_family.clone();
        mgr.default_size = config.font_size;
        mgr.antialias = config.antialias;
        mgr.sprite_sheet_scale = config.sprite_sheet_scale.max(1);
        mgr
    }

    pub fn into_ref(self) -> FontMgrRef {
        Arc::new(self)
    }

    pub fn is_empty(&self) -> bool {
        self.db.as_ref().is_none_or(|db| db.is_empty()) && self.fallback_font.is_none()
    }

    pub fn default_size(&self) -> f32 {
        self.default_size
    }

    /// Registers an in-memory font (TTF/OTF/TTC) with the database.
    pub fn add_font_data(&mut self, data: Vec<u8>) {
        match self.db.as_mut() {
            Some(db) => db.load_font_data(data),
            None => log::warn!("font data ignored by an empty font manager"),
        }
    }

    /// Scale used by [`FontMgr::load_sprite_sheet_font`] when none is given.
    pub fn sprite_sheet_scale(&self) -> i32 {
        self.sprite_sheet_scale
    }

    pub fn set_sprite_sheet_scale(&mut self, scale: i32) {
        self.sprite_sheet_scale = scale.max(1);
    }

    pub fn set_fallback_font(&mut self, path: Option<PathBuf>) {
        self.fallback_font = path;
    }

    /// Sprite sheet font from an image file, scaled by `scale` or by the
    /// manager's sprite sheet scale.
    pub fn load_sprite_sheet_font(&self, path: impl AsRef<Path>, scale: Option<i32>) -> Result<FontRef> {
        let font = SpriteSheetFont::load(path, scale.unwrap_or(self.sprite_sheet_scale))?;
        Ok(Font::from(font).into_ref())
    }

    /// Outline font rasterized on the CPU.
    pub fn load_true_type_font(&self, path: impl AsRef<Path>, size: f32) -> Result<FontRef> {
        let data = self.cache.lock().get_or_load_outline(path, 0)?;
        let mut font = OutlineFont::new(data, size);
        font.set_antialias(self.antialias);
        Ok(Font::from(font).into_ref())
    }

    /// Shaped font read from a file.
    pub fn load_native_font(&self, path: impl AsRef<Path>, size: f32) -> Result<FontRef> {
        let face = self.cache.lock().get_or_load(path, 0)?;
        Ok(self.native_font(face, size))
    }

    /// Font used when nothing in a font's fallback chain covers a code point.
    pub fn default_font(&self, size: f32) -> Option<FontRef> {
        if let Some(path) = &self.fallback_font {
            match self.load_native_font(path, size) {
                Ok(font) => return Some(font),
                Err(err) => log::warn!("fallback font {} unusable: {err}", path.display()),
            }
        }

        let mut families: Vec<Family<'_>> = Vec::new();
        if let Some(name) = &self.fallback_family {
            families.push(Family::Name(name));
        }
        families.push(Family::SansSerif);
        families.extend(DEFAULT_FAMILIES.iter().map(|name| Family::Name(name)));
        self.query(&families, size)
    }

    /// Font of the named family, if installed.
    pub fn match_family(&self, name: &str, size: f32) -> Option<FontRef> {
        self.query(&[Family::Name(name)], size)
    }

    fn query(&self, families: &[Family<'_>], size: f32) -> Option<FontRef> {
        let db = self.db.as_ref()?;
        let id = db.query(&Query {
            families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        })?;

        let face = self.cache.lock().get_or_insert_with(FontKey::Database(id), || {
            db.with_face_data(id, |data, index| FontFace::from_vec(data.to_vec(), index as usize))
                .unwrap_or_else(|| Err(FontError::NotFound(format!("{families:?}"))))
        });
        match face {
            Ok(face) => Some(self.native_font(face, size)),
            Err(err) => {
                log::warn!("system font {families:?} unusable: {err}");
                None
            }
        }
    }

    fn native_font(&self, face: Arc<FontFace>, size: f32) -> FontRef {
        let mut font = NativeFont::new(face, size);
        font.set_antialias(self.antialias);
        Font::from(font).into_ref()
    }
}

impl Default for FontMgr {
    fn default() -> Self {
        Self::new()
    }
}
