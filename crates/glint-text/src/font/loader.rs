use std::path::{Path, PathBuf};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::font::outline::OutlineData;
use crate::font::{FontFace, Result};

/// Key for identifying a loaded face within the cache.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum FontKey {
    /// A face read from a file on disk.
    File {
        path: PathBuf,
        /// Font index within the file (for collections).
        index: u32,
    },
    /// A face owned by the system font database.
    Database(fontdb::ID),
}

impl FontKey {
    pub fn file(path: impl AsRef<Path>, index: usize) -> Self {
        FontKey::File {
            path: path.as_ref().to_path_buf(),
            index: index as u32,
        }
    }
}

/// In-memory cache of parsed faces, shared by every font created from
/// the same file or database entry.
#[derive(Default)]
pub struct FontCache {
    faces: HashMap<FontKey, Arc<FontFace>>,
    outlines: HashMap<FontKey, Arc<OutlineData>>,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a native face from the cache or load it from disk.
    pub fn get_or_load(&mut self, path: impl AsRef<Path>, index: usize) -> Result<Arc<FontFace>> {
        let key = FontKey::file(&path, index);
        if let Some(face) = self.faces.get(&key) {
            return Ok(face.clone());
        }

        let face = Arc::new(FontFace::from_path(path, index)?);
        self.faces.insert(key, face.clone());
        Ok(face)
    }

    /// Get a native face from the cache or build it with `load`.
    pub fn get_or_insert_with(
        &mut self,
        key: FontKey,
        load: impl FnOnce() -> Result<FontFace>,
    ) -> Result<Arc<FontFace>> {
        if let Some(face) = self.faces.get(&key) {
            return Ok(face.clone());
        }
        let face = Arc::new(load()?);
        self.faces.insert(key, face.clone());
        Ok(face)
    }

    /// Get parsed outline data from the cache or load it from disk.
    pub fn get_or_load_outline(
        &mut self,
        path: impl AsRef<Path>,
        index: usize,
    ) -> Result<Arc<OutlineData>> {
        let key = FontKey::file(&path, index);
        if let Some(data) = self.outlines.get(&key) {
            return Ok(data.clone());
        }

        let bytes = std::fs::read(path)?;
        let data = Arc::new(OutlineData::from_bytes(&bytes, index as u32)?);
        self.outlines.insert(key, data.clone());
        Ok(data)
    }

    pub fn len(&self) -> usize {
        self.faces.len() + self.outlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
