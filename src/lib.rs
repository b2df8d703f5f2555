//! glint: a platform layer for windows, input events and text rendering.
//!
//! The facade re-exports the member crates:
//! - [`gfx`]: geometry, colors and CPU surfaces
//! - [`text`]: fonts, shaping and text drawing
//! - [`os`]: the event queue, windows and drag and drop
//! - [`config`]: `glint.toml` settings

pub use glint_config as config;
pub use glint_gfx as gfx;
pub use glint_os as os;
pub use glint_text as text;

pub use glint_config::GlintConfig;
pub use glint_os::{Event, EventType, System, Window, WindowRef, WindowSpec};
pub use glint_text::{Font, FontMgr, FontRef, TextBlob};

/// Loads the configuration and builds the system and font manager it
/// describes.
pub fn init() -> Result<(System, glint_text::FontMgrRef), glint_os::OsError> {
    let config = GlintConfig::load();
    let system = System::from_config(&config)?;
    let fonts = FontMgr::from_config(&config.text).into_ref();
    Ok((system, fonts))
}
