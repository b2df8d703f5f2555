//! Platform backends. One is picked when the [`System`](crate::System) is
//! built and used for its whole life.

use bitflags::bitflags;

use crate::error::Result;
use crate::event::KeyModifiers;
use crate::event_queue::EventPump;
use crate::window::{NativeWindow, WindowSpec};

pub mod headless;
#[cfg(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios"))))]
pub mod winit;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const MULTIPLE_WINDOWS = 1;
        const CAN_RESIZE_WINDOW = 2;
        const WINDOW_SCALE = 4;
        const CUSTOM_NATIVE_MOUSE_CURSOR = 8;
        const GPU_ACCELERATION_SWITCH = 16;
        const COLOR_SPACES = 32;
    }
}

pub trait Backend {
    fn name(&self) -> &'static str;

    fn capabilities(&self) -> Capabilities;

    fn make_window(&mut self, spec: &WindowSpec) -> Result<Box<dyn NativeWindow>>;

    /// The pump feeding this backend's events. Called once, by the system.
    fn event_pump(&mut self) -> Box<dyn EventPump>;

    /// Modifier keys held right now.
    fn key_modifiers(&self) -> KeyModifiers;

    fn set_translate_dead_keys(&mut self, _state: bool) {}
}
