//! Input and UI events delivered through the [`EventQueue`](crate::EventQueue).

use std::path::PathBuf;

use bitflags::bitflags;
use glint_gfx::Point;

use crate::window::WindowRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventType {
    /// No event was available before the timeout expired.
    #[default]
    None,
    CloseApp,
    CloseWindow,
    ResizeWindow,
    DropFiles,
    MouseEnter,
    MouseLeave,
    MouseMove,
    MouseDown,
    MouseUp,
    MouseDoubleClick,
    MouseWheel,
    KeyDown,
    KeyUp,
    TouchMagnify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MouseButton {
    #[default]
    None,
    Left,
    Middle,
    Right,
    X1,
    X2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PointerType {
    #[default]
    Unknown,
    Mouse,
    Touchpad,
    Touch,
    Pen,
    Eraser,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u32 {
        const SHIFT = 1;
        const CTRL = 2;
        const ALT = 4;
        const CMD = 8;
        const SPACE = 16;
        const WIN = 32;
    }
}

impl Default for KeyModifiers {
    fn default() -> Self {
        Self::empty()
    }
}

/// Physical key position, independent of the keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyScancode {
    #[default]
    Nil,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Key0, Key1, Key2, Key3, Key4, Key5, Key6, Key7, Key8, Key9,
    Numpad0, Numpad1, Numpad2, Numpad3, Numpad4,
    Numpad5, Numpad6, Numpad7, Numpad8, Numpad9,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
    Esc,
    Tilde,
    Minus,
    Equals,
    Backspace,
    Tab,
    OpenBrace,
    CloseBrace,
    Enter,
    Colon,
    Quote,
    Backslash,
    Comma,
    Stop,
    Slash,
    Space,
    Insert,
    Del,
    Home,
    End,
    PageUp,
    PageDown,
    Left,
    Right,
    Up,
    Down,
    LShift,
    RShift,
    LControl,
    RControl,
    Alt,
    AltGr,
    LWin,
    RWin,
    Menu,
    CapsLock,
    NumLock,
    ScrLock,
    PrtScr,
    Pause,
}

impl KeyScancode {
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            KeyScancode::LShift
                | KeyScancode::RShift
                | KeyScancode::LControl
                | KeyScancode::RControl
                | KeyScancode::Alt
                | KeyScancode::AltGr
                | KeyScancode::LWin
                | KeyScancode::RWin
        )
    }
}

/// One event, tagged by [`EventType`]. Fields that do not apply to the
/// type keep their defaults.
#[derive(Debug, Clone, Default)]
pub struct Event {
    event_type: EventType,
    window: Option<WindowRef>,
    files: Vec<PathBuf>,
    position: Point,
    modifiers: KeyModifiers,
    scancode: KeyScancode,
    unicode_char: Option<char>,
    repeat: u32,
    dead_key: bool,
    wheel_delta: Point,
    precise_wheel: bool,
    pointer_type: PointerType,
    button: MouseButton,
    pressure: f32,
    magnification: f32,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            ..Self::default()
        }
    }

    /// The value `get_event` returns when it times out.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn mouse(event_type: EventType, position: Point, button: MouseButton) -> Self {
        Self::new(event_type)
            .with_position(position)
            .with_button(button)
            .with_pointer_type(PointerType::Mouse)
    }

    pub fn key(event_type: EventType, scancode: KeyScancode, unicode_char: Option<char>) -> Self {
        Self {
            event_type,
            scancode,
            unicode_char,
            ..Self::default()
        }
    }

    pub fn drop_files(files: Vec<PathBuf>, position: Point) -> Self {
        Self {
            event_type: EventType::DropFiles,
            files,
            position,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, window: WindowRef) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_repeat(mut self, repeat: u32) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_dead_key(mut self, dead_key: bool) -> Self {
        self.dead_key = dead_key;
        self
    }

    pub fn with_wheel_delta(mut self, delta: Point, precise: bool) -> Self {
        self.wheel_delta = delta;
        self.precise_wheel = precise;
        self
    }

    pub fn with_pointer_type(mut self, pointer_type: PointerType) -> Self {
        self.pointer_type = pointer_type;
        self
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = pressure;
        self
    }

    pub fn with_magnification(mut self, magnification: f32) -> Self {
        self.magnification = magnification;
        self
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn window(&self) -> Option<&WindowRef> {
        self.window.as_ref()
    }

    pub(crate) fn set_window(&mut self, window: WindowRef) {
        self.window = Some(window);
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }

    pub fn scancode(&self) -> KeyScancode {
        self.scancode
    }

    pub fn unicode_char(&self) -> Option<char> {
        self.unicode_char
    }

    /// The typed character as UTF-8, or an empty string.
    pub fn unicode_char_as_utf8(&self) -> String {
        self.unicode_char.map(String::from).unwrap_or_default()
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn is_dead_key(&self) -> bool {
        self.dead_key
    }

    pub fn wheel_delta(&self) -> Point {
        self.wheel_delta
    }

    pub fn precise_wheel(&self) -> bool {
        self.precise_wheel
    }

    pub fn pointer_type(&self) -> PointerType {
        self.pointer_type
    }

    pub fn button(&self) -> MouseButton {
        self.button
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    pub fn magnification(&self) -> f32 {
        self.magnification
    }

    /// Events whose position is in window coordinates.
    pub fn is_mouse_event(&self) -> bool {
        matches!(
            self.event_type,
            EventType::MouseEnter
                | EventType::MouseLeave
                | EventType::MouseMove
                | EventType::MouseDown
                | EventType::MouseUp
                | EventType::MouseDoubleClick
                | EventType::MouseWheel
                | EventType::TouchMagnify
        )
    }
}
