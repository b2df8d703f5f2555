//! Backend without a display. Windows are plain records and native events
//! come from a [`HeadlessInjector`], typically driven by tests or another
//! thread.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use glint_gfx::{Point, Rect, Size};
use parking_lot::{Condvar, Mutex};

use super::{Backend, Capabilities};
use crate::error::Result;
use crate::event::{Event, KeyModifiers};
use crate::event_queue::{EventPump, NativeEvent, WakeFn};
use crate::window::{NativeCursor, NativeWindow, WindowId, WindowMessage, WindowSpec};

#[derive(Default)]
struct Shared {
    natives: Mutex<VecDeque<NativeEvent>>,
    woken: Mutex<bool>,
    cond: Condvar,
    modifiers: Mutex<KeyModifiers>,
    next_id: AtomicU64,
}

impl Shared {
    fn wake(&self) {
        *self.woken.lock() = true;
        self.cond.notify_all();
    }
}

#[derive(Default)]
pub struct HeadlessBackend {
    shared: Arc<Shared>,
    translate_dead_keys: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn injector(&self) -> HeadlessInjector {
        HeadlessInjector {
            shared: self.shared.clone(),
        }
    }

    pub fn translate_dead_keys(&self) -> bool {
        self.translate_dead_keys
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTIPLE_WINDOWS | Capabilities::CAN_RESIZE_WINDOW | Capabilities::WINDOW_SCALE
    }

    fn make_window(&mut self, spec: &WindowSpec) -> Result<Box<dyn NativeWindow>> {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let origin = spec.position.unwrap_or_default();
        Ok(Box::new(HeadlessWindow {
            id,
            content: Rect::from_origin_size(origin, spec.content_size),
            title: spec.title.clone(),
            fullscreen: false,
            maximized: spec.maximized,
        }))
    }

    fn event_pump(&mut self) -> Box<dyn EventPump> {
        Box::new(HeadlessPump {
            shared: self.shared.clone(),
        })
    }

    fn key_modifiers(&self) -> KeyModifiers {
        *self.shared.modifiers.lock()
    }

    fn set_translate_dead_keys(&mut self, state: bool) {
        self.translate_dead_keys = state;
    }
}

/// Feeds native events to a headless backend from any thread.
#[derive(Clone)]
pub struct HeadlessInjector {
    shared: Arc<Shared>,
}

impl HeadlessInjector {
    pub fn push(&self, native: NativeEvent) {
        self.shared.natives.lock().push_back(native);
        self.shared.wake();
    }

    pub fn input(&self, window: Option<WindowId>, event: Event) {
        self.push(NativeEvent::Input { window, event });
    }

    pub fn message(&self, window: WindowId, message: WindowMessage) {
        self.push(NativeEvent::Window { window, message });
    }

    pub fn set_key_modifiers(&self, modifiers: KeyModifiers) {
        *self.shared.modifiers.lock() = modifiers;
    }
}

struct HeadlessPump {
    shared: Arc<Shared>,
}

impl EventPump for HeadlessPump {
    fn pending(&mut self) -> usize {
        self.shared.natives.lock().len()
    }

    fn next_native(&mut self) -> Option<NativeEvent> {
        self.shared.natives.lock().pop_front()
    }

    fn wait(&mut self, timeout: Option<Duration>) {
        let mut woken = self.shared.woken.lock();
        // Injectors push before waking, and waking needs this lock.
        if !*woken && self.shared.natives.lock().is_empty() {
            match timeout {
                Some(timeout) => {
                    self.shared.cond.wait_for(&mut woken, timeout);
                }
                None => self.shared.cond.wait(&mut woken),
            }
        }
        *woken = false;
    }

    fn waker(&self) -> WakeFn {
        let shared = self.shared.clone();
        Arc::new(move || shared.wake())
    }
}

struct HeadlessWindow {
    id: WindowId,
    content: Rect,
    title: String,
    fullscreen: bool,
    maximized: bool,
}

impl NativeWindow for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn frame(&self) -> Rect {
        self.content
    }

    fn content_rect(&self) -> Rect {
        self.content
    }

    fn resized(&mut self, size: Size) {
        self.content = Rect::from_origin_size(self.content.origin(), size);
    }

    fn set_visible(&mut self, visible: bool) {
        log::trace!("headless window {} visible={visible}", self.id);
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, state: bool) {
        self.fullscreen = state;
    }

    fn maximize(&mut self) {
        self.maximized = true;
    }

    fn is_maximized(&self) -> bool {
        self.maximized
    }

    fn set_cursor(&mut self, cursor: NativeCursor) -> bool {
        log::trace!("headless window {} cursor {cursor:?}", self.id);
        true
    }

    fn set_mouse_position(&mut self, position: Point) {
        log::trace!("headless window {} mouse at {position:?}", self.id);
    }

    fn invalidate_region(&mut self, rect: Rect) {
        log::trace!("headless window {} invalidated {rect:?}", self.id);
    }
}
