//! Desktop backend on winit, driven with `pump_events` so the event queue
//! keeps control of blocking and timeouts.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glint_gfx::{Point, Rect, Size};
use parking_lot::Mutex;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event as WinitEvent, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{EventLoop, EventLoopProxy};
use winit::keyboard::{Key, KeyCode, ModifiersState, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, CursorIcon, Fullscreen, WindowBuilder, WindowLevel};

use super::{Backend, Capabilities};
use crate::dnd::{DragMessage, DropOperations, StaticDragData};
use crate::error::Result;
use crate::event::{Event, EventType, KeyModifiers, KeyScancode, MouseButton, PointerType};
use crate::event_queue::{EventPump, NativeEvent, WakeFn};
use crate::window::{NativeCursor, NativeWindow, WindowId, WindowMessage, WindowSpec};

const DOUBLE_CLICK_TIME: Duration = Duration::from_millis(500);
const DOUBLE_CLICK_DISTANCE: i32 = 4;

pub struct WinitBackend {
    event_loop: Rc<RefCell<EventLoop<()>>>,
    modifiers: Rc<Cell<KeyModifiers>>,
    translate_dead_keys: Rc<Cell<bool>>,
}

impl WinitBackend {
    /// Opens the platform event loop. Fails without a display.
    pub fn new() -> Result<Self> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            event_loop: Rc::new(RefCell::new(event_loop)),
            modifiers: Rc::new(Cell::new(KeyModifiers::empty())),
            translate_dead_keys: Rc::new(Cell::new(false)),
        })
    }
}

impl Backend for WinitBackend {
    fn name(&self) -> &'static str {
        "winit"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::MULTIPLE_WINDOWS
            | Capabilities::CAN_RESIZE_WINDOW
            | Capabilities::WINDOW_SCALE
            | Capabilities::CUSTOM_NATIVE_MOUSE_CURSOR
    }

    fn make_window(&mut self, spec: &WindowSpec) -> Result<Box<dyn NativeWindow>> {
        let size = PhysicalSize::new(spec.content_size.w.max(1) as u32, spec.content_size.h.max(1) as u32);
        let mut builder = WindowBuilder::new()
            .with_title(spec.title.clone())
            .with_inner_size(size)
            .with_visible(spec.visible)
            .with_resizable(spec.resizable)
            .with_decorations(!spec.borderless)
            .with_maximized(spec.maximized);
        if spec.floating {
            builder = builder.with_window_level(WindowLevel::AlwaysOnTop);
        }
        if let Some(position) = spec.position {
            builder = builder.with_position(PhysicalPosition::new(position.x, position.y));
        }

        let event_loop = self.event_loop.borrow();
        let window = builder.build(&event_loop)?;
        Ok(Box::new(WinitWindow {
            id: u64::from(window.id()),
            window,
        }))
    }

    fn event_pump(&mut self) -> Box<dyn EventPump> {
        let proxy = self.event_loop.borrow().create_proxy();
        Box::new(WinitPump {
            event_loop: self.event_loop.clone(),
            proxy: Arc::new(Mutex::new(proxy)),
            translator: Translator {
                modifiers: self.modifiers.clone(),
                translate_dead_keys: self.translate_dead_keys.clone(),
                cursor: HashMap::new(),
                last_click: None,
                dragging: HashSet::new(),
            },
            stash: VecDeque::new(),
            exited: false,
        })
    }

    fn key_modifiers(&self) -> KeyModifiers {
        self.modifiers.get()
    }

    fn set_translate_dead_keys(&mut self, state: bool) {
        self.translate_dead_keys.set(state);
    }
}

struct WinitPump {
    event_loop: Rc<RefCell<EventLoop<()>>>,
    proxy: Arc<Mutex<EventLoopProxy<()>>>,
    translator: Translator,
    stash: VecDeque<NativeEvent>,
    exited: bool,
}

impl WinitPump {
    fn pump(&mut self, timeout: Option<Duration>) {
        let mut batch = Batch::default();
        let translator = &mut self.translator;
        let status = self
            .event_loop
            .borrow_mut()
            .pump_events(timeout, |event, _target| translator.translate(event, &mut batch));
        translator.finish(batch, &mut self.stash);

        if let PumpStatus::Exit(code) = status {
            log::info!("winit event loop exited with code {code}");
            self.exited = true;
            self.stash.push_back(NativeEvent::Input {
                window: None,
                event: Event::new(EventType::CloseApp),
            });
        }
    }
}

impl EventPump for WinitPump {
    fn pending(&mut self) -> usize {
        if self.stash.is_empty() && !self.exited {
            self.pump(Some(Duration::ZERO));
        }
        self.stash.len()
    }

    fn next_native(&mut self) -> Option<NativeEvent> {
        self.stash.pop_front()
    }

    fn wait(&mut self, timeout: Option<Duration>) {
        if !self.stash.is_empty() {
            return;
        }
        if self.exited {
            // Nothing will wake us any more.
            std::thread::sleep(timeout.unwrap_or(Duration::from_millis(10)).min(Duration::from_millis(10)));
            return;
        }
        self.pump(timeout);
    }

    fn waker(&self) -> WakeFn {
        let proxy = self.proxy.clone();
        Arc::new(move || {
            if proxy.lock().send_event(()).is_err() {
                log::trace!("event loop closed, wake-up ignored");
            }
        })
    }
}

/// Events gathered during one `pump_events` call. Sizes and file drags
/// are only turned into window messages once the batch is complete.
#[derive(Default)]
struct Batch {
    events: Vec<NativeEvent>,
    sizes: Vec<(WindowId, Vec<Size>)>,
    hovered: HashMap<WindowId, Vec<PathBuf>>,
    dropped: HashMap<WindowId, Vec<PathBuf>>,
    cancelled: HashSet<WindowId>,
}

impl Batch {
    fn input(&mut self, window: WindowId, event: Event) {
        self.events.push(NativeEvent::Input {
            window: Some(window),
            event,
        });
    }

    fn resize(&mut self, window: WindowId, size: Size) {
        match self.sizes.iter_mut().find(|(id, _)| *id == window) {
            Some((_, sizes)) => sizes.push(size),
            None => self.sizes.push((window, vec![size])),
        }
    }
}

struct Click {
    window: WindowId,
    button: MouseButton,
    position: Point,
    at: Instant,
}

struct Translator {
    modifiers: Rc<Cell<KeyModifiers>>,
    translate_dead_keys: Rc<Cell<bool>>,
    cursor: HashMap<WindowId, Point>,
    last_click: Option<Click>,
    dragging: HashSet<WindowId>,
}

impl Translator {
    fn translate(&mut self, event: WinitEvent<()>, batch: &mut Batch) {
        if let WinitEvent::WindowEvent { window_id, event } = event {
            self.window_event(u64::from(window_id), event, batch);
        }
    }

    fn window_event(&mut self, id: WindowId, event: WindowEvent, batch: &mut Batch) {
        let modifiers = self.modifiers.get();
        match event {
            WindowEvent::CloseRequested => batch.events.push(NativeEvent::Window {
                window: id,
                message: WindowMessage::CloseRequested,
            }),
            WindowEvent::Resized(size) => batch.resize(id, Size::new(size.width as i32, size.height as i32)),
            WindowEvent::ModifiersChanged(state) => self.modifiers.set(key_modifiers(state.state())),
            WindowEvent::KeyboardInput { event, .. } => batch.input(id, self.key_event(&event)),
            WindowEvent::CursorMoved { position, .. } => {
                let position = Point::new(position.x as i32, position.y as i32);
                self.cursor.insert(id, position);
                batch.input(
                    id,
                    Event::mouse(EventType::MouseMove, position, MouseButton::None).with_modifiers(modifiers),
                );
            }
            WindowEvent::CursorEntered { .. } => {
                let position = self.cursor_at(id);
                batch.input(id, Event::mouse(EventType::MouseEnter, position, MouseButton::None));
            }
            WindowEvent::CursorLeft { .. } => {
                let position = self.cursor_at(id);
                batch.input(id, Event::mouse(EventType::MouseLeave, position, MouseButton::None));
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let position = self.cursor_at(id);
                let button = mouse_button(button);
                let event_type = match state {
                    ElementState::Pressed if self.is_double_click(id, button, position) => EventType::MouseDoubleClick,
                    ElementState::Pressed => EventType::MouseDown,
                    ElementState::Released => EventType::MouseUp,
                };
                batch.input(id, Event::mouse(event_type, position, button).with_modifiers(modifiers));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Positive deltas scroll down and right.
                let (delta, precise) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (Point::new(-x.round() as i32, -y.round() as i32), false),
                    MouseScrollDelta::PixelDelta(p) => (Point::new(-p.x.round() as i32, -p.y.round() as i32), true),
                };
                let pointer = if precise {
                    PointerType::Touchpad
                } else {
                    PointerType::Mouse
                };
                let event = Event::mouse(EventType::MouseWheel, self.cursor_at(id), MouseButton::None)
                    .with_wheel_delta(delta, precise)
                    .with_pointer_type(pointer)
                    .with_modifiers(modifiers);
                batch.input(id, event);
            }
            WindowEvent::TouchpadMagnify { delta, .. } => {
                let event = Event::mouse(EventType::TouchMagnify, self.cursor_at(id), MouseButton::None)
                    .with_pointer_type(PointerType::Touchpad)
                    .with_magnification(delta as f32)
                    .with_modifiers(modifiers);
                batch.input(id, event);
            }
            WindowEvent::HoveredFile(path) => batch.hovered.entry(id).or_default().push(path),
            WindowEvent::DroppedFile(path) => batch.dropped.entry(id).or_default().push(path),
            WindowEvent::HoveredFileCancelled => {
                batch.cancelled.insert(id);
            }
            _ => {}
        }
    }

    fn finish(&mut self, batch: Batch, out: &mut VecDeque<NativeEvent>) {
        out.extend(batch.events);

        for (window, sizes) in batch.sizes {
            let message = |message| NativeEvent::Window { window, message };
            match sizes.as_slice() {
                [size] => out.push_back(message(WindowMessage::Resized(*size))),
                _ => {
                    out.push_back(message(WindowMessage::StartResizing));
                    out.extend(sizes.iter().map(|size| message(WindowMessage::Resizing(*size))));
                    out.push_back(message(WindowMessage::EndResizing));
                }
            }
        }

        for (window, paths) in batch.hovered {
            let position = self.cursor_at(window);
            let drag = if self.dragging.insert(window) {
                DragMessage::Enter {
                    position,
                    operations: DropOperations::COPY,
                    data: Box::new(StaticDragData::new().with_paths(paths)),
                }
            } else {
                DragMessage::Over {
                    position,
                    operations: DropOperations::COPY,
                }
            };
            out.push_back(NativeEvent::Window {
                window,
                message: WindowMessage::Drag(drag),
            });
        }
        for (window, paths) in batch.dropped {
            self.dragging.remove(&window);
            let drag = DragMessage::Drop {
                position: self.cursor_at(window),
                operations: DropOperations::COPY,
                data: Some(Box::new(StaticDragData::new().with_paths(paths))),
            };
            out.push_back(NativeEvent::Window {
                window,
                message: WindowMessage::Drag(drag),
            });
        }
        for window in batch.cancelled {
            if self.dragging.remove(&window) {
                out.push_back(NativeEvent::Window {
                    window,
                    message: WindowMessage::Drag(DragMessage::Leave),
                });
            }
        }
    }

    fn cursor_at(&self, window: WindowId) -> Point {
        self.cursor.get(&window).copied().unwrap_or_default()
    }

    fn is_double_click(&mut self, window: WindowId, button: MouseButton, position: Point) -> bool {
        let now = Instant::now();
        let double = self.last_click.as_ref().is_some_and(|click| {
            click.window == window
                && click.button == button
                && now.duration_since(click.at) <= DOUBLE_CLICK_TIME
                && (click.position.x - position.x).abs() <= DOUBLE_CLICK_DISTANCE
                && (click.position.y - position.y).abs() <= DOUBLE_CLICK_DISTANCE
        });
        self.last_click = if double {
            None
        } else {
            Some(Click {
                window,
                button,
                position,
                at: now,
            })
        };
        double
    }

    fn key_event(&self, key: &KeyEvent) -> Event {
        let pressed = key.state == ElementState::Pressed;
        let event_type = if pressed {
            EventType::KeyDown
        } else {
            EventType::KeyUp
        };
        let code = match key.physical_key {
            PhysicalKey::Code(code) => scancode(code),
            PhysicalKey::Unidentified(_) => KeyScancode::Nil,
        };
        let (unicode_char, dead) = match &key.logical_key {
            Key::Dead(ch) => (ch.filter(|_| self.translate_dead_keys.get()), true),
            _ => (
                key.text
                    .as_ref()
                    .and_then(|text| text.chars().next())
                    .filter(|ch| pressed && !ch.is_control()),
                false,
            ),
        };
        Event::key(event_type, code, unicode_char)
            .with_modifiers(self.modifiers.get())
            .with_repeat(u32::from(key.repeat))
            .with_dead_key(dead)
    }
}

fn key_modifiers(state: ModifiersState) -> KeyModifiers {
    let mut modifiers = KeyModifiers::empty();
    modifiers.set(KeyModifiers::SHIFT, state.shift_key());
    modifiers.set(KeyModifiers::CTRL, state.control_key());
    modifiers.set(KeyModifiers::ALT, state.alt_key());
    let logo = if cfg!(target_os = "macos") {
        KeyModifiers::CMD
    } else {
        KeyModifiers::WIN
    };
    modifiers.set(logo, state.super_key());
    modifiers
}

fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    use winit::event::MouseButton as W;
    match button {
        W::Left => MouseButton::Left,
        W::Right => MouseButton::Right,
        W::Middle => MouseButton::Middle,
        W::Back => MouseButton::X1,
        W::Forward => MouseButton::X2,
        W::Other(_) => MouseButton::None,
    }
}

fn scancode(code: KeyCode) -> KeyScancode {
    use KeyScancode as S;
    match code {
        KeyCode::KeyA => S::A,
        KeyCode::KeyB => S::B,
        KeyCode::KeyC => S::C,
        KeyCode::KeyD => S::D,
        KeyCode::KeyE => S::E,
        KeyCode::KeyF => S::F,
        KeyCode::KeyG => S::G,
        KeyCode::KeyH => S::H,
        KeyCode::KeyI => S::I,
        KeyCode::KeyJ => S::J,
        KeyCode::KeyK => S::K,
        KeyCode::KeyL => S::L,
        KeyCode::KeyM => S::M,
        KeyCode::KeyN => S::N,
        KeyCode::KeyO => S::O,
        KeyCode::KeyP => S::P,
        KeyCode::KeyQ => S::Q,
        KeyCode::KeyR => S::R,
        KeyCode::KeyS => S::S,
        KeyCode::KeyT => S::T,
        KeyCode::KeyU => S::U,
        KeyCode::KeyV => S::V,
        KeyCode::KeyW => S::W,
        KeyCode::KeyX => S::X,
        KeyCode::KeyY => S::Y,
        KeyCode::KeyZ => S::Z,
        KeyCode::Digit0 => S::Key0,
        KeyCode::Digit1 => S::Key1,
        KeyCode::Digit2 => S::Key2,
        KeyCode::Digit3 => S::Key3,
        KeyCode::Digit4 => S::Key4,
        KeyCode::Digit5 => S::Key5,
        KeyCode::Digit6 => S::Key6,
        KeyCode::Digit7 => S::Key7,
        KeyCode::Digit8 => S::Key8,
        KeyCode::Digit9 => S::Key9,
        KeyCode::Numpad0 => S::Numpad0,
        KeyCode::Numpad1 => S::Numpad1,
        KeyCode::Numpad2 => S::Numpad2,
        KeyCode::Numpad3 => S::Numpad3,
        KeyCode::Numpad4 => S::Numpad4,
        KeyCode::Numpad5 => S::Numpad5,
        KeyCode::Numpad6 => S::Numpad6,
        KeyCode::Numpad7 => S::Numpad7,
        KeyCode::Numpad8 => S::Numpad8,
        KeyCode::Numpad9 => S::Numpad9,
        KeyCode::F1 => S::F1,
        KeyCode::F2 => S::F2,
        KeyCode::F3 => S::F3,
        KeyCode::F4 => S::F4,
        KeyCode::F5 => S::F5,
        KeyCode::F6 => S::F6,
        KeyCode::F7 => S::F7,
        KeyCode::F8 => S::F8,
        KeyCode::F9 => S::F9,
        KeyCode::F10 => S::F10,
        KeyCode::F11 => S::F11,
        KeyCode::F12 => S::F12,
        KeyCode::Escape => S::Esc,
        KeyCode::Backquote => S::Tilde,
        KeyCode::Minus => S::Minus,
        KeyCode::Equal => S::Equals,
        KeyCode::Backspace => S::Backspace,
        KeyCode::Tab => S::Tab,
        KeyCode::BracketLeft => S::OpenBrace,
        KeyCode::BracketRight => S::CloseBrace,
        KeyCode::Enter | KeyCode::NumpadEnter => S::Enter,
        KeyCode::Semicolon => S::Colon,
        KeyCode::Quote => S::Quote,
        KeyCode::Backslash => S::Backslash,
        KeyCode::Comma => S::Comma,
        KeyCode::Period => S::Stop,
        KeyCode::Slash => S::Slash,
        KeyCode::Space => S::Space,
        KeyCode::Insert => S::Insert,
        KeyCode::Delete => S::Del,
        KeyCode::Home => S::Home,
        KeyCode::End => S::End,
        KeyCode::PageUp => S::PageUp,
        KeyCode::PageDown => S::PageDown,
        KeyCode::ArrowLeft => S::Left,
        KeyCode::ArrowRight => S::Right,
        KeyCode::ArrowUp => S::Up,
        KeyCode::ArrowDown => S::Down,
        KeyCode::ShiftLeft => S::LShift,
        KeyCode::ShiftRight => S::RShift,
        KeyCode::ControlLeft => S::LControl,
        KeyCode::ControlRight => S::RControl,
        KeyCode::AltLeft => S::Alt,
        KeyCode::AltRight => S::AltGr,
        KeyCode::SuperLeft => S::LWin,
        KeyCode::SuperRight => S::RWin,
        KeyCode::ContextMenu => S::Menu,
        KeyCode::CapsLock => S::CapsLock,
        KeyCode::NumLock => S::NumLock,
        KeyCode::ScrollLock => S::ScrLock,
        KeyCode::PrintScreen => S::PrtScr,
        KeyCode::Pause => S::Pause,
        _ => S::Nil,
    }
}

struct WinitWindow {
    id: WindowId,
    window: winit::window::Window,
}

impl NativeWindow for WinitWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn frame(&self) -> Rect {
        let origin = self
            .window
            .outer_position()
            .map(|p| Point::new(p.x, p.y))
            .unwrap_or_default();
        let size = self.window.outer_size();
        Rect::from_origin_size(origin, Size::new(size.width as i32, size.height as i32))
    }

    fn content_rect(&self) -> Rect {
        let origin = self
            .window
            .inner_position()
            .map(|p| Point::new(p.x, p.y))
            .unwrap_or_default();
        let size = self.window.inner_size();
        Rect::from_origin_size(origin, Size::new(size.width as i32, size.height as i32))
    }

    fn set_visible(&mut self, visible: bool) {
        self.window.set_visible(visible);
    }

    fn title(&self) -> String {
        self.window.title()
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn set_fullscreen(&mut self, state: bool) {
        self.window.set_fullscreen(state.then_some(Fullscreen::Borderless(None)));
    }

    fn maximize(&mut self) {
        self.window.set_maximized(true);
    }

    fn is_maximized(&self) -> bool {
        self.window.is_maximized()
    }

    fn is_minimized(&self) -> bool {
        self.window.is_minimized().unwrap_or(false)
    }

    fn set_cursor(&mut self, cursor: NativeCursor) -> bool {
        let icon = match cursor {
            NativeCursor::Hidden => {
                self.window.set_cursor_visible(false);
                return true;
            }
            NativeCursor::Arrow => CursorIcon::Default,
            NativeCursor::Crosshair => CursorIcon::Crosshair,
            NativeCursor::IBeam => CursorIcon::Text,
            NativeCursor::Wait => CursorIcon::Wait,
            NativeCursor::Link => CursorIcon::Pointer,
            NativeCursor::Help => CursorIcon::Help,
            NativeCursor::Forbidden => CursorIcon::NotAllowed,
            NativeCursor::Move => CursorIcon::Move,
            NativeCursor::SizeNS => CursorIcon::NsResize,
            NativeCursor::SizeWE => CursorIcon::EwResize,
            NativeCursor::SizeNESW => CursorIcon::NeswResize,
            NativeCursor::SizeNWSE => CursorIcon::NwseResize,
        };
        self.window.set_cursor_visible(true);
        self.window.set_cursor_icon(icon);
        true
    }

    fn set_mouse_position(&mut self, position: Point) {
        if let Err(err) = self
            .window
            .set_cursor_position(PhysicalPosition::new(position.x, position.y))
        {
            log::debug!("cannot move the mouse: {err}");
        }
    }

    fn capture_mouse(&mut self) {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked));
        if let Err(err) = grabbed {
            log::debug!("cannot capture the mouse: {err}");
        }
    }

    fn release_mouse(&mut self) {
        if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::None) {
            log::debug!("cannot release the mouse: {err}");
        }
    }

    fn invalidate_region(&mut self, _rect: Rect) {
        self.window.request_redraw();
    }
}
