//! Windows, their lifecycle and the messages backends send them.

use std::mem;
use std::sync::Arc;

use glint_config::WindowConfig;
use glint_gfx::{Point, Rect, RgbaSurface, Size};
use parking_lot::{Mutex, MutexGuard};

use crate::dnd::{
    DragDataItemType, DragDataProvider, DragEvent, DragMessage, DragOutcome, DragSession, DragTarget,
    DropOperation, DropOperations, StaticDragData,
};
use crate::error::Result;
use crate::event::{Event, EventType};
use crate::event_queue::{EventSender, WeakEventSender};

pub type WindowId = u64;
pub type WindowRef = Arc<Window>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    #[default]
    Created,
    Visible,
    Hidden,
    Closing,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeState {
    #[default]
    Idle,
    LiveResizing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NativeCursor {
    Hidden,
    #[default]
    Arrow,
    Crosshair,
    IBeam,
    Wait,
    Link,
    Help,
    Forbidden,
    Move,
    SizeNS,
    SizeWE,
    SizeNESW,
    SizeNWSE,
}

/// Parameters for [`System::make_window`](crate::System::make_window).
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    /// Screen position of the content area; the platform picks when unset.
    pub position: Option<Point>,
    /// Content size in native pixels.
    pub content_size: Size,
    pub scale: i32,
    pub visible: bool,
    pub resizable: bool,
    pub borderless: bool,
    pub floating: bool,
    pub maximized: bool,
}

impl Default for WindowSpec {
    fn default() -> Self {
        Self {
            title: String::new(),
            position: None,
            content_size: Size::new(640, 480),
            scale: 1,
            visible: true,
            resizable: true,
            borderless: false,
            floating: false,
            maximized: false,
        }
    }
}

impl WindowSpec {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            content_size: Size::new(width, height),
            ..Self::default()
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.width, config.height)
            .with_title(config.title.clone())
            .with_scale(config.scale)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_scale(mut self, scale: i32) -> Self {
        self.scale = scale.max(1);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_borderless(mut self, borderless: bool) -> Self {
        self.borderless = borderless;
        self
    }

    pub fn with_floating(mut self, floating: bool) -> Self {
        self.floating = floating;
        self
    }

    pub fn with_maximized(mut self, maximized: bool) -> Self {
        self.maximized = maximized;
        self
    }
}

/// Notifications a backend delivers synchronously to a window.
#[derive(Debug)]
pub enum WindowMessage {
    StartResizing,
    Resizing(Size),
    EndResizing,
    /// A size change outside any start/end pair.
    Resized(Size),
    CloseRequested,
    Drag(DragMessage),
}

/// The platform side of a [`Window`]. Geometry is in native pixels.
///
/// Optional features default to no-ops for platforms that lack them.
pub trait NativeWindow: Send {
    fn id(&self) -> WindowId;

    fn native_handle(&self) -> u64 {
        self.id()
    }

    fn frame(&self) -> Rect;

    fn content_rect(&self) -> Rect;

    /// Told about size changes reported through window messages.
    fn resized(&mut self, _size: Size) {}

    fn set_visible(&mut self, visible: bool);

    fn title(&self) -> String;

    fn set_title(&mut self, title: &str);

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn set_fullscreen(&mut self, _state: bool) {}

    fn maximize(&mut self) {}

    fn is_maximized(&self) -> bool {
        false
    }

    fn is_minimized(&self) -> bool {
        false
    }

    /// Returns false when the cursor is not available.
    fn set_cursor(&mut self, _cursor: NativeCursor) -> bool {
        false
    }

    fn set_mouse_position(&mut self, _position: Point) {}

    fn capture_mouse(&mut self) {}

    fn release_mouse(&mut self) {}

    fn invalidate_region(&mut self, _rect: Rect) {}
}

struct WindowInner {
    state: WindowState,
    scale: i32,
    resize_depth: u32,
    resized_while_live: bool,
    drag: DragSession,
}

type ResizeHandler = Box<dyn FnMut(&Window) + Send>;

/// One native window. Shared as a [`WindowRef`]; dropping the last
/// reference releases the native window.
///
/// Window coordinates are native pixels divided by [`scale`](Self::scale).
pub struct Window {
    id: WindowId,
    native: Mutex<Box<dyn NativeWindow>>,
    inner: Mutex<WindowInner>,
    surface: Mutex<RgbaSurface>,
    drag_target: Mutex<Option<Box<dyn DragTarget>>>,
    handle_resize: Mutex<Option<ResizeHandler>>,
    sender: WeakEventSender,
}

impl Window {
    pub(crate) fn new(native: Box<dyn NativeWindow>, sender: EventSender, spec: &WindowSpec) -> Result<WindowRef> {
        let scale = spec.scale.max(1);
        let content = native.content_rect();
        let surface = RgbaSurface::new(content.w / scale, content.h / scale)?;
        let id = native.id();
        log::info!("created window {id} ({}x{} @{scale}x)", content.w, content.h);

        Ok(Arc::new(Self {
            id,
            native: Mutex::new(native),
            inner: Mutex::new(WindowInner {
                state: if spec.visible {
                    WindowState::Visible
                } else {
                    WindowState::Created
                },
                scale,
                resize_depth: 0,
                resized_while_live: false,
                drag: DragSession::default(),
            }),
            surface: Mutex::new(surface),
            drag_target: Mutex::new(None),
            handle_resize: Mutex::new(None),
            sender: sender.downgrade(),
        }))
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn native_handle(&self) -> u64 {
        self.native.lock().native_handle()
    }

    pub fn state(&self) -> WindowState {
        self.inner.lock().state
    }

    /// Outer rectangle in screen pixels, decorations included.
    pub fn frame(&self) -> Rect {
        self.native.lock().frame()
    }

    /// Drawable area in screen pixels.
    pub fn content_rect(&self) -> Rect {
        self.native.lock().content_rect()
    }

    pub fn scale(&self) -> i32 {
        self.inner.lock().scale
    }

    /// Changes the scale and reallocates the back-buffer.
    pub fn set_scale(&self, scale: i32) {
        let scale = scale.max(1);
        self.inner.lock().scale = scale;
        let size = self.content_rect().size();
        self.surface.lock().resize(size.w / scale, size.h / scale);
    }

    pub fn width(&self) -> i32 {
        self.content_rect().w / self.scale()
    }

    pub fn height(&self) -> i32 {
        self.content_rect().h / self.scale()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// CPU back-buffer sized to the content area divided by the scale.
    pub fn surface(&self) -> MutexGuard<'_, RgbaSurface> {
        self.surface.lock()
    }

    pub fn is_visible(&self) -> bool {
        self.state() == WindowState::Visible
    }

    pub fn set_visible(&self, visible: bool) {
        {
            let mut inner = self.inner.lock();
            if matches!(inner.state, WindowState::Closing | WindowState::Destroyed) {
                return;
            }
            inner.state = if visible {
                WindowState::Visible
            } else {
                WindowState::Hidden
            };
        }
        self.native.lock().set_visible(visible);
    }

    pub fn is_fullscreen(&self) -> bool {
        self.native.lock().is_fullscreen()
    }

    pub fn set_fullscreen(&self, state: bool) {
        self.native.lock().set_fullscreen(state);
    }

    pub fn maximize(&self) {
        self.native.lock().maximize();
    }

    pub fn is_maximized(&self) -> bool {
        self.native.lock().is_maximized()
    }

    pub fn is_minimized(&self) -> bool {
        self.native.lock().is_minimized()
    }

    pub fn title(&self) -> String {
        self.native.lock().title()
    }

    pub fn set_title(&self, title: &str) {
        self.native.lock().set_title(title);
    }

    pub fn set_cursor(&self, cursor: NativeCursor) -> bool {
        self.native.lock().set_cursor(cursor)
    }

    /// Moves the pointer to `position` in window coordinates.
    pub fn set_mouse_position(&self, position: Point) {
        let scale = self.scale();
        self.native
            .lock()
            .set_mouse_position(Point::new(position.x * scale, position.y * scale));
    }

    pub fn capture_mouse(&self) {
        self.native.lock().capture_mouse();
    }

    pub fn release_mouse(&self) {
        self.native.lock().release_mouse();
    }

    pub fn invalidate(&self) {
        self.invalidate_region(self.bounds());
    }

    /// Asks the platform to repaint `rect`, given in window coordinates.
    pub fn invalidate_region(&self, rect: Rect) {
        let scale = self.scale();
        self.native
            .lock()
            .invalidate_region(Rect::new(rect.x * scale, rect.y * scale, rect.w * scale, rect.h * scale));
    }

    pub fn point_to_screen(&self, point: Point) -> Point {
        let scale = self.scale();
        Point::new(point.x * scale, point.y * scale) + self.content_rect().origin()
    }

    pub fn point_from_screen(&self, point: Point) -> Point {
        self.client_to_window(point - self.content_rect().origin())
    }

    /// Converts native pixels relative to the content area into window
    /// coordinates.
    pub fn client_to_window(&self, point: Point) -> Point {
        let scale = self.scale();
        Point::new(point.x / scale, point.y / scale)
    }

    pub fn set_drag_target(&self, target: Option<Box<dyn DragTarget>>) {
        *self.drag_target.lock() = target;
    }

    pub fn has_drag_target(&self) -> bool {
        self.drag_target.lock().is_some()
    }

    /// Called synchronously for every size change during a live resize.
    pub fn set_handle_resize(&self, handler: impl FnMut(&Window) + Send + 'static) {
        *self.handle_resize.lock() = Some(Box::new(handler));
    }

    pub fn resize_state(&self) -> ResizeState {
        if self.inner.lock().resize_depth > 0 {
            ResizeState::LiveResizing
        } else {
            ResizeState::Idle
        }
    }

    /// Moves to `Closing`, hides the native window and queues a
    /// `CloseWindow` event.
    pub fn close(self: &Arc<Self>) {
        {
            let mut inner = self.inner.lock();
            if matches!(inner.state, WindowState::Closing | WindowState::Destroyed) {
                return;
            }
            inner.state = WindowState::Closing;
        }
        self.native.lock().set_visible(false);
        self.queue(EventType::CloseWindow);
    }

    pub(crate) fn process_message(self: &Arc<Self>, message: WindowMessage) {
        match message {
            WindowMessage::StartResizing => self.inner.lock().resize_depth += 1,
            WindowMessage::Resizing(size) | WindowMessage::Resized(size) => {
                self.apply_size(size);
                let live = {
                    let mut inner = self.inner.lock();
                    inner.resized_while_live |= inner.resize_depth > 0;
                    inner.resize_depth > 0
                };
                if live {
                    self.call_handle_resize();
                } else {
                    self.queue(EventType::ResizeWindow);
                }
            }
            WindowMessage::EndResizing => {
                let finished = {
                    let mut inner = self.inner.lock();
                    if inner.resize_depth == 0 {
                        false
                    } else {
                        inner.resize_depth -= 1;
                        inner.resize_depth == 0 && mem::take(&mut inner.resized_while_live)
                    }
                };
                if finished {
                    self.queue(EventType::ResizeWindow);
                }
            }
            WindowMessage::CloseRequested => self.queue(EventType::CloseWindow),
            WindowMessage::Drag(message) => {
                let outcome = self.dispatch_drag(message);
                log::debug!("window {} drag outcome {outcome:?}", self.id);
            }
        }
    }

    /// Runs one drag step against the drag target and returns what to
    /// report to the platform.
    ///
    /// Without a target, paths dropped on the window become a `DropFiles`
    /// event.
    pub fn dispatch_drag(self: &Arc<Self>, message: DragMessage) -> DragOutcome {
        match message {
            DragMessage::Enter {
                position,
                operations,
                data,
            } => {
                let position = self.client_to_window(position);
                let operation = self
                    .with_drag_target(|target| {
                        let mut ev = DragEvent::new(self, operations, position, &*data);
                        target.drag_enter(&mut ev);
                        ev.drop_result()
                    })
                    .unwrap_or_else(|| files_operation(&*data));
                self.inner.lock().drag = DragSession {
                    data: Some(data),
                    position,
                    operations,
                };
                DragOutcome {
                    operation: operation.clamp_to(operations),
                    accepted: false,
                }
            }
            DragMessage::Over { position, operations } => {
                let position = self.client_to_window(position);
                let data = {
                    let mut inner = self.inner.lock();
                    inner.drag.position = position;
                    inner.drag.operations = operations;
                    inner.drag.data.take()
                };
                let data = data.unwrap_or_else(|| Box::new(StaticDragData::new()));
                let operation = self
                    .with_drag_target(|target| {
                        let mut ev = DragEvent::new(self, operations, position, &*data);
                        target.drag(&mut ev);
                        ev.drop_result()
                    })
                    .unwrap_or_else(|| files_operation(&*data));
                self.inner.lock().drag.data = Some(data);
                DragOutcome {
                    operation: operation.clamp_to(operations),
                    accepted: false,
                }
            }
            DragMessage::Leave => {
                let session = mem::take(&mut self.inner.lock().drag);
                let data = session.data.unwrap_or_else(|| Box::new(StaticDragData::new()));
                self.with_drag_target(|target| {
                    let mut ev = DragEvent::new(self, DropOperations::empty(), session.position, &*data);
                    target.drag_leave(&mut ev);
                });
                DragOutcome::default()
            }
            DragMessage::Drop {
                position,
                operations,
                data,
            } => {
                let position = self.client_to_window(position);
                let session = mem::take(&mut self.inner.lock().drag);
                let Some(data) = data.or(session.data) else {
                    log::debug!("window {}: drop without payload", self.id);
                    return DragOutcome::default();
                };

                let handled = self.with_drag_target(|target| {
                    let mut ev = DragEvent::new(self, operations, position, &*data);
                    target.drop(&mut ev);
                    (ev.is_drop_accepted(), ev.drop_result())
                });
                match handled {
                    Some((true, operation)) => DragOutcome {
                        operation: operation.clamp_to(operations),
                        accepted: true,
                    },
                    Some((false, _)) => DragOutcome::default(),
                    None => self.drop_files(&*data, position, operations),
                }
            }
        }
    }

    fn drop_files(self: &Arc<Self>, data: &dyn DragDataProvider, position: Point, operations: DropOperations) -> DragOutcome {
        if !data.contains(DragDataItemType::Paths) {
            return DragOutcome::default();
        }
        let files = data.paths();
        if files.is_empty() {
            return DragOutcome::default();
        }
        self.sender
            .queue_event(Event::drop_files(files, position).with_window(self.clone()));
        DragOutcome {
            operation: DropOperation::Copy.clamp_to(operations),
            accepted: true,
        }
    }

    /// Calls `f` with the drag target while no window lock is held. A
    /// target installed by `f` itself wins over the one being called.
    fn with_drag_target<R>(&self, f: impl FnOnce(&mut dyn DragTarget) -> R) -> Option<R> {
        let mut target = self.drag_target.lock().take()?;
        let result = f(&mut *target);
        let mut slot = self.drag_target.lock();
        if slot.is_none() {
            *slot = Some(target);
        }
        Some(result)
    }

    fn apply_size(&self, size: Size) {
        self.native.lock().resized(size);
        let scale = self.scale();
        self.surface.lock().resize(size.w / scale, size.h / scale);
    }

    fn call_handle_resize(&self) {
        let Some(mut handler) = self.handle_resize.lock().take() else {
            return;
        };
        handler(self);
        let mut slot = self.handle_resize.lock();
        if slot.is_none() {
            *slot = Some(handler);
        }
    }

    fn queue(self: &Arc<Self>, event_type: EventType) {
        self.sender
            .queue_event(Event::new(event_type).with_window(self.clone()));
    }
}

/// Result offered for a payload when the window has no drag target.
fn files_operation(data: &dyn DragDataProvider) -> DropOperation {
    if data.contains(DragDataItemType::Paths) {
        DropOperation::Copy
    } else {
        DropOperation::None
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.inner.get_mut().state = WindowState::Destroyed;
        log::info!("destroyed window {}", self.id);
    }
}

impl core::fmt::Debug for Window {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("state", &inner.state)
            .field("scale", &inner.scale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::backend::Backend;
    use crate::backend::headless::HeadlessBackend;
    use crate::event_queue::EventQueue;

    struct Fixture {
        _backend: HeadlessBackend,
        queue: EventQueue,
        window: WindowRef,
    }

    fn fixture(spec: WindowSpec) -> anyhow::Result<Fixture> {
        let mut backend = HeadlessBackend::new();
        let mut queue = EventQueue::new(backend.event_pump());
        let window = Window::new(backend.make_window(&spec)?, queue.sender(), &spec)?;
        queue.register_window(&window);
        Ok(Fixture {
            _backend: backend,
            queue,
            window,
        })
    }

    fn drain(queue: &mut EventQueue) -> Vec<EventType> {
        let mut types = Vec::new();
        loop {
            let ev = queue.get_event(Some(Duration::ZERO));
            if ev.event_type() == EventType::None {
                return types;
            }
            types.push(ev.event_type());
        }
    }

    #[test]
    fn live_resize_queues_a_single_event() -> anyhow::Result<()> {
        let mut fx = fixture(WindowSpec::new(100, 100))?;
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        fx.window.set_handle_resize(move |window| {
            assert_eq!(window.resize_state(), ResizeState::LiveResizing);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        fx.window.process_message(WindowMessage::StartResizing);
        for step in 1..=5 {
            fx.window
                .process_message(WindowMessage::Resizing(Size::new(100 + step * 10, 100)));
        }
        assert!(fx.queue.is_empty());
        fx.window.process_message(WindowMessage::EndResizing);

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(drain(&mut fx.queue), vec![EventType::ResizeWindow]);
        assert_eq!(fx.window.resize_state(), ResizeState::Idle);
        assert_eq!(fx.window.width(), 150);
        assert_eq!(fx.window.surface().as_image().width(), 150);
        Ok(())
    }

    #[test]
    fn nested_resize_pairs_are_counted() -> anyhow::Result<()> {
        let mut fx = fixture(WindowSpec::new(50, 50))?;
        fx.window.process_message(WindowMessage::StartResizing);
        fx.window.process_message(WindowMessage::StartResizing);
        fx.window.process_message(WindowMessage::Resizing(Size::new(60, 60)));
        fx.window.process_message(WindowMessage::EndResizing);
        assert_eq!(fx.window.resize_state(), ResizeState::LiveResizing);
        assert!(fx.queue.is_empty());
        fx.window.process_message(WindowMessage::EndResizing);
        assert_eq!(drain(&mut fx.queue), vec![EventType::ResizeWindow]);

        // unmatched end is ignored
        fx.window.process_message(WindowMessage::EndResizing);
        assert!(fx.queue.is_empty());
        Ok(())
    }

    #[test]
    fn resize_outside_live_resize_is_queued_immediately() -> anyhow::Result<()> {
        let mut fx = fixture(WindowSpec::new(50, 50).with_scale(2))?;
        fx.window.process_message(WindowMessage::Resized(Size::new(80, 40)));
        fx.window.process_message(WindowMessage::Resized(Size::new(90, 40)));
        assert_eq!(
            drain(&mut fx.queue),
            vec![EventType::ResizeWindow, EventType::ResizeWindow]
        );
        assert_eq!(fx.window.bounds(), Rect::new(0, 0, 45, 20));
        Ok(())
    }

    #[test]
    fn visibility_follows_the_state_machine() -> anyhow::Result<()> {
        let mut fx = fixture(WindowSpec::new(10, 10).with_visible(false))?;
        assert_eq!(fx.window.state(), WindowState::Created);
        fx.window.set_visible(true);
        assert!(fx.window.is_visible());
        fx.window.set_visible(false);
        assert_eq!(fx.window.state(), WindowState::Hidden);

        fx.window.close();
        fx.window.close();
        assert_eq!(fx.window.state(), WindowState::Closing);
        fx.window.set_visible(true);
        assert_eq!(fx.window.state(), WindowState::Closing);
        assert_eq!(drain(&mut fx.queue), vec![EventType::CloseWindow]);
        Ok(())
    }

    #[test]
    fn screen_points_account_for_origin_and_scale() -> anyhow::Result<()> {
        let spec = WindowSpec::new(200, 100)
            .with_position(Point::new(30, 40))
            .with_scale(2);
        let fx = fixture(spec)?;
        assert_eq!(fx.window.bounds(), Rect::new(0, 0, 100, 50));
        assert_eq!(fx.window.point_to_screen(Point::new(5, 5)), Point::new(40, 50));
        assert_eq!(fx.window.point_from_screen(Point::new(40, 50)), Point::new(5, 5));

        fx.window.set_scale(4);
        assert_eq!(fx.window.surface().as_image().width(), 50);
        Ok(())
    }

    #[test]
    fn close_request_queues_close_window_event() -> anyhow::Result<()> {
        let mut fx = fixture(WindowSpec::new(10, 10))?;
        fx.window.process_message(WindowMessage::CloseRequested);
        let ev = fx.queue.get_event(Some(Duration::ZERO));
        assert_eq!(ev.event_type(), EventType::CloseWindow);
        assert!(ev.window().is_some_and(|w| w.id() == fx.window.id()));
        assert_eq!(fx.window.state(), WindowState::Visible);
        Ok(())
    }

    #[test]
    fn closing_after_the_queue_is_gone_frees_the_window() -> anyhow::Result<()> {
        let fx = fixture(WindowSpec::new(10, 10))?;
        let window = fx.window.clone();
        let weak = Arc::downgrade(&window);
        drop(fx);

        window.close();
        assert_eq!(window.state(), WindowState::Closing);
        drop(window);
        assert!(weak.upgrade().is_none());
        Ok(())
    }
}
