//! The process event queue and the native event pump it drains.
//!
//! One thread consumes with [`EventQueue::get_event`]. Any number of
//! threads produce through an [`EventSender`]; queueing wakes a consumer
//! blocked inside the pump.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::event::Event;
use crate::window::{Window, WindowId, WindowMessage, WindowRef};

/// Wakes a pump blocked in [`EventPump::wait`]. Callable from any thread.
pub type WakeFn = Arc<dyn Fn() + Send + Sync>;

/// What a platform pump hands to the queue.
#[derive(Debug)]
pub enum NativeEvent {
    /// A uniform input event, appended to the FIFO once its window is
    /// resolved. Mouse positions are in native pixels.
    Input { window: Option<WindowId>, event: Event },
    /// A message handled synchronously by the target window.
    Window { window: WindowId, message: WindowMessage },
}

/// Platform strategy behind an [`EventQueue`].
pub trait EventPump {
    /// Native events available without blocking.
    fn pending(&mut self) -> usize;

    fn next_native(&mut self) -> Option<NativeEvent>;

    /// Blocks until a native event arrives, the waker fires or `timeout`
    /// elapses. `None` waits indefinitely. Spurious returns are allowed.
    fn wait(&mut self, timeout: Option<Duration>);

    fn waker(&self) -> WakeFn;
}

struct Shared {
    events: Mutex<VecDeque<Event>>,
    wake: WakeFn,
}

impl Shared {
    fn push(&self, event: Event) {
        self.events.lock().push_back(event);
        (self.wake)();
    }
}

/// Cloneable producer handle, usable from any thread.
#[derive(Clone)]
pub struct EventSender {
    shared: Arc<Shared>,
}

impl EventSender {
    pub fn queue_event(&self, event: Event) {
        self.shared.push(event);
    }

    /// Handle that does not keep the queue alive.
    pub(crate) fn downgrade(&self) -> WeakEventSender {
        WeakEventSender {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

/// Producer handle held by windows. Events sent after the queue is gone
/// are dropped, so a queued event never keeps its own queue alive.
#[derive(Clone)]
pub(crate) struct WeakEventSender {
    shared: Weak<Shared>,
}

impl WeakEventSender {
    pub(crate) fn queue_event(&self, event: Event) {
        match self.shared.upgrade() {
            Some(shared) => shared.push(event),
            None => log::debug!("event queue gone, dropping {:?}", event.event_type()),
        }
    }
}

impl core::fmt::Debug for EventSender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSender")
            .field("queued", &self.shared.events.lock().len())
            .finish()
    }
}

pub struct EventQueue {
    shared: Arc<Shared>,
    pump: Box<dyn EventPump>,
    windows: HashMap<WindowId, Weak<Window>>,
}

impl EventQueue {
    pub fn new(pump: Box<dyn EventPump>) -> Self {
        let shared = Arc::new(Shared {
            events: Mutex::new(VecDeque::new()),
            wake: pump.waker(),
        });
        Self {
            shared,
            pump,
            windows: HashMap::new(),
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            shared: self.shared.clone(),
        }
    }

    /// Returns the next event, waiting up to `timeout` for one. `None`
    /// waits indefinitely and `Some(Duration::ZERO)` only polls. Returns
    /// an event of type [`EventType::None`](crate::EventType::None) when
    /// the time runs out.
    pub fn get_event(&mut self, timeout: Option<Duration>) -> Event {
        let deadline = timeout.map(|timeout| Instant::now() + timeout);
        loop {
            self.drain_native();
            if let Some(event) = self.shared.events.lock().pop_front() {
                return event;
            }

            let remaining = match deadline {
                None => None,
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Event::none();
                    }
                    Some(deadline - now)
                }
            };
            self.pump.wait(remaining);
        }
    }

    pub fn queue_event(&self, event: Event) {
        self.shared.push(event);
    }

    /// Drops every queued event along with the window references they hold.
    pub fn clear_events(&self) {
        let drained: Vec<Event> = self.shared.events.lock().drain(..).collect();
        if !drained.is_empty() {
            log::debug!("cleared {} queued events", drained.len());
        }
    }

    pub fn len(&self) -> usize {
        self.shared.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn register_window(&mut self, window: &WindowRef) {
        self.windows.retain(|_, weak| weak.strong_count() > 0);
        self.windows.insert(window.id(), Arc::downgrade(window));
    }

    pub(crate) fn window(&self, id: WindowId) -> Option<WindowRef> {
        self.windows.get(&id).and_then(Weak::upgrade)
    }

    pub(crate) fn has_live_windows(&self) -> bool {
        self.windows.values().any(|weak| weak.strong_count() > 0)
    }

    pub(crate) fn forget_windows(&mut self) {
        self.windows.clear();
    }

    fn drain_native(&mut self) {
        let count = self.pump.pending();
        for _ in 0..count {
            let Some(native) = self.pump.next_native() else {
                break;
            };
            self.dispatch(native);
        }
    }

    fn dispatch(&mut self, native: NativeEvent) {
        match native {
            NativeEvent::Input { window: None, event } => self.shared.events.lock().push_back(event),
            NativeEvent::Input {
                window: Some(id),
                mut event,
            } => {
                let Some(window) = self.window(id) else {
                    log::debug!("dropping {:?} for closed window {id}", event.event_type());
                    return;
                };
                if event.is_mouse_event() {
                    event.set_position(window.client_to_window(event.position()));
                }
                event.set_window(window);
                self.shared.events.lock().push_back(event);
            }
            NativeEvent::Window { window: id, message } => match self.window(id) {
                Some(window) => window.process_message(message),
                None => log::debug!("dropping {message:?} for closed window {id}"),
            },
        }
    }
}
