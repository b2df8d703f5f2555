//! glint-os: windows, input events and drag and drop over a pluggable
//! platform backend.
//!
//! A [`System`] owns the backend and the [`EventQueue`]. Applications pull
//! events with [`EventQueue::get_event`]; other threads push through an
//! [`EventSender`].

pub mod backend;
pub mod dnd;
pub mod error;
pub mod event;
pub mod event_queue;
pub mod system;
pub mod window;

pub use backend::headless::{HeadlessBackend, HeadlessInjector};
#[cfg(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios"))))]
pub use backend::winit::WinitBackend;
pub use backend::{Backend, Capabilities};
pub use dnd::{
    DragDataItemType, DragDataProvider, DragEvent, DragMessage, DragOutcome, DragTarget, DropOperation,
    DropOperations, StaticDragData,
};
pub use error::OsError;
pub use event::{Event, EventType, KeyModifiers, KeyScancode, MouseButton, PointerType};
pub use event_queue::{EventPump, EventQueue, EventSender, NativeEvent, WakeFn};
pub use system::System;
pub use window::{
    NativeCursor, NativeWindow, ResizeState, Window, WindowId, WindowMessage, WindowRef, WindowSpec, WindowState,
};
