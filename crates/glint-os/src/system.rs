use glint_config::{BackendKind, GlintConfig};

use crate::backend::headless::{HeadlessBackend, HeadlessInjector};
use crate::backend::{Backend, Capabilities};
use crate::error::{OsError, Result};
use crate::event::KeyModifiers;
use crate::event_queue::{EventQueue, EventSender};
use crate::window::{Window, WindowRef, WindowSpec};

/// The platform context: one backend, its event queue and the windows it
/// created.
///
/// Dropping the system clears the event queue before the backend goes
/// away, so no queued event keeps a window alive past its native
/// connection.
pub struct System {
    queue: EventQueue,
    backend: Box<dyn Backend>,
}

impl System {
    pub fn new(mut backend: Box<dyn Backend>) -> Self {
        log::info!("using {} backend", backend.name());
        let queue = EventQueue::new(backend.event_pump());
        Self { queue, backend }
    }

    pub fn headless() -> Self {
        Self::new(Box::new(HeadlessBackend::new()))
    }

    /// Headless system plus the handle that feeds it native events.
    pub fn headless_with_injector() -> (Self, HeadlessInjector) {
        let backend = HeadlessBackend::new();
        let injector = backend.injector();
        (Self::new(Box::new(backend)), injector)
    }

    pub fn from_config(config: &GlintConfig) -> Result<Self> {
        let mut system = match config.window.backend {
            BackendKind::Headless => Self::headless(),
            BackendKind::Native => Self::native()?,
        };
        system.set_translate_dead_keys(config.events.translate_dead_keys);
        Ok(system)
    }

    #[cfg(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios"))))]
    fn native() -> Result<Self> {
        Ok(Self::new(Box::new(crate::backend::winit::WinitBackend::new()?)))
    }

    #[cfg(not(all(feature = "winit", not(any(target_arch = "wasm32", target_os = "ios")))))]
    fn native() -> Result<Self> {
        Err(OsError::BackendUnavailable("winit"))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.backend.capabilities()
    }

    pub fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities().contains(capability)
    }

    pub fn event_queue(&mut self) -> &mut EventQueue {
        &mut self.queue
    }

    pub fn event_sender(&self) -> EventSender {
        self.queue.sender()
    }

    pub fn make_window(&mut self, spec: &WindowSpec) -> Result<WindowRef> {
        if !self.has_capability(Capabilities::MULTIPLE_WINDOWS) && self.queue.has_live_windows() {
            return Err(OsError::WindowCreation(format!(
                "{} backend supports a single window",
                self.backend.name()
            )));
        }
        let mut spec = spec.clone();
        if !self.has_capability(Capabilities::WINDOW_SCALE) {
            spec.scale = 1;
        }
        let native = self.backend.make_window(&spec)?;
        let window = Window::new(native, self.queue.sender(), &spec)?;
        self.queue.register_window(&window);
        Ok(window)
    }

    pub fn key_modifiers(&self) -> KeyModifiers {
        self.backend.key_modifiers()
    }

    pub fn is_key_pressed(&self, modifiers: KeyModifiers) -> bool {
        self.key_modifiers().contains(modifiers)
    }

    pub fn set_translate_dead_keys(&mut self, state: bool) {
        self.backend.set_translate_dead_keys(state);
    }
}

impl Drop for System {
    fn drop(&mut self) {
        self.queue.clear_events();
        self.queue.forget_windows();
        log::debug!("{} backend shut down", self.backend.name());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::event::{Event, EventType};

    #[test]
    fn dropping_the_system_releases_queued_window_references() -> anyhow::Result<()> {
        let mut system = System::headless();
        let window = system.make_window(&WindowSpec::new(10, 10))?;
        let sender = system.event_sender();
        sender.queue_event(Event::new(EventType::MouseMove).with_window(window.clone()));
        assert_eq!(Arc::strong_count(&window), 2);

        drop(system);
        assert_eq!(Arc::strong_count(&window), 1);
        Ok(())
    }

    #[test]
    fn config_selects_the_headless_backend() -> anyhow::Result<()> {
        let mut config = GlintConfig::default();
        config.window.backend = BackendKind::Headless;
        let system = System::from_config(&config)?;
        assert_eq!(system.backend_name(), "headless");
        assert!(system.has_capability(Capabilities::WINDOW_SCALE));
        assert!(!system.has_capability(Capabilities::COLOR_SPACES));
        Ok(())
    }

    #[test]
    fn windows_from_config_use_its_size_and_scale() -> anyhow::Result<()> {
        let mut config = GlintConfig::default();
        config.window.width = 320;
        config.window.height = 200;
        config.window.scale = 2;
        let mut system = System::headless();
        let window = system.make_window(&WindowSpec::from_config(&config.window))?;
        assert_eq!(window.width(), 160);
        assert_eq!(window.height(), 100);
        assert_eq!(window.title(), config.window.title);
        Ok(())
    }

    #[test]
    fn injected_events_reach_the_queue() {
        let (mut system, injector) = System::headless_with_injector();
        injector.input(None, Event::new(EventType::CloseApp));
        let ev = system.event_queue().get_event(Some(Duration::from_secs(1)));
        assert_eq!(ev.event_type(), EventType::CloseApp);
    }
}
