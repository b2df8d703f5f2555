use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use glint_gfx::{Point, Rect};
use glint_os::{
    DragDataItemType, DragEvent, DragMessage, DragTarget, DropOperation, DropOperations, EventType, StaticDragData,
    System, WindowMessage, WindowSpec,
};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Record {
    entered: bool,
    left: bool,
    drags: usize,
    drops: usize,
    position: Point,
    paths: Vec<PathBuf>,
}

/// Accepts copies inside `zone` only.
struct DropZone {
    zone: Rect,
    record: Arc<Mutex<Record>>,
}

impl DropZone {
    fn propose(&self, ev: &mut DragEvent<'_>) {
        if self.zone.contains(ev.position()) && ev.source_supports(DropOperation::Copy) {
            ev.set_drop_result(DropOperation::Copy);
        } else {
            ev.set_drop_result(DropOperation::None);
        }
    }
}

impl DragTarget for DropZone {
    fn drag_enter(&mut self, ev: &mut DragEvent<'_>) {
        self.propose(ev);
        let mut record = self.record.lock();
        record.entered = true;
        record.left = false;
        record.drags = 0;
        record.position = ev.position();
    }

    fn drag(&mut self, ev: &mut DragEvent<'_>) {
        self.propose(ev);
        let mut record = self.record.lock();
        record.drags += 1;
        record.position = ev.position();
    }

    fn drag_leave(&mut self, ev: &mut DragEvent<'_>) {
        let mut record = self.record.lock();
        record.entered = false;
        record.left = true;
        record.position = ev.position();
    }

    fn drop(&mut self, ev: &mut DragEvent<'_>) {
        ev.accept_drop(self.zone.contains(ev.position()));
        let mut record = self.record.lock();
        record.drops += 1;
        record.entered = false;
        if ev.is_drop_accepted() && ev.data().contains(DragDataItemType::Paths) {
            record.paths = ev.data().paths();
        }
    }
}

fn files() -> Box<StaticDragData> {
    Box::new(StaticDragData::new().with_paths(["/tmp/one.png", "/tmp/two.png"]))
}

fn enter(x: i32, y: i32, operations: DropOperations) -> DragMessage {
    DragMessage::Enter {
        position: Point::new(x, y),
        operations,
        data: files(),
    }
}

fn over(x: i32, y: i32) -> DragMessage {
    DragMessage::Over {
        position: Point::new(x, y),
        operations: DropOperations::ANY,
    }
}

fn drop_at(x: i32, y: i32) -> DragMessage {
    DragMessage::Drop {
        position: Point::new(x, y),
        operations: DropOperations::ANY,
        data: None,
    }
}

fn zone_window(system: &mut System) -> anyhow::Result<(glint_os::WindowRef, Arc<Mutex<Record>>)> {
    let window = system.make_window(&WindowSpec::new(200, 200).with_title("Drag and Drop"))?;
    let record = Arc::new(Mutex::new(Record::default()));
    window.set_drag_target(Some(Box::new(DropZone {
        zone: Rect::new(50, 50, 100, 100),
        record: record.clone(),
    })));
    Ok((window, record))
}

#[test]
fn drop_inside_the_zone_takes_the_paths() -> anyhow::Result<()> {
    let mut system = System::headless();
    let (window, record) = zone_window(&mut system)?;

    let outcome = window.dispatch_drag(enter(60, 60, DropOperations::ANY));
    assert_eq!(outcome.operation, DropOperation::Copy);
    window.dispatch_drag(over(70, 70));
    window.dispatch_drag(over(80, 80));
    let outcome = window.dispatch_drag(drop_at(80, 80));

    assert!(outcome.accepted);
    assert_eq!(outcome.operation, DropOperation::Copy);
    let record = record.lock();
    assert_eq!(record.drags, 2);
    assert_eq!(record.drops, 1);
    assert_eq!(record.paths, vec![PathBuf::from("/tmp/one.png"), PathBuf::from("/tmp/two.png")]);
    Ok(())
}

#[test]
fn outside_the_zone_is_refused_even_after_a_tentative_accept() -> anyhow::Result<()> {
    let mut system = System::headless();
    let (window, record) = zone_window(&mut system)?;

    assert_eq!(
        window.dispatch_drag(enter(60, 60, DropOperations::ANY)).operation,
        DropOperation::Copy
    );
    assert_eq!(window.dispatch_drag(over(10, 10)).operation, DropOperation::None);
    assert_eq!(window.dispatch_drag(over(70, 70)).operation, DropOperation::Copy);

    let outcome = window.dispatch_drag(drop_at(160, 20));
    assert!(!outcome.accepted);
    assert_eq!(outcome.operation, DropOperation::None);
    assert!(record.lock().paths.is_empty());
    Ok(())
}

#[test]
fn reentering_outside_the_zone_refuses_the_drop() -> anyhow::Result<()> {
    let mut system = System::headless();
    let (window, record) = zone_window(&mut system)?;

    window.dispatch_drag(enter(60, 60, DropOperations::ANY));
    window.dispatch_drag(DragMessage::Leave);
    assert!(record.lock().left);

    let outcome = window.dispatch_drag(enter(170, 30, DropOperations::ANY));
    assert_eq!(outcome.operation, DropOperation::None);
    {
        let record = record.lock();
        assert!(record.entered);
        assert_eq!(record.position, Point::new(170, 30));
    }

    let outcome = window.dispatch_drag(drop_at(170, 30));
    assert!(!outcome.accepted);
    assert_eq!(outcome.operation, DropOperation::None);
    assert_eq!(record.lock().drops, 1);
    assert!(record.lock().paths.is_empty());

    // a later session that ends inside the zone still succeeds
    window.dispatch_drag(DragMessage::Leave);
    assert_eq!(
        window.dispatch_drag(enter(90, 90, DropOperations::ANY)).operation,
        DropOperation::Copy
    );
    let outcome = window.dispatch_drag(drop_at(95, 95));
    assert!(outcome.accepted);
    assert_eq!(record.lock().paths.len(), 2);
    Ok(())
}

#[test]
fn unsupported_operations_are_reported_as_none() -> anyhow::Result<()> {
    let mut system = System::headless();
    let (window, _record) = zone_window(&mut system)?;
    let outcome = window.dispatch_drag(enter(60, 60, DropOperations::MOVE));
    assert_eq!(outcome.operation, DropOperation::None);
    Ok(())
}

#[test]
fn leave_ends_the_session() -> anyhow::Result<()> {
    let mut system = System::headless();
    let (window, record) = zone_window(&mut system)?;

    window.dispatch_drag(enter(60, 60, DropOperations::ANY));
    window.dispatch_drag(DragMessage::Leave);
    assert!(record.lock().left);

    // the payload went away with the session
    let outcome = window.dispatch_drag(drop_at(60, 60));
    assert!(!outcome.accepted);
    assert_eq!(record.lock().drops, 0);
    Ok(())
}

#[test]
fn scaled_windows_see_window_coordinates() -> anyhow::Result<()> {
    let mut system = System::headless();
    let window = system.make_window(&WindowSpec::new(400, 400).with_scale(2))?;
    let record = Arc::new(Mutex::new(Record::default()));
    window.set_drag_target(Some(Box::new(DropZone {
        zone: Rect::new(50, 50, 100, 100),
        record: record.clone(),
    })));

    // 120 native pixels is 60 in window coordinates
    let outcome = window.dispatch_drag(enter(120, 120, DropOperations::COPY));
    assert_eq!(outcome.operation, DropOperation::Copy);
    assert_eq!(record.lock().position, Point::new(60, 60));
    Ok(())
}

#[test]
fn native_drag_messages_go_through_the_queue() -> anyhow::Result<()> {
    let (mut system, injector) = System::headless_with_injector();
    let (window, record) = zone_window(&mut system)?;

    injector.message(window.id(), WindowMessage::Drag(enter(60, 60, DropOperations::COPY)));
    injector.message(window.id(), WindowMessage::Drag(over(61, 61)));
    injector.message(window.id(), WindowMessage::Drag(drop_at(62, 62)));
    let ev = system.event_queue().get_event(Some(Duration::ZERO));

    assert_eq!(ev.event_type(), EventType::None);
    let record = record.lock();
    assert_eq!(record.drags, 1);
    assert_eq!(record.drops, 1);
    assert_eq!(record.paths.len(), 2);
    Ok(())
}

#[test]
fn files_dropped_on_a_window_without_target_become_an_event() -> anyhow::Result<()> {
    let (mut system, injector) = System::headless_with_injector();
    let window = system.make_window(&WindowSpec::new(100, 100))?;
    assert!(!window.has_drag_target());

    injector.message(
        window.id(),
        WindowMessage::Drag(DragMessage::Drop {
            position: Point::new(5, 7),
            operations: DropOperations::ANY,
            data: Some(files()),
        }),
    );
    let ev = system.event_queue().get_event(Some(Duration::ZERO));
    assert_eq!(ev.event_type(), EventType::DropFiles);
    assert_eq!(ev.files().len(), 2);
    assert_eq!(ev.position(), Point::new(5, 7));
    assert!(ev.window().is_some_and(|w| Arc::ptr_eq(w, &window)));
    Ok(())
}

#[test]
fn url_only_drops_are_not_files() -> anyhow::Result<()> {
    let mut system = System::headless();
    let window = system.make_window(&WindowSpec::new(100, 100))?;
    let outcome = window.dispatch_drag(DragMessage::Drop {
        position: Point::new(5, 7),
        operations: DropOperations::ANY,
        data: Some(Box::new(StaticDragData::new().with_url("https://example.com"))),
    });
    assert!(!outcome.accepted);
    assert!(system.event_queue().is_empty());
    Ok(())
}
