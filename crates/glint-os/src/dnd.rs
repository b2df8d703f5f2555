//! Drag and drop between the platform and a window's [`DragTarget`].
//!
//! Backends report a drag session as a sequence of [`DragMessage`]s; the
//! window turns each into a fresh [`DragEvent`] for its target and reports
//! the resulting [`DropOperation`] back to the platform.

use std::path::PathBuf;

use bitflags::bitflags;
use glint_gfx::{Point, SurfaceRef};

use crate::window::Window;

/// The single operation a target settles on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DropOperation {
    #[default]
    None,
    Copy,
    Move,
    Link,
}

bitflags! {
    /// Operations a drag source allows.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DropOperations: u32 {
        const COPY = 1;
        const MOVE = 2;
        const LINK = 4;
        const ANY = Self::COPY.bits() | Self::MOVE.bits() | Self::LINK.bits();
    }
}

impl Default for DropOperations {
    fn default() -> Self {
        Self::empty()
    }
}

impl DropOperation {
    pub fn as_flags(self) -> DropOperations {
        match self {
            DropOperation::None => DropOperations::empty(),
            DropOperation::Copy => DropOperations::COPY,
            DropOperation::Move => DropOperations::MOVE,
            DropOperation::Link => DropOperations::LINK,
        }
    }

    /// `self` if `supported` allows it, else `None`.
    pub fn clamp_to(self, supported: DropOperations) -> DropOperation {
        if self != DropOperation::None && supported.contains(self.as_flags()) {
            self
        } else {
            DropOperation::None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragDataItemType {
    Paths,
    Image,
    Url,
}

/// Payload of a drag session. Check [`contains`](Self::contains) before
/// each typed fetch.
pub trait DragDataProvider: Send {
    fn contains(&self, item: DragDataItemType) -> bool;

    fn paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    fn image(&self) -> Option<SurfaceRef> {
        None
    }

    fn url(&self) -> Option<String> {
        None
    }
}

/// In-memory payload.
#[derive(Debug, Clone, Default)]
pub struct StaticDragData {
    paths: Vec<PathBuf>,
    image: Option<SurfaceRef>,
    url: Option<String>,
}

impl StaticDragData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_image(mut self, image: SurfaceRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

impl DragDataProvider for StaticDragData {
    fn contains(&self, item: DragDataItemType) -> bool {
        match item {
            DragDataItemType::Paths => !self.paths.is_empty(),
            DragDataItemType::Image => self.image.is_some(),
            DragDataItemType::Url => self.url.is_some(),
        }
    }

    fn paths(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }

    fn image(&self) -> Option<SurfaceRef> {
        self.image.clone()
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }
}

/// One drag callback's view of the session. Built fresh per callback.
pub struct DragEvent<'a> {
    target: &'a Window,
    supported: DropOperations,
    position: Point,
    data: &'a dyn DragDataProvider,
    drop_result: DropOperation,
    accept_drop: bool,
}

impl<'a> DragEvent<'a> {
    pub fn new(
        target: &'a Window,
        supported: DropOperations,
        position: Point,
        data: &'a dyn DragDataProvider,
    ) -> Self {
        Self {
            target,
            supported,
            position,
            data,
            drop_result: DropOperation::Copy,
            accept_drop: false,
        }
    }

    pub fn target(&self) -> &'a Window {
        self.target
    }

    /// Pointer position in window coordinates.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn supported_operations(&self) -> DropOperations {
        self.supported
    }

    pub fn source_supports(&self, op: DropOperation) -> bool {
        op != DropOperation::None && self.supported.contains(op.as_flags())
    }

    pub fn data(&self) -> &'a dyn DragDataProvider {
        self.data
    }

    pub fn drop_result(&self) -> DropOperation {
        self.drop_result
    }

    pub fn set_drop_result(&mut self, op: DropOperation) {
        self.drop_result = op;
    }

    pub fn is_drop_accepted(&self) -> bool {
        self.accept_drop
    }

    pub fn accept_drop(&mut self, accept: bool) {
        self.accept_drop = accept;
    }
}

/// Receives the drag session of a window. All methods default to no-ops.
pub trait DragTarget: Send {
    fn drag_enter(&mut self, _ev: &mut DragEvent<'_>) {}

    fn drag(&mut self, _ev: &mut DragEvent<'_>) {}

    fn drag_leave(&mut self, _ev: &mut DragEvent<'_>) {}

    /// Must call [`DragEvent::accept_drop`] to take the payload.
    fn drop(&mut self, _ev: &mut DragEvent<'_>) {}
}

/// Drag session step reported by a backend. Positions are in native pixels.
pub enum DragMessage {
    Enter {
        position: Point,
        operations: DropOperations,
        data: Box<dyn DragDataProvider>,
    },
    Over {
        position: Point,
        operations: DropOperations,
    },
    Leave,
    Drop {
        position: Point,
        operations: DropOperations,
        /// Replaces the payload stored at enter when present.
        data: Option<Box<dyn DragDataProvider>>,
    },
}

impl core::fmt::Debug for DragMessage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DragMessage::Enter {
                position, operations, ..
            } => f
                .debug_struct("Enter")
                .field("position", position)
                .field("operations", operations)
                .finish_non_exhaustive(),
            DragMessage::Over { position, operations } => f
                .debug_struct("Over")
                .field("position", position)
                .field("operations", operations)
                .finish(),
            DragMessage::Leave => f.write_str("Leave"),
            DragMessage::Drop {
                position, operations, ..
            } => f
                .debug_struct("Drop")
                .field("position", position)
                .field("operations", operations)
                .finish_non_exhaustive(),
        }
    }
}

/// What the window reports back to the platform for one drag step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DragOutcome {
    pub operation: DropOperation,
    /// Only meaningful for drops.
    pub accepted: bool,
}

/// Session state kept by a window between drag messages.
#[derive(Default)]
pub(crate) struct DragSession {
    pub(crate) data: Option<Box<dyn DragDataProvider>>,
    pub(crate) position: Point,
    pub(crate) operations: DropOperations,
}
