//! Input and output events exchanged with the rendering engine.
//!
//! The engine feeds [`FrameTick`]s and [`PointerEvent`]s in; the scene
//! answers with [`SceneEvent`]s when something the UI cares about changes.

use memverse_core::types::MemoryId;

pub use memverse_core::types::FrameTick;

/// Pointer interaction reported by the engine's picking pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerEvent {
    /// The pointer entered a memory frame.
    Over(MemoryId),
    /// The pointer left whatever it was over.
    Out,
    /// A memory frame was clicked.
    Click(MemoryId),
}

/// Scene-side changes the UI layer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    /// Hover highlight moved. `None` means nothing is hovered.
    HoverChanged(Option<MemoryId>),
    /// The detail view should show this memory.
    Selected(MemoryId),
    /// The detail view was closed.
    SelectionCleared,
    /// A memory was added at this chronological index.
    MemoryAdded {
        /// ID of the new memory.
        id: MemoryId,
        /// Its index in the timeline.
        index: usize,
    },
}

impl PointerEvent {
    /// The memory this event refers to, if any.
    #[must_use]
    pub fn memory(&self) -> Option<&MemoryId> {
        match self {
            Self::Over(id) | Self::Click(id) => Some(id),
            Self::Out => None,
        }
    }
}
