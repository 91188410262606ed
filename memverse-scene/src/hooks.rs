//! Pointer hooks.
//!
//! The engine calls these from its picking callbacks. They only track
//! hover and selection; whether an ID exists is the universe's concern.

use memverse_core::types::MemoryId;
use tracing::debug;

use crate::events::{PointerEvent, SceneEvent};

/// Hover and selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interaction {
    hovered: Option<MemoryId>,
    selected: Option<MemoryId>,
}

impl Interaction {
    /// Apply a pointer event. Returns the resulting scene event, or `None`
    /// if nothing changed.
    pub fn on_pointer(&mut self, event: PointerEvent) -> Option<SceneEvent> {
        match event {
            PointerEvent::Over(id) => {
                if self.hovered.as_ref() == Some(&id) {
                    return None;
                }
                self.hovered = Some(id.clone());
                Some(SceneEvent::HoverChanged(Some(id)))
            }
            PointerEvent::Out => self
                .hovered
                .take()
                .map(|_| SceneEvent::HoverChanged(None)),
            PointerEvent::Click(id) => {
                debug!(id = %id, "Memory selected");
                self.selected = Some(id.clone());
                Some(SceneEvent::Selected(id))
            }
        }
    }

    /// Close the detail view.
    pub fn close_detail(&mut self) -> Option<SceneEvent> {
        self.selected.take().map(|_| SceneEvent::SelectionCleared)
    }

    /// Drop hover or selection pointing at a memory that no longer exists.
    pub fn forget(&mut self, id: &MemoryId) {
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
    }

    /// Currently hovered memory.
    #[must_use]
    pub fn hovered(&self) -> Option<&MemoryId> {
        self.hovered.as_ref()
    }

    /// Memory shown in the detail view.
    #[must_use]
    pub fn selected(&self) -> Option<&MemoryId> {
        self.selected.as_ref()
    }

    /// Whether `id` is hovered.
    #[must_use]
    pub fn is_hovered(&self, id: &MemoryId) -> bool {
        self.hovered.as_ref() == Some(id)
    }
}
