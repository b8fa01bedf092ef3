// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Tool system for glyph editing.
//!
//! A gesture starts with a press ([`MouseEvent`]) and continues with a
//! stream of [`PointerEvent`]s on a tokio channel. Tools await the stream
//! only between events; all change computation happens synchronously in
//! between. The stream ending before the release, or a `Cancel` event,
//! aborts the gesture.

pub mod pointer;
pub mod shapes;

use crate::editing::{EditContext, MouseEvent, PointerEvent, Selection};
use crate::error::EditError;
use crate::settings::EditorSettings;
use kurbo::Point;
use tokio::sync::mpsc::Receiver;

// ===== Tool Identifier =====

/// Tool identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    /// Select and move points and components
    Pointer,
    /// Draw rectangles and ellipses
    Shapes,
}

// ===== Gesture State =====

/// Where a tool is in its current gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No button held
    #[default]
    Idle,
    /// Pressed, waiting to see whether this becomes a drag
    AwaitingDragThreshold,
    /// Rubber-band selection in progress
    RectSelecting,
    /// Moving the selection, or drawing a shape
    Dragging,
}

/// How a press resolved once the pointer moved or was released
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PressOutcome {
    /// The pointer travelled past the drag threshold; carries that event
    Drag(MouseEvent),
    /// Released without travelling far enough
    Click(MouseEvent),
    /// The stream ended or was cancelled
    Cancelled,
}

/// Wait until the pointer leaves the threshold circle around `start`
pub(crate) async fn await_drag_threshold(
    events: &mut Receiver<PointerEvent>,
    start: Point,
    threshold: f64,
) -> PressOutcome {
    while let Some(event) = events.recv().await {
        match event {
            PointerEvent::Move(ev) if (ev.pos - start).hypot() >= threshold => {
                return PressOutcome::Drag(ev);
            }
            PointerEvent::Move(_) => {}
            PointerEvent::Up(ev) => return PressOutcome::Click(ev),
            PointerEvent::Cancel => return PressOutcome::Cancelled,
        }
    }
    PressOutcome::Cancelled
}

// ===== ToolBox Enum =====

/// Enum wrapping all tool types
#[derive(Debug, Clone)]
pub enum ToolBox {
    Pointer(pointer::PointerTool),
    Shapes(shapes::ShapesTool),
}

impl ToolBox {
    /// Create a tool by ID
    pub fn for_id(id: ToolId, settings: EditorSettings) -> Self {
        match id {
            ToolId::Pointer => ToolBox::Pointer(pointer::PointerTool::new(settings)),
            ToolId::Shapes => ToolBox::Shapes(shapes::ShapesTool::new(settings)),
        }
    }

    pub fn id(&self) -> ToolId {
        match self {
            ToolBox::Pointer(_) => ToolId::Pointer,
            ToolBox::Shapes(_) => ToolId::Shapes,
        }
    }

    pub fn gesture_state(&self) -> GestureState {
        match self {
            ToolBox::Pointer(tool) => tool.gesture_state(),
            ToolBox::Shapes(tool) => tool.gesture_state(),
        }
    }

    /// Run one gesture to completion
    pub async fn handle_drag(
        &mut self,
        ctx: &mut EditContext,
        selection: &mut Selection,
        initial: MouseEvent,
        events: &mut Receiver<PointerEvent>,
    ) -> Result<(), EditError> {
        match self {
            ToolBox::Pointer(tool) => tool.handle_drag(ctx, selection, initial, events).await,
            ToolBox::Shapes(tool) => tool.handle_drag(ctx, selection, initial, events).await,
        }
    }
}
