// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod behavior;
pub mod change;
pub mod instance;
pub mod mouse;
pub mod selection;
pub mod session;
pub mod smooth;
pub mod undo;

pub use behavior::{BehaviorName, EditBehavior, EditBehaviorFactory};
pub use change::{Change, ChangeSet};
pub use instance::{Component, GlyphInstance};
pub use mouse::{Modifiers, MouseButton, MouseEvent, PointerEvent};
pub use selection::{Selection, SelectionItem};
pub use session::{EditContext, EditSession};
pub use undo::{UndoHistory, UndoInfo, UndoRecord};
