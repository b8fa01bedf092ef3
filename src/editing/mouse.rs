// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer events as seen by the editing tools.
//!
//! Positions are in design space; converting from screen coordinates is
//! the embedding application's job.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Keyboard modifiers held during a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A pointer position with its button and modifier state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    /// Position in design space
    pub pos: Point,
    pub button: Option<MouseButton>,
    pub mods: Modifiers,
    /// Click count of the press this event belongs to (2 for a double
    /// click)
    pub count: u8,
}

impl MouseEvent {
    pub fn new(pos: Point, button: Option<MouseButton>) -> Self {
        Self::with_modifiers(pos, button, Modifiers::NONE)
    }

    pub fn with_modifiers(pos: Point, button: Option<MouseButton>, mods: Modifiers) -> Self {
        Self {
            pos,
            button,
            mods,
            count: 1,
        }
    }

    pub fn with_count(mut self, count: u8) -> Self {
        self.count = count;
        self
    }

    pub fn is_double_click(&self) -> bool {
        self.count >= 2
    }
}

/// One item of a gesture's event stream, after the initial press
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// The pointer moved (or modifiers changed) with the button held
    Move(MouseEvent),
    /// The button was released
    Up(MouseEvent),
    /// The gesture was interrupted; any preview must be discarded
    Cancel,
}
