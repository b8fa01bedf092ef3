// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! The editable glyph outline: a packed path plus component references

use crate::path::PackedPath;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// A reference to another glyph, placed at an offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub offset: Vec2,
}

impl Component {
    pub fn new(name: impl Into<String>, offset: Vec2) -> Self {
        Self {
            name: name.into(),
            offset,
        }
    }
}

/// One glyph layer at one location, as edited by a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlyphInstance {
    pub path: PackedPath,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl GlyphInstance {
    pub fn new(path: PackedPath) -> Self {
        Self {
            path,
            components: Vec::new(),
        }
    }

    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components;
        self
    }
}
