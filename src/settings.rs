// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Editor settings and configuration constants.
//!
//! The constants below are the defaults. Tools take an [`EditorSettings`]
//! at construction, which starts from these values and can be overridden
//! from a TOML file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// POINTER SETTINGS
// ============================================================================
/// Hit-test radius around the pointer (design units)
const MOUSE_CLICK_MARGIN: f64 = 12.0;

/// Distance the pointer must travel before a press turns into a drag
const DRAG_THRESHOLD: f64 = 3.0;

// ============================================================================
// EDIT SETTINGS
// ============================================================================
/// Round dragged and realigned coordinates to whole units
const ROUND_COORDINATES: bool = true;

/// Number of committed edits kept for undo
const UNDO_DEPTH: usize = 128;

// ============================================================================
// SHAPE SETTINGS
// ============================================================================
/// Handle length of a quarter-ellipse arc, relative to its radius
const ELLIPSE_TENSION: f64 = crate::path::shapes::BEZIER_ARC_MAGIC;

// ============================================================================
// PUBLIC API - Don't edit below this line unless you know what you're doing
// ============================================================================

/// Pointer interaction settings
pub mod pointer {
    /// Hit-test radius around the pointer
    pub const CLICK_MARGIN: f64 = super::MOUSE_CLICK_MARGIN;

    /// Minimum travel before a press becomes a drag
    pub const DRAG_THRESHOLD: f64 = super::DRAG_THRESHOLD;
}

/// Edit session settings
pub mod edit {
    pub const ROUND_COORDINATES: bool = super::ROUND_COORDINATES;
    pub const UNDO_DEPTH: usize = super::UNDO_DEPTH;
}

/// Shape drawing settings
pub mod shapes {
    pub const ELLIPSE_TENSION: f64 = super::ELLIPSE_TENSION;
}

/// Runtime editor settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorSettings {
    pub click_margin: f64,
    pub drag_threshold: f64,
    pub round_coordinates: bool,
    pub undo_depth: usize,
    pub ellipse_tension: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            click_margin: pointer::CLICK_MARGIN,
            drag_threshold: pointer::DRAG_THRESHOLD,
            round_coordinates: edit::ROUND_COORDINATES,
            undo_depth: edit::UNDO_DEPTH,
            ellipse_tension: shapes::ELLIPSE_TENSION,
        }
    }
}

impl EditorSettings {
    /// Parse settings from TOML; missing keys keep their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read settings from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        tracing::debug!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_constants() {
        let settings = EditorSettings::default();
        assert_eq!(settings.click_margin, pointer::CLICK_MARGIN);
        assert_eq!(settings.drag_threshold, pointer::DRAG_THRESHOLD);
        assert!(settings.round_coordinates);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let settings = EditorSettings::from_toml_str(
            "click-margin = 6.0\nround-coordinates = false\n",
        )
        .unwrap();
        assert_eq!(settings.click_margin, 6.0);
        assert!(!settings.round_coordinates);
        assert_eq!(settings.undo_depth, edit::UNDO_DEPTH);
    }

    #[test]
    fn unknown_value_type_is_rejected() {
        assert!(EditorSettings::from_toml_str("drag-threshold = \"far\"").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EditorSettings::load(Path::new("/nonexistent/varpath.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/varpath.toml"));
    }
}
