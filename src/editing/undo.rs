// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Undo history of committed edits.
//!
//! Every finished edit session leaves one [`UndoRecord`]: the consolidated
//! change, the consolidated rollback, and the metadata needed to restore
//! selection and location. Undo applies the rollback, redo applies the
//! change.

use super::change::ChangeSet;
use super::instance::GlyphInstance;
use super::selection::Selection;
use crate::error::EditError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Metadata handed over when an edit is committed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoInfo {
    /// Menu label, e.g. "drag selection"
    pub label: String,
    /// Selection to restore on undo
    pub undo_selection: Selection,
    /// Selection to restore on redo
    pub redo_selection: Selection,
    /// Designspace location the edit was made at
    #[serde(default)]
    pub location: BTreeMap<String, f64>,
}

impl UndoInfo {
    pub fn new(label: impl Into<String>, selection: &Selection) -> Self {
        Self {
            label: label.into(),
            undo_selection: selection.clone(),
            redo_selection: selection.clone(),
            location: BTreeMap::new(),
        }
    }
}

/// One committed edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub change: ChangeSet,
    pub rollback: ChangeSet,
    pub info: UndoInfo,
}

/// Undo and redo stacks of committed edits
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo_stack: VecDeque<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
    max_depth: usize,
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    /// Record a committed edit; clears the redo stack
    pub fn push(&mut self, record: UndoRecord) {
        self.redo_stack.clear();
        self.undo_stack.push_back(record);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Label of the edit `undo` would revert
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|r| r.info.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|r| r.info.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    /// Revert the latest edit, returning the selection to restore
    ///
    /// On failure the record stays on the undo stack.
    pub fn undo(&mut self, instance: &mut GlyphInstance) -> Result<Option<Selection>, EditError> {
        let Some(record) = self.undo_stack.pop_back() else {
            return Ok(None);
        };
        if let Err(e) = record.rollback.apply(instance) {
            self.undo_stack.push_back(record);
            return Err(e);
        }
        tracing::debug!("Undo: {}", record.info.label);
        let selection = record.info.undo_selection.clone();
        self.redo_stack.push(record);
        Ok(Some(selection))
    }

    /// Re-apply the latest undone edit, returning the selection to restore
    pub fn redo(&mut self, instance: &mut GlyphInstance) -> Result<Option<Selection>, EditError> {
        let Some(record) = self.redo_stack.pop() else {
            return Ok(None);
        };
        if let Err(e) = record.change.apply(instance) {
            self.redo_stack.push(record);
            return Err(e);
        }
        tracing::debug!("Redo: {}", record.info.label);
        let selection = record.info.redo_selection.clone();
        self.undo_stack.push_back(record);
        Ok(Some(selection))
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(crate::settings::edit::UNDO_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::change::Change;
    use crate::path::PackedPath;
    use kurbo::Point;

    fn dot() -> GlyphInstance {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        GlyphInstance::new(path)
    }

    fn record(label: &str, from: Point, to: Point) -> UndoRecord {
        UndoRecord {
            change: ChangeSet::from(vec![Change::move_point(0, to)]),
            rollback: ChangeSet::from(vec![Change::move_point(0, from)]),
            info: UndoInfo::new(label, &Selection::new()),
        }
    }

    #[test]
    fn undo_then_redo() {
        let mut glyph = dot();
        let mut history = UndoHistory::default();
        let target = Point::new(5.0, 5.0);

        record("move", Point::ZERO, target).change.apply(&mut glyph).unwrap();
        history.push(record("move", Point::ZERO, target));
        assert_eq!(history.undo_label(), Some("move"));

        assert!(history.undo(&mut glyph).unwrap().is_some());
        assert_eq!(glyph.path.position(0), Some(Point::ZERO));
        assert!(history.can_redo());

        history.redo(&mut glyph).unwrap();
        assert_eq!(glyph.path.position(0), Some(target));
        assert!(!history.can_redo());
    }

    #[test]
    fn empty_history_is_a_noop() {
        let mut glyph = dot();
        let mut history = UndoHistory::default();
        assert_eq!(history.undo(&mut glyph), Ok(None));
        assert_eq!(history.redo(&mut glyph), Ok(None));
    }

    #[test]
    fn push_clears_redo_and_respects_depth() {
        let mut glyph = dot();
        let mut history = UndoHistory::new(2);
        for i in 0..3 {
            history.push(record(&i.to_string(), Point::ZERO, Point::new(i as f64, 0.0)));
        }
        assert_eq!(history.len(), 2);
        history.undo(&mut glyph).unwrap();
        assert!(history.can_redo());
        history.push(record("new", Point::ZERO, Point::ZERO));
        assert!(!history.can_redo());
        assert_eq!(history.undo_label(), Some("new"));
    }

    #[test]
    fn failed_undo_keeps_record() {
        let mut glyph = GlyphInstance::default();
        let mut history = UndoHistory::default();
        history.push(record("move", Point::ZERO, Point::ZERO));
        assert!(history.undo(&mut glyph).is_err());
        assert!(history.can_undo());
    }
}
