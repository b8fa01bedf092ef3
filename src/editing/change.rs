// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Addressable outline changes.
//!
//! Every edit to a [`GlyphInstance`] is expressed as a [`ChangeSet`]: an
//! ordered list of [`Change`]s. Edit sessions apply them live, undo records
//! store them, and rollbacks are just change sets that restore earlier
//! values.
//!
//! Setters (`=xy`, point type, component offset) are idempotent for a given
//! address, so [`ChangeSet::consolidate`] keeps only the last value written
//! to each address. Structural changes shift indices and act as barriers.

use super::instance::GlyphInstance;
use crate::error::EditError;
use crate::path::{PathPoint, PointType};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single edit to a glyph instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "f", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Change {
    /// Move a point
    #[serde(rename = "=xy")]
    SetPointPosition { index: usize, point: Point },
    /// Change a point's type and smooth flag
    SetPointType {
        index: usize,
        typ: PointType,
        smooth: bool,
    },
    /// Move a component
    SetComponentOffset { index: usize, offset: Vec2 },
    /// Insert a point into a contour
    InsertPoint {
        contour: usize,
        point_index: usize,
        point: PathPoint,
    },
    /// Remove a point from a contour
    DeletePoint { contour: usize, point_index: usize },
    /// Insert a whole contour
    InsertContour {
        contour: usize,
        points: Vec<PathPoint>,
        is_closed: bool,
    },
    /// Remove a whole contour
    DeleteContour { contour: usize },
}

/// What a setter writes to; `None` for structural changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Address {
    Position(usize),
    Type(usize),
    ComponentOffset(usize),
}

impl Change {
    /// Shorthand for the most common change
    pub fn move_point(index: usize, point: Point) -> Self {
        Change::SetPointPosition { index, point }
    }

    fn address(&self) -> Option<Address> {
        match self {
            Change::SetPointPosition { index, .. } => Some(Address::Position(*index)),
            Change::SetPointType { index, .. } => Some(Address::Type(*index)),
            Change::SetComponentOffset { index, .. } => Some(Address::ComponentOffset(*index)),
            _ => None,
        }
    }

    /// Whether this change inserts or removes points or contours
    pub fn is_structural(&self) -> bool {
        self.address().is_none()
    }

    /// Apply to `instance`
    ///
    /// A change that addresses a missing point, contour or component fails
    /// without modifying the instance.
    pub fn apply(&self, instance: &mut GlyphInstance) -> Result<(), EditError> {
        let path = &mut instance.path;
        match self {
            Change::SetPointPosition { index, point } => path.set_point_position(*index, *point)?,
            Change::SetPointType { index, typ, smooth } => {
                path.set_point_type(*index, *typ, *smooth)?
            }
            Change::SetComponentOffset { index, offset } => {
                let len = instance.components.len();
                let component = instance
                    .components
                    .get_mut(*index)
                    .ok_or(EditError::ComponentOutOfRange { index: *index, len })?;
                component.offset = *offset;
            }
            Change::InsertPoint {
                contour,
                point_index,
                point,
            } => path.insert_point(*contour, *point_index, *point)?,
            Change::DeletePoint {
                contour,
                point_index,
            } => {
                path.delete_point(*contour, *point_index)?;
            }
            Change::InsertContour {
                contour,
                points,
                is_closed,
            } => path.insert_contour(*contour, points, *is_closed)?,
            Change::DeleteContour { contour } => {
                path.delete_contour(*contour)?;
            }
        }
        Ok(())
    }
}

/// An ordered group of changes, applied front to back
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Append all changes of `other`
    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    /// Collapse repeated setters on the same address to their last value
    ///
    /// A setter keeps the position of the first write to its address within
    /// each run between structural changes. Applying the result gives the
    /// same instance as applying `self`.
    pub fn consolidate(&self) -> ChangeSet {
        let mut out: Vec<Change> = Vec::with_capacity(self.changes.len());
        let mut slots: HashMap<Address, usize> = HashMap::new();
        for change in &self.changes {
            match change.address() {
                Some(address) => match slots.get(&address) {
                    Some(&slot) => out[slot] = change.clone(),
                    None => {
                        slots.insert(address, out.len());
                        out.push(change.clone());
                    }
                },
                None => {
                    slots.clear();
                    out.push(change.clone());
                }
            }
        }
        ChangeSet { changes: out }
    }

    /// Apply every change in order, stopping at the first failure
    pub fn apply(&self, instance: &mut GlyphInstance) -> Result<(), EditError> {
        for change in &self.changes {
            change.apply(instance)?;
        }
        Ok(())
    }
}

impl From<Vec<Change>> for ChangeSet {
    fn from(changes: Vec<Change>) -> Self {
        Self { changes }
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}
