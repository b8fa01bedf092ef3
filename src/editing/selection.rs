// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Immutable selection set for tracking which points and components are
//! selected.
//!
//! `Selection` wraps an `Arc<BTreeSet<SelectionItem>>` so it can be cheaply
//! cloned into undo records. Mutations produce a new set (copy-on-write via
//! `Arc::make_mut`). The `BTreeSet` gives deterministic iteration order:
//! points first, by index, then components.
//!
//! On the wire a selection is a list of `"point/<n>"` and
//! `"component/<n>"` tokens.

use crate::error::EditError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// One selectable entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SelectionItem {
    /// A point, by absolute index
    Point(usize),
    /// A component, by index
    Component(usize),
}

impl fmt::Display for SelectionItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionItem::Point(i) => write!(f, "point/{i}"),
            SelectionItem::Component(i) => write!(f, "component/{i}"),
        }
    }
}

impl FromStr for SelectionItem {
    type Err = EditError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || EditError::InvalidSelectionToken(token.to_string());
        let (kind, index) = token.split_once('/').ok_or_else(invalid)?;
        let index: usize = index.parse().map_err(|_| invalid())?;
        match kind {
            "point" => Ok(SelectionItem::Point(index)),
            "component" => Ok(SelectionItem::Component(index)),
            _ => Err(invalid()),
        }
    }
}

/// A set of selected points and components
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Selection {
    inner: Arc<BTreeSet<SelectionItem>>,
}

impl Selection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BTreeSet::new()),
        }
    }

    /// Parse a selection from tokens such as `"point/3"`
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, EditError> {
        tokens
            .iter()
            .map(|t| t.as_ref().parse::<SelectionItem>())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn contains(&self, item: &SelectionItem) -> bool {
        self.inner.contains(item)
    }

    pub fn contains_point(&self, index: usize) -> bool {
        self.contains(&SelectionItem::Point(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionItem> {
        self.inner.iter()
    }

    /// Indices of the selected points, ascending
    pub fn point_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.inner.iter().filter_map(|item| match item {
            SelectionItem::Point(i) => Some(*i),
            SelectionItem::Component(_) => None,
        })
    }

    /// Indices of the selected components, ascending
    pub fn component_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.inner.iter().filter_map(|item| match item {
            SelectionItem::Component(i) => Some(*i),
            SelectionItem::Point(_) => None,
        })
    }

    pub fn insert(&mut self, item: SelectionItem) {
        Arc::make_mut(&mut self.inner).insert(item);
    }

    pub fn remove(&mut self, item: &SelectionItem) {
        Arc::make_mut(&mut self.inner).remove(item);
    }

    /// Items in either set
    pub fn union(&self, other: &Selection) -> Selection {
        self.inner.union(&other.inner).copied().collect()
    }

    /// Items in exactly one of the two sets
    pub fn symmetric_difference(&self, other: &Selection) -> Selection {
        self.inner
            .symmetric_difference(&other.inner)
            .copied()
            .collect()
    }

    /// Whether every item of `other` is also in `self`
    pub fn is_superset(&self, other: &Selection) -> bool {
        self.inner.is_superset(&other.inner)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<SelectionItem> for Selection {
    fn from_iter<I: IntoIterator<Item = SelectionItem>>(iter: I) -> Self {
        Self {
            inner: Arc::new(iter.into_iter().collect()),
        }
    }
}

impl TryFrom<Vec<String>> for Selection {
    type Error = EditError;

    fn try_from(tokens: Vec<String>) -> Result<Self, Self::Error> {
        Selection::from_tokens(&tokens)
    }
}

impl From<Selection> for Vec<String> {
    fn from(selection: Selection) -> Self {
        selection.iter().map(ToString::to_string).collect()
    }
}
