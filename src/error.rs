// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for path construction, variation arithmetic and editing.
//!
//! Construction and arithmetic errors are raised before any buffer is
//! touched, so a caller never has partially-applied state to undo.

use thiserror::Error;

/// Errors raised while building, validating or replaying a packed path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A point was added while no contour was open
    #[error("no open contour: call move_to before adding points")]
    NoOpenContour,

    /// `q_curve_to` got an odd (or too small) number of coordinates
    #[error("number of arguments to qCurveTo must be even and non-zero, got {count}")]
    Arity { count: usize },

    /// A type code outside the three known point types
    #[error("illegal point type code {code:#04x} at point {index}")]
    InvalidPointType { index: usize, code: u8 },

    /// A point or contour index past the end of the path
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Buffers or contour endpoints that violate the packed layout
    #[error("malformed path data: {0}")]
    Malformed(String),
}

/// Errors raised by itemwise arithmetic on incompatible operands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VariationError {
    #[error("paths are not compatible: contour structure differs")]
    IncompatibleContours,

    #[error("paths are not compatible: point types differ")]
    IncompatiblePointTypes,

    #[error("coordinate count mismatch: expected {expected}, got {found}")]
    CoordinateCount { expected: usize, found: usize },
}

/// Errors raised by the edit session layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// A drag was started with nothing selected to move
    #[error("nothing selected to edit")]
    NoEditTarget,

    /// A change addressed a component that does not exist
    #[error("component index {index} out of range (len {len})")]
    ComponentOutOfRange { index: usize, len: usize },

    /// A selection token did not parse as `point/<n>` or `component/<n>`
    #[error("invalid selection token {0:?}")]
    InvalidSelectionToken(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Variation(#[from] VariationError),
}
