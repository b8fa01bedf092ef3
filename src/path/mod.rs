// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Packed outlines: storage, curve reconstruction and variation arithmetic.
//!
//! `PackedPath` is the one representation of a glyph layer. Rendering
//! replays it through a [`PathConsumer`] (a `kurbo::BezPath`, a recorder or
//! another packed path); interpolation treats its coordinate buffer as a
//! vector and adds, subtracts and scales it against compatible masters.

pub mod draw;
pub mod packed;
pub mod point;
pub mod shapes;
pub mod variation;

pub use draw::{DrawCommand, PackedPathPen, PathConsumer, RecordingPen, draw_raw};
pub use packed::{Contour, Neighbors, PackedPath};
pub use point::{PathPoint, PointType};
pub use variation::VariationOperand;
