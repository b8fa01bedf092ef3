// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Itemwise arithmetic over structurally compatible packed paths.
//!
//! A variation model blends masters by adding, subtracting and scaling
//! their outlines coordinate by coordinate. That only makes sense when the
//! masters share topology, so every path operand is checked first: same
//! contour endpoints and closedness, same point types (the smooth flag may
//! differ). Results share the point-type and contour buffers of `self`.

use super::packed::PackedPath;
use super::point;
use crate::error::VariationError;
use std::sync::Arc;

/// The right-hand side of an itemwise operation
#[derive(Debug, Clone, Copy)]
pub enum VariationOperand<'a> {
    /// Another path, checked for compatibility
    Path(&'a PackedPath),
    /// A bare coordinate buffer, only checked for length
    Raw(&'a [f64]),
}

impl<'a> From<&'a PackedPath> for VariationOperand<'a> {
    fn from(path: &'a PackedPath) -> Self {
        VariationOperand::Path(path)
    }
}

impl<'a> From<&'a [f64]> for VariationOperand<'a> {
    fn from(coords: &'a [f64]) -> Self {
        VariationOperand::Raw(coords)
    }
}

impl<'a> From<&'a Vec<f64>> for VariationOperand<'a> {
    fn from(coords: &'a Vec<f64>) -> Self {
        VariationOperand::Raw(coords.as_slice())
    }
}

impl PackedPath {
    /// Whether `self` and `other` can take part in itemwise arithmetic
    pub fn is_compatible(&self, other: &PackedPath) -> bool {
        self.ensure_compatible(other).is_ok()
    }

    /// Like [`is_compatible`](Self::is_compatible), reporting what differs
    pub fn ensure_compatible(&self, other: &PackedPath) -> Result<(), VariationError> {
        if self.contours() != other.contours() {
            return Err(VariationError::IncompatibleContours);
        }
        let (a, b) = (self.point_type_codes(), other.point_type_codes());
        if a.len() != b.len()
            || a.iter()
                .zip(b)
                .any(|(&x, &y)| point::type_bits(x) != point::type_bits(y))
        {
            return Err(VariationError::IncompatiblePointTypes);
        }
        Ok(())
    }

    fn operand_coordinates<'a>(
        &self,
        other: VariationOperand<'a>,
    ) -> Result<&'a [f64], VariationError> {
        let coords = match other {
            VariationOperand::Path(path) => {
                self.ensure_compatible(path)?;
                path.coordinates()
            }
            VariationOperand::Raw(coords) => coords,
        };
        if coords.len() != self.coordinates().len() {
            return Err(VariationError::CoordinateCount {
                expected: self.coordinates().len(),
                found: coords.len(),
            });
        }
        Ok(coords)
    }

    fn with_coordinates(&self, coordinates: Vec<f64>) -> PackedPath {
        PackedPath::from_parts(
            coordinates,
            Arc::clone(self.shared_point_types()),
            Arc::clone(self.shared_contours()),
        )
    }

    /// Coordinate-wise sum
    pub fn add_itemwise<'a>(
        &self,
        other: impl Into<VariationOperand<'a>>,
    ) -> Result<PackedPath, VariationError> {
        let rhs = self.operand_coordinates(other.into())?;
        let coords = self.coordinates().iter().zip(rhs).map(|(a, b)| a + b).collect();
        Ok(self.with_coordinates(coords))
    }

    /// Coordinate-wise difference
    pub fn sub_itemwise<'a>(
        &self,
        other: impl Into<VariationOperand<'a>>,
    ) -> Result<PackedPath, VariationError> {
        let rhs = self.operand_coordinates(other.into())?;
        let coords = self.coordinates().iter().zip(rhs).map(|(a, b)| a - b).collect();
        Ok(self.with_coordinates(coords))
    }

    /// Scale every coordinate
    pub fn mul_scalar(&self, scalar: f64) -> PackedPath {
        self.with_coordinates(self.coordinates().iter().map(|c| c * scalar).collect())
    }

    /// Linear interpolation toward `other`: `self + (other - self) * t`
    pub fn interpolate(&self, other: &PackedPath, t: f64) -> Result<PackedPath, VariationError> {
        let scaled = other.sub_itemwise(self)?.mul_scalar(t);
        self.add_itemwise(scaled.coordinates())
    }
}
