// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Point types and the packed type-code encoding.
//!
//! A packed path stores one `u8` per point: the low three bits hold the
//! point type and bit 3 holds the smooth flag. Those bits stay inside this
//! module; everything else works with [`PointType`] and a `smooth` bool.

use kurbo::Point;
use serde::{Deserialize, Serialize};

const ON_CURVE: u8 = 0x00;
const OFF_CURVE_QUAD: u8 = 0x01;
const OFF_CURVE_CUBIC: u8 = 0x02;
const SMOOTH_FLAG: u8 = 0x08;
const POINT_TYPE_MASK: u8 = 0x07;

/// The role a point plays in its contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointType {
    /// A point the outline passes through
    OnCurve,
    /// A TrueType-style quadratic control point
    OffCurveQuad,
    /// A PostScript-style cubic control point
    OffCurveCubic,
}

impl PointType {
    /// Decode the type bits of a packed code
    ///
    /// Returns `None` for codes outside the three known types.
    pub fn from_code(code: u8) -> Option<Self> {
        match code & POINT_TYPE_MASK {
            ON_CURVE => Some(PointType::OnCurve),
            OFF_CURVE_QUAD => Some(PointType::OffCurveQuad),
            OFF_CURVE_CUBIC => Some(PointType::OffCurveCubic),
            _ => None,
        }
    }

    pub fn is_on_curve(self) -> bool {
        self == PointType::OnCurve
    }

    pub fn is_off_curve(self) -> bool {
        !self.is_on_curve()
    }

    fn bits(self) -> u8 {
        match self {
            PointType::OnCurve => ON_CURVE,
            PointType::OffCurveQuad => OFF_CURVE_QUAD,
            PointType::OffCurveCubic => OFF_CURVE_CUBIC,
        }
    }
}

/// Pack a point type and smooth flag into a type code
pub(crate) fn encode(typ: PointType, smooth: bool) -> u8 {
    if smooth {
        typ.bits() | SMOOTH_FLAG
    } else {
        typ.bits()
    }
}

/// The type bits of a code, smooth flag stripped
pub(crate) fn type_bits(code: u8) -> u8 {
    code & POINT_TYPE_MASK
}

pub(crate) fn is_smooth(code: u8) -> bool {
    code & SMOOTH_FLAG != 0
}

/// A point read out of a packed path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// Position in design space
    pub point: Point,
    /// On-curve or off-curve (quadratic / cubic)
    pub typ: PointType,
    /// Whether the point keeps its handles tangent-continuous
    #[serde(default)]
    pub smooth: bool,
}

impl PathPoint {
    pub fn new(point: Point, typ: PointType, smooth: bool) -> Self {
        Self { point, typ, smooth }
    }

    /// A corner on-curve point
    pub fn on_curve(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y), PointType::OnCurve, false)
    }

    pub fn is_on_curve(&self) -> bool {
        self.typ.is_on_curve()
    }

    pub fn is_off_curve(&self) -> bool {
        self.typ.is_off_curve()
    }

    /// Decode from packed storage
    ///
    /// Returns `None` when the code carries an unknown point type.
    pub(crate) fn from_packed(x: f64, y: f64, code: u8) -> Option<Self> {
        let typ = PointType::from_code(code)?;
        Some(Self::new(Point::new(x, y), typ, is_smooth(code)))
    }

    pub(crate) fn code(&self) -> u8 {
        encode(self.typ, self.smooth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smooth_flag_survives_encoding() {
        let code = encode(PointType::OnCurve, true);
        assert_eq!(PointType::from_code(code), Some(PointType::OnCurve));
        assert!(is_smooth(code));
        assert_eq!(type_bits(code), type_bits(encode(PointType::OnCurve, false)));
    }

    #[test]
    fn unknown_codes_do_not_decode() {
        assert_eq!(PointType::from_code(0x03), None);
        assert_eq!(PointType::from_code(0x0f), None);
        assert!(PathPoint::from_packed(0.0, 0.0, 0x05).is_none());
    }

    #[test]
    fn off_curve_kinds() {
        assert!(PointType::OffCurveQuad.is_off_curve());
        assert!(PointType::OffCurveCubic.is_off_curve());
        assert!(!PointType::OnCurve.is_off_curve());
    }
}
