// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Replaying packed contours as line, quadratic and cubic segments.
//!
//! Every contour is walked from its first on-curve point. Off-curve points
//! collect in a segment buffer until the next on-curve point, which flushes
//! the buffer through the renderer picked by the off-curve run:
//!
//! - no off-curve points: a line
//! - quadratic off-curve points: a chain of quadratic segments joined at
//!   implied on-curve midpoints
//! - exactly two cubic off-curve points: a cubic segment
//!
//! A contour without any on-curve point is a TrueType "blob"; an on-curve
//! point is implied halfway between its last and first points. On closed
//! contours the final straight line back to the start is left to
//! `close_path`.

use super::packed::{self, Contour, PackedPath};
use super::point::PointType;
use crate::error::PathError;
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};

/// Something that can be driven with path drawing commands
///
/// Renderers, exporters and path builders all implement this and get
/// driven identically by [`PackedPath::draw_to_path`].
pub trait PathConsumer {
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    fn quad_to(&mut self, p1: Point, p2: Point);
    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point);
    fn close_path(&mut self);
}

impl PathConsumer for BezPath {
    fn move_to(&mut self, p: Point) {
        BezPath::move_to(self, p);
    }

    fn line_to(&mut self, p: Point) {
        BezPath::line_to(self, p);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        BezPath::quad_to(self, p1, p2);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        BezPath::curve_to(self, p1, p2, p3);
    }

    fn close_path(&mut self) {
        BezPath::close_path(self);
    }
}

/// A single recorded drawing call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CurveTo(Point, Point, Point),
    ClosePath,
}

/// A consumer that keeps every call, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingPen {
    pub commands: Vec<DrawCommand>,
}

impl RecordingPen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PathConsumer for RecordingPen {
    fn move_to(&mut self, p: Point) {
        self.commands.push(DrawCommand::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.commands.push(DrawCommand::LineTo(p));
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        self.commands.push(DrawCommand::QuadTo(p1, p2));
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        self.commands.push(DrawCommand::CurveTo(p1, p2, p3));
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }
}

/// Builds a new [`PackedPath`] from drawing calls
///
/// Drawing calls cannot fail, so the first construction error is kept and
/// reported by [`finish`](Self::finish).
#[derive(Debug, Clone, Default)]
pub struct PackedPathPen {
    path: PackedPath,
    error: Option<PathError>,
}

impl PackedPathPen {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, result: Result<(), PathError>) {
        if let Err(e) = result
            && self.error.is_none()
        {
            self.error = Some(e);
        }
    }

    pub fn finish(self) -> Result<PackedPath, PathError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.path),
        }
    }
}

impl PathConsumer for PackedPathPen {
    fn move_to(&mut self, p: Point) {
        self.path.move_to(p.x, p.y);
    }

    fn line_to(&mut self, p: Point) {
        let result = self.path.line_to(p.x, p.y);
        self.record(result);
    }

    fn quad_to(&mut self, p1: Point, p2: Point) {
        let result = self.path.q_curve_to(&[p1.x, p1.y, p2.x, p2.y]);
        self.record(result);
    }

    fn curve_to(&mut self, p1: Point, p2: Point, p3: Point) {
        let result = self.path.curve_to(p1.x, p1.y, p2.x, p2.y, p3.x, p3.y);
        self.record(result);
    }

    /// Closes the open contour, folding a final on-curve point that repeats
    /// the contour start
    fn close_path(&mut self) {
        let result = self.fold_closing_point().and_then(|()| self.path.close_path());
        self.record(result);
    }
}

impl PackedPathPen {
    fn fold_closing_point(&mut self) -> Result<(), PathError> {
        let Some(contour_index) = self.path.num_contours().checked_sub(1) else {
            return Ok(());
        };
        if self.path.contours()[contour_index].is_closed {
            return Ok(());
        }
        let Some(range) = self.path.contour_range(contour_index) else {
            return Ok(());
        };
        if range.len() < 2 {
            return Ok(());
        }
        let (first, last) = (self.path.point(range.start), self.path.point(range.end - 1));
        if let (Some(first), Some(last)) = (first, last)
            && last.is_on_curve()
            && last.point == first.point
        {
            self.path.delete_point(contour_index, range.len() - 1)?;
        }
        Ok(())
    }
}

impl PackedPath {
    /// Replay every contour into `pen`
    pub fn draw_to_path<P: PathConsumer + ?Sized>(&self, pen: &mut P) -> Result<(), PathError> {
        draw_raw(pen, self.coordinates(), self.point_type_codes(), self.contours())
    }

    /// Convert to a kurbo `BezPath` for rendering
    pub fn to_bezpath(&self) -> Result<BezPath, PathError> {
        let mut bez = BezPath::new();
        self.draw_to_path(&mut bez)?;
        Ok(bez)
    }
}

/// Replay raw packed buffers into `pen`
///
/// Unlike [`PackedPath::from_raw`] this does not pre-validate type codes;
/// an unknown code is reported when the walk reaches it.
pub fn draw_raw<P: PathConsumer + ?Sized>(
    pen: &mut P,
    coordinates: &[f64],
    point_types: &[u8],
    contours: &[Contour],
) -> Result<(), PathError> {
    packed::validate_layout(coordinates, point_types.len(), contours)?;

    let mut start = 0;
    for contour in contours {
        let end = contour.end_point;
        let num_points = end + 1 - start;

        let first_on_curve = (start..=end)
            .position(|i| PointType::from_code(point_types[i]) == Some(PointType::OnCurve));

        match first_on_curve {
            Some(first) => draw_contour(
                pen,
                coordinates,
                point_types,
                start,
                num_points,
                first,
                contour.is_closed,
            )?,
            None => {
                // Quad blob: imply an on-curve point between last and first
                let mut blob_coords = Vec::with_capacity((num_points + 1) * 2);
                let mid_x = (coordinates[start * 2] + coordinates[end * 2]) / 2.0;
                let mid_y = (coordinates[start * 2 + 1] + coordinates[end * 2 + 1]) / 2.0;
                blob_coords.extend_from_slice(&[mid_x, mid_y]);
                blob_coords.extend_from_slice(&coordinates[start * 2..(end + 1) * 2]);

                let mut blob_types = Vec::with_capacity(num_points + 1);
                blob_types.push(0);
                blob_types.extend_from_slice(&point_types[start..=end]);

                draw_contour(pen, &blob_coords, &blob_types, 0, num_points + 1, 0, true)?;
            }
        }

        start = end + 1;
    }
    Ok(())
}

/// Which renderer the current off-curve run selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Line,
    Quad,
    Cubic,
}

fn draw_contour<P: PathConsumer + ?Sized>(
    pen: &mut P,
    coordinates: &[f64],
    point_types: &[u8],
    start: usize,
    num_points: usize,
    first_on_curve: usize,
    is_closed: bool,
) -> Result<(), PathError> {
    let last = if is_closed {
        num_points
    } else {
        num_points - 1 - first_on_curve
    };

    let mut segment: Vec<Point> = Vec::new();
    let mut kind = SegmentKind::Line;

    for i in 0..=last {
        let index = if is_closed {
            start + (first_on_curve + i) % num_points
        } else {
            start + first_on_curve + i
        };
        let code = point_types[index];
        let p = Point::new(coordinates[index * 2], coordinates[index * 2 + 1]);

        if i == 0 {
            pen.move_to(p);
            continue;
        }

        segment.push(p);
        match PointType::from_code(code) {
            Some(PointType::OnCurve) => {
                let closing_line = is_closed && i == last && kind == SegmentKind::Line;
                if !closing_line {
                    flush_segment(pen, kind, &segment);
                }
                segment.clear();
                kind = SegmentKind::Line;
            }
            Some(PointType::OffCurveQuad) => kind = SegmentKind::Quad,
            Some(PointType::OffCurveCubic) => kind = SegmentKind::Cubic,
            None => return Err(PathError::InvalidPointType { index, code }),
        }
    }

    if is_closed {
        pen.close_path();
    }
    Ok(())
}

fn flush_segment<P: PathConsumer + ?Sized>(pen: &mut P, kind: SegmentKind, segment: &[Point]) {
    let Some(&end) = segment.last() else {
        return;
    };
    match kind {
        SegmentKind::Line => pen.line_to(end),
        SegmentKind::Quad => draw_quad_segment(pen, segment),
        SegmentKind::Cubic => {
            if let [c1, c2, p] = segment {
                pen.curve_to(*c1, *c2, *p);
            } else {
                tracing::warn!(
                    "cubic run with {} off-curve points, drawing a line instead",
                    segment.len() - 1
                );
                pen.line_to(end);
            }
        }
    }
}

/// Quadratic chain: implied on-curve points between consecutive controls
fn draw_quad_segment<P: PathConsumer + ?Sized>(pen: &mut P, segment: &[Point]) {
    let (&end, controls) = match segment.split_last() {
        Some(split) => split,
        None => return,
    };
    let Some((&first, rest)) = controls.split_first() else {
        pen.line_to(end);
        return;
    };
    let mut control = first;
    for &next in rest {
        pen.quad_to(control, control.midpoint(next));
        control = next;
    }
    pen.quad_to(control, end);
}
