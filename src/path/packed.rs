// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Packed path storage: the representation shared by rendering and
//! variation math.
//!
//! A `PackedPath` keeps all points of a glyph layer in three flat buffers:
//! interleaved `x, y` coordinates, one type code per point, and a list of
//! contours that each record the index of their last point. Point types and
//! contours sit behind an `Arc` so that itemwise arithmetic can hand out new
//! paths that share topology with their source; every mutator goes through
//! `Arc::make_mut` and therefore never disturbs a sharing sibling.

use super::point::{self, PathPoint, PointType};
use crate::error::PathError;
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

/// One sub-path, addressed by the index of its last point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contour {
    /// Absolute index of the last point of this contour
    pub end_point: usize,
    /// Whether the contour wraps from its last point to its first
    pub is_closed: bool,
}

/// The previous and next point around a point, within its contour
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Neighbors {
    pub prev: Option<(usize, PathPoint)>,
    pub next: Option<(usize, PathPoint)>,
}

/// A glyph outline in packed form
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawPackedPath", into = "RawPackedPath")]
pub struct PackedPath {
    coordinates: Vec<f64>,
    point_types: Arc<Vec<u8>>,
    contours: Arc<Vec<Contour>>,
}

/// Wire layout: `{coordinates, pointTypes, contours}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackedPath {
    coordinates: Vec<f64>,
    point_types: Vec<u8>,
    contours: Vec<Contour>,
}

impl TryFrom<RawPackedPath> for PackedPath {
    type Error = PathError;

    fn try_from(raw: RawPackedPath) -> Result<Self, Self::Error> {
        PackedPath::from_raw(raw.coordinates, raw.point_types, raw.contours)
    }
}

impl From<PackedPath> for RawPackedPath {
    fn from(path: PackedPath) -> Self {
        RawPackedPath {
            coordinates: path.coordinates,
            point_types: Arc::unwrap_or_clone(path.point_types),
            contours: Arc::unwrap_or_clone(path.contours),
        }
    }
}

impl PackedPath {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from external buffers, validating the packed layout
    ///
    /// Checks that there are two coordinates per type code, that every type
    /// code is known, and that contour endpoints strictly increase and end
    /// on the last point.
    pub fn from_raw(
        coordinates: Vec<f64>,
        point_types: Vec<u8>,
        contours: Vec<Contour>,
    ) -> Result<Self, PathError> {
        validate_buffers(&coordinates, &point_types, &contours)?;
        Ok(Self {
            coordinates,
            point_types: Arc::new(point_types),
            contours: Arc::new(contours),
        })
    }

    /// Assemble a path from parts whose layout is already known to hold
    pub(crate) fn from_parts(
        coordinates: Vec<f64>,
        point_types: Arc<Vec<u8>>,
        contours: Arc<Vec<Contour>>,
    ) -> Self {
        debug_assert_eq!(coordinates.len(), point_types.len() * 2);
        Self {
            coordinates,
            point_types,
            contours,
        }
    }

    pub fn num_points(&self) -> usize {
        self.point_types.len()
    }

    pub fn num_contours(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_types.is_empty()
    }

    /// Interleaved `x, y` coordinates
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub(crate) fn point_type_codes(&self) -> &[u8] {
        &self.point_types
    }

    pub(crate) fn shared_point_types(&self) -> &Arc<Vec<u8>> {
        &self.point_types
    }

    pub(crate) fn shared_contours(&self) -> &Arc<Vec<Contour>> {
        &self.contours
    }

    /// Get the point at an absolute index
    pub fn point(&self, index: usize) -> Option<PathPoint> {
        let code = *self.point_types.get(index)?;
        PathPoint::from_packed(
            self.coordinates[index * 2],
            self.coordinates[index * 2 + 1],
            code,
        )
    }

    /// Position of the point at an absolute index
    pub fn position(&self, index: usize) -> Option<Point> {
        if index >= self.num_points() {
            return None;
        }
        Some(Point::new(
            self.coordinates[index * 2],
            self.coordinates[index * 2 + 1],
        ))
    }

    /// Iterate over all points
    ///
    /// The iterator reads the packed buffers on demand; call again to
    /// restart.
    pub fn points(&self) -> impl Iterator<Item = PathPoint> + '_ {
        (0..self.num_points()).filter_map(move |i| self.point(i))
    }

    /// Iterate over the points of one contour
    pub fn contour_points(&self, contour_index: usize) -> impl Iterator<Item = PathPoint> + '_ {
        self.contour_range(contour_index)
            .unwrap_or(0..0)
            .filter_map(move |i| self.point(i))
    }

    /// Iterate over handle lines: adjacent point pairs whose types differ
    ///
    /// Closed contours also yield the pair formed by their last and first
    /// points.
    pub fn iter_handles(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let codes = &self.point_types;
        self.contour_ranges().flat_map(move |(range, is_closed)| {
            let start = range.start;
            let end = range.end - 1;
            let first = if is_closed { start } else { start + 1 };
            (first..=end).filter_map(move |next| {
                let prev = if next == start { end } else { next - 1 };
                if point::type_bits(codes[prev]) == point::type_bits(codes[next]) {
                    return None;
                }
                Some((self.position(prev)?, self.position(next)?))
            })
        })
    }

    /// Point-index ranges of all contours, with their closedness
    pub fn contour_ranges(&self) -> impl Iterator<Item = (Range<usize>, bool)> + '_ {
        let mut start = 0;
        self.contours.iter().map(move |contour| {
            let range = start..contour.end_point + 1;
            start = contour.end_point + 1;
            (range, contour.is_closed)
        })
    }

    /// Absolute point-index range of one contour
    pub fn contour_range(&self, contour_index: usize) -> Option<Range<usize>> {
        let contour = self.contours.get(contour_index)?;
        let start = self.contour_start(contour_index);
        Some(start..contour.end_point + 1)
    }

    pub fn num_points_of_contour(&self, contour_index: usize) -> Option<usize> {
        self.contour_range(contour_index).map(|r| r.len())
    }

    fn contour_start(&self, contour_index: usize) -> usize {
        if contour_index == 0 {
            0
        } else {
            self.contours[contour_index - 1].end_point + 1
        }
    }

    /// Map an absolute point index to `(contour index, index within contour)`
    pub fn contour_and_point_index(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.num_points() {
            return None;
        }
        let contour_index = self.contours.partition_point(|c| c.end_point < index);
        let start = self.contour_start(contour_index);
        Some((contour_index, index - start))
    }

    /// Map `(contour index, index within contour)` to an absolute index
    pub fn absolute_point_index(&self, contour_index: usize, point_index: usize) -> Option<usize> {
        let range = self.contour_range(contour_index)?;
        let index = range.start + point_index;
        range.contains(&index).then_some(index)
    }

    /// The previous and next points around `index`, wrapping on closed
    /// contours
    pub fn neighbor_points(&self, index: usize) -> Neighbors {
        let Some((contour_index, _)) = self.contour_and_point_index(index) else {
            return Neighbors::default();
        };
        let range = self.contour_ranges().nth(contour_index);
        let Some((range, is_closed)) = range else {
            return Neighbors::default();
        };

        let prev = if index > range.start {
            Some(index - 1)
        } else if is_closed {
            Some(range.end - 1)
        } else {
            None
        };
        let next = if index + 1 < range.end {
            Some(index + 1)
        } else if is_closed {
            Some(range.start)
        } else {
            None
        };

        Neighbors {
            prev: prev.and_then(|i| Some((i, self.point(i)?))),
            next: next.and_then(|i| Some((i, self.point(i)?))),
        }
    }

    /// Bounding box of all points, on- and off-curve
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut points = self.coordinates.chunks_exact(2).map(|c| Point::new(c[0], c[1]));
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |rect, p| {
            rect.union_pt(p)
        }))
    }

    // ===== BUILDING =====

    fn open_contour_mut(&mut self) -> Result<&mut Contour, PathError> {
        match Arc::make_mut(&mut self.contours).last_mut() {
            Some(contour) if !contour.is_closed => Ok(contour),
            _ => Err(PathError::NoOpenContour),
        }
    }

    fn has_open_contour(&self) -> bool {
        self.contours.last().is_some_and(|c| !c.is_closed)
    }

    fn push_point(&mut self, x: f64, y: f64, code: u8) {
        self.coordinates.push(x);
        self.coordinates.push(y);
        Arc::make_mut(&mut self.point_types).push(code);
    }

    /// Append a point to the open contour
    pub fn add_point(
        &mut self,
        x: f64,
        y: f64,
        typ: PointType,
        smooth: bool,
    ) -> Result<(), PathError> {
        self.open_contour_mut()?.end_point = self.num_points();
        self.push_point(x, y, point::encode(typ, smooth));
        Ok(())
    }

    /// Start a new contour at an on-curve point
    pub fn move_to(&mut self, x: f64, y: f64) {
        let end_point = self.num_points();
        self.push_point(x, y, point::encode(PointType::OnCurve, false));
        Arc::make_mut(&mut self.contours).push(Contour {
            end_point,
            is_closed: false,
        });
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> Result<(), PathError> {
        self.add_point(x, y, PointType::OnCurve, false)
    }

    /// Add a cubic segment: two cubic off-curve points and an on-curve point
    pub fn curve_to(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> Result<(), PathError> {
        if !self.has_open_contour() {
            return Err(PathError::NoOpenContour);
        }
        self.add_point(x1, y1, PointType::OffCurveCubic, false)?;
        self.add_point(x2, y2, PointType::OffCurveCubic, false)?;
        self.add_point(x3, y3, PointType::OnCurve, false)
    }

    /// Add a quadratic run from flat `x, y` pairs
    ///
    /// Every pair but the last becomes a quadratic off-curve point; the last
    /// is on-curve. The path is left untouched if the count is odd or zero.
    pub fn q_curve_to(&mut self, coords: &[f64]) -> Result<(), PathError> {
        if coords.len() % 2 != 0 || coords.is_empty() {
            return Err(PathError::Arity {
                count: coords.len(),
            });
        }
        if !self.has_open_contour() {
            return Err(PathError::NoOpenContour);
        }
        let (off_curve, on_curve) = coords.split_at(coords.len() - 2);
        for pair in off_curve.chunks_exact(2) {
            self.add_point(pair[0], pair[1], PointType::OffCurveQuad, false)?;
        }
        self.add_point(on_curve[0], on_curve[1], PointType::OnCurve, false)
    }

    /// Mark the open contour closed
    pub fn close_path(&mut self) -> Result<(), PathError> {
        self.open_contour_mut()?.is_closed = true;
        Ok(())
    }

    /// Append a closed contour made only of quadratic off-curve points
    ///
    /// This is the TrueType "blob" form: the on-curve points are all
    /// implied.
    pub fn quad_blob(&mut self, off_curve: &[Point]) -> Result<(), PathError> {
        let points: Vec<PathPoint> = off_curve
            .iter()
            .map(|&p| PathPoint::new(p, PointType::OffCurveQuad, false))
            .collect();
        self.insert_contour(self.num_contours(), &points, true)
    }

    // ===== WHOLE-PATH OPERATIONS =====

    /// An independent copy with freshly allocated buffers
    pub fn copy(&self) -> Self {
        Self {
            coordinates: self.coordinates.clone(),
            point_types: Arc::new(self.point_types.as_ref().clone()),
            contours: Arc::new(self.contours.as_ref().clone()),
        }
    }

    /// Apply an affine transform to every coordinate
    ///
    /// Point types and contours are shared with `self`.
    pub fn transformed(&self, transform: Affine) -> Self {
        let mut coordinates = Vec::with_capacity(self.coordinates.len());
        for pair in self.coordinates.chunks_exact(2) {
            let p = transform * Point::new(pair[0], pair[1]);
            coordinates.push(p.x);
            coordinates.push(p.y);
        }
        Self::from_parts(
            coordinates,
            Arc::clone(&self.point_types),
            Arc::clone(&self.contours),
        )
    }

    /// A new path holding the contours of `self` followed by those of `other`
    pub fn concat(&self, other: &PackedPath) -> Self {
        let offset = self.num_points();
        let mut coordinates = self.coordinates.clone();
        coordinates.extend_from_slice(&other.coordinates);
        let mut point_types = self.point_types.as_ref().clone();
        point_types.extend_from_slice(&other.point_types);
        let mut contours = self.contours.as_ref().clone();
        contours.extend(other.contours.iter().map(|c| Contour {
            end_point: c.end_point + offset,
            is_closed: c.is_closed,
        }));
        Self::from_parts(coordinates, Arc::new(point_types), Arc::new(contours))
    }

    // ===== POINT EDITS =====

    fn check_point_index(&self, index: usize) -> Result<(), PathError> {
        if index < self.num_points() {
            Ok(())
        } else {
            Err(PathError::IndexOutOfRange {
                index,
                len: self.num_points(),
            })
        }
    }

    fn check_contour_index(&self, index: usize, inclusive: bool) -> Result<(), PathError> {
        let len = self.num_contours();
        if index < len || (inclusive && index == len) {
            Ok(())
        } else {
            Err(PathError::IndexOutOfRange { index, len })
        }
    }

    pub fn set_point_position(&mut self, index: usize, point: Point) -> Result<(), PathError> {
        self.check_point_index(index)?;
        self.coordinates[index * 2] = point.x;
        self.coordinates[index * 2 + 1] = point.y;
        Ok(())
    }

    pub fn set_point_type(
        &mut self,
        index: usize,
        typ: PointType,
        smooth: bool,
    ) -> Result<(), PathError> {
        self.check_point_index(index)?;
        Arc::make_mut(&mut self.point_types)[index] = point::encode(typ, smooth);
        Ok(())
    }

    /// Insert a point into a contour before `point_index`
    ///
    /// `point_index` may equal the contour length to append.
    pub fn insert_point(
        &mut self,
        contour_index: usize,
        point_index: usize,
        point: PathPoint,
    ) -> Result<(), PathError> {
        self.check_contour_index(contour_index, false)?;
        let range = self.contour_range(contour_index).unwrap_or(0..0);
        if point_index > range.len() {
            return Err(PathError::IndexOutOfRange {
                index: point_index,
                len: range.len(),
            });
        }
        let index = range.start + point_index;
        self.coordinates
            .splice(index * 2..index * 2, [point.point.x, point.point.y]);
        Arc::make_mut(&mut self.point_types).insert(index, point.code());
        for contour in &mut Arc::make_mut(&mut self.contours)[contour_index..] {
            contour.end_point += 1;
        }
        Ok(())
    }

    /// Remove a point from a contour
    ///
    /// Removing the only point of a contour removes the contour as well.
    pub fn delete_point(
        &mut self,
        contour_index: usize,
        point_index: usize,
    ) -> Result<PathPoint, PathError> {
        let index = self
            .absolute_point_index(contour_index, point_index)
            .ok_or(PathError::IndexOutOfRange {
                index: point_index,
                len: self.num_points_of_contour(contour_index).unwrap_or(0),
            })?;
        let removed = self.point(index).ok_or(PathError::IndexOutOfRange {
            index,
            len: self.num_points(),
        })?;
        let contour_len = self.num_points_of_contour(contour_index).unwrap_or(0);

        self.coordinates.drain(index * 2..index * 2 + 2);
        Arc::make_mut(&mut self.point_types).remove(index);
        let contours = Arc::make_mut(&mut self.contours);
        if contour_len == 1 {
            contours.remove(contour_index);
        }
        for contour in &mut contours[contour_index..] {
            contour.end_point -= 1;
        }
        Ok(removed)
    }

    /// Insert a whole contour before `contour_index`
    pub fn insert_contour(
        &mut self,
        contour_index: usize,
        points: &[PathPoint],
        is_closed: bool,
    ) -> Result<(), PathError> {
        self.check_contour_index(contour_index, true)?;
        if points.is_empty() {
            return Err(PathError::Malformed("contour without points".into()));
        }
        let start = self.contour_start(contour_index);
        let coords: Vec<f64> = points
            .iter()
            .flat_map(|p| [p.point.x, p.point.y])
            .collect();
        self.coordinates.splice(start * 2..start * 2, coords);
        Arc::make_mut(&mut self.point_types)
            .splice(start..start, points.iter().map(PathPoint::code));

        let contours = Arc::make_mut(&mut self.contours);
        for contour in &mut contours[contour_index..] {
            contour.end_point += points.len();
        }
        contours.insert(
            contour_index,
            Contour {
                end_point: start + points.len() - 1,
                is_closed,
            },
        );
        Ok(())
    }

    /// Remove a whole contour, returning its points and closedness
    pub fn delete_contour(
        &mut self,
        contour_index: usize,
    ) -> Result<(Vec<PathPoint>, bool), PathError> {
        self.check_contour_index(contour_index, false)?;
        let range = self.contour_range(contour_index).unwrap_or(0..0);
        let points: Vec<PathPoint> = self.contour_points(contour_index).collect();
        let is_closed = self.contours[contour_index].is_closed;

        self.coordinates.drain(range.start * 2..range.end * 2);
        Arc::make_mut(&mut self.point_types).drain(range.clone());
        let contours = Arc::make_mut(&mut self.contours);
        contours.remove(contour_index);
        for contour in &mut contours[contour_index..] {
            contour.end_point -= range.len();
        }
        Ok((points, is_closed))
    }
}

fn validate_buffers(
    coordinates: &[f64],
    point_types: &[u8],
    contours: &[Contour],
) -> Result<(), PathError> {
    validate_layout(coordinates, point_types.len(), contours)?;
    if let Some((index, &code)) = point_types
        .iter()
        .enumerate()
        .find(|(_, code)| PointType::from_code(**code).is_none())
    {
        return Err(PathError::InvalidPointType { index, code });
    }
    Ok(())
}

/// Check buffer lengths and contour endpoints, ignoring type codes
pub(crate) fn validate_layout(
    coordinates: &[f64],
    num_points: usize,
    contours: &[Contour],
) -> Result<(), PathError> {
    if coordinates.len() != num_points * 2 {
        return Err(PathError::Malformed(format!(
            "{} coordinates for {num_points} points",
            coordinates.len(),
        )));
    }

    let mut previous: Option<usize> = None;
    for contour in contours {
        if previous.is_some_and(|p| contour.end_point <= p) {
            return Err(PathError::Malformed(
                "contour endpoints must strictly increase".into(),
            ));
        }
        previous = Some(contour.end_point);
    }
    match previous {
        None if num_points > 0 => Err(PathError::Malformed(
            "points outside of any contour".into(),
        )),
        Some(last) if last + 1 != num_points => Err(PathError::Malformed(format!(
            "last contour ends at {last} but path has {num_points} points"
        ))),
        _ => Ok(()),
    }
}
