// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Handle alignment for smooth points.
//!
//! A smooth on-curve point keeps its two neighbors on one line through it.
//! These helpers compute where a handle has to go to restore that; they
//! never look at a path, only at positions.

use kurbo::{Point, Vec2};

/// Place `handle` on the ray from `anchor` pointing away from `reference`,
/// keeping its distance from `anchor`
///
/// Used when only one neighbor of a smooth point is a handle: the other
/// neighbor (an on-curve point) fixes the tangent.
pub fn align_handle(reference: Point, anchor: Point, handle: Point) -> Point {
    along_direction(anchor - reference, anchor, handle)
}

/// Re-align both handles of a two-sided smooth point
///
/// The shared tangent is the difference of the two handle vectors, so both
/// sides pull on it equally. Each handle keeps its length.
pub fn align_handles(handle_in: Point, anchor: Point, handle_out: Point) -> (Point, Point) {
    let direction = handle_in - handle_out;
    (
        along_direction(direction, anchor, handle_in),
        along_direction(-direction, anchor, handle_out),
    )
}

/// New position of the opposite handle after `moved` was dragged: on the
/// far side of `anchor`, keeping the opposite handle's length
pub fn rotate_opposite(anchor: Point, moved: Point, opposite: Point) -> Point {
    along_direction(anchor - moved, anchor, opposite)
}

/// The opposite handle as the point reflection of `moved` through `anchor`
pub fn mirror_opposite(anchor: Point, moved: Point) -> Point {
    anchor + (anchor - moved)
}

/// Project `handle` onto the tangent line through `anchor` set by
/// `reference`
pub fn project_on_tangent(reference: Point, anchor: Point, handle: Point) -> Point {
    let tangent = anchor - reference;
    let len = tangent.hypot();
    if len == 0.0 {
        return handle;
    }
    let unit = tangent / len;
    anchor + unit * (handle - anchor).dot(unit)
}

/// Round a point to whole units
pub fn round_point(p: Point) -> Point {
    Point::new(p.x.round(), p.y.round())
}

fn along_direction(direction: Vec2, anchor: Point, handle: Point) -> Point {
    let length = (handle - anchor).hypot();
    let norm = direction.hypot();
    if norm == 0.0 {
        return handle;
    }
    anchor + direction * (length / norm)
}
