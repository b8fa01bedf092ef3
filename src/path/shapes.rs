// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Geometric primitives drawn into any [`PathConsumer`]

use super::draw::PathConsumer;
use super::packed::PackedPath;
use crate::error::PathError;
use kurbo::{Point, Rect};

/// Handle length, relative to the radius, for a cubic quarter circle
pub const BEZIER_ARC_MAGIC: f64 = 0.5522847498;

/// Control offset, relative to the radius, for an eight-segment quadratic
/// circle (tan 22.5°)
pub const QUAD_BEZIER_ARC_MAGIC: f64 = 0.414213562373;

/// Draw a closed rectangle starting at its minimum corner
pub fn draw_rect<P: PathConsumer + ?Sized>(pen: &mut P, rect: Rect) {
    pen.move_to(Point::new(rect.min_x(), rect.min_y()));
    pen.line_to(Point::new(rect.max_x(), rect.min_y()));
    pen.line_to(Point::new(rect.max_x(), rect.max_y()));
    pen.line_to(Point::new(rect.min_x(), rect.max_y()));
    pen.close_path();
}

/// Draw a closed ellipse from four cubic quarter arcs
///
/// Starts at `(cx + rx, cy)` and runs counter-clockwise for positive radii;
/// negate one radius to reverse the contour. The last arc ends on the
/// starting point.
pub fn draw_ellipse<P: PathConsumer + ?Sized>(
    pen: &mut P,
    center: Point,
    rx: f64,
    ry: f64,
    tension: f64,
) {
    let at = |x: f64, y: f64| Point::new(center.x + rx * x, center.y + ry * y);
    let (mut h1, mut h2, mut end) = ((1.0, tension), (tension, 1.0), (0.0, 1.0));

    pen.move_to(at(1.0, 0.0));
    for _ in 0..4 {
        pen.curve_to(at(h1.0, h1.1), at(h2.0, h2.1), at(end.0, end.1));
        // quarter turn
        h1 = (-h1.1, h1.0);
        h2 = (-h2.1, h2.0);
        end = (-end.1, end.0);
    }
    pen.close_path();
}

/// Draw the ellipse inscribed in `rect`
pub fn draw_ellipse_in_rect<P: PathConsumer + ?Sized>(pen: &mut P, rect: Rect, tension: f64) {
    draw_ellipse(pen, rect.center(), rect.width() / 2.0, rect.height() / 2.0, tension);
}

/// Append a quadratic ellipse as an all-off-curve contour
///
/// The eight control points sit on the tangent octagon; every on-curve
/// point is implied.
pub fn add_ellipse_quadratic(
    path: &mut PackedPath,
    center: Point,
    rx: f64,
    ry: f64,
) -> Result<(), PathError> {
    let x = rx * QUAD_BEZIER_ARC_MAGIC;
    let y = ry * QUAD_BEZIER_ARC_MAGIC;
    let (cx, cy) = (center.x, center.y);
    path.quad_blob(&[
        Point::new(cx + x, cy + ry),
        Point::new(cx + rx, cy + y),
        Point::new(cx + rx, cy - y),
        Point::new(cx + x, cy - ry),
        Point::new(cx - x, cy - ry),
        Point::new(cx - rx, cy - y),
        Point::new(cx - rx, cy + y),
        Point::new(cx - x, cy + ry),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{DrawCommand, PackedPathPen, PointType, RecordingPen};

    #[test]
    fn rect_is_four_corners() {
        let mut pen = PackedPathPen::new();
        draw_rect(&mut pen, Rect::new(0.0, 0.0, 20.0, 10.0));
        let path = pen.finish().unwrap();
        assert_eq!(path.num_points(), 4);
        assert!(path.contours()[0].is_closed);
        assert_eq!(path.position(2), Some(Point::new(20.0, 10.0)));
    }

    #[test]
    fn cubic_ellipse_ends_where_it_starts() {
        let mut pen = RecordingPen::new();
        draw_ellipse(&mut pen, Point::new(10.0, 10.0), 5.0, 2.0, BEZIER_ARC_MAGIC);

        assert_eq!(pen.commands.len(), 6);
        assert_eq!(pen.commands[0], DrawCommand::MoveTo(Point::new(15.0, 10.0)));
        let DrawCommand::CurveTo(_, _, top) = pen.commands[1] else {
            panic!("expected a curve");
        };
        assert_eq!(top, Point::new(10.0, 12.0));
        let DrawCommand::CurveTo(_, _, last) = pen.commands[4] else {
            panic!("expected a curve");
        };
        assert!((last - Point::new(15.0, 10.0)).hypot() < 1e-9);
        assert_eq!(pen.commands[5], DrawCommand::ClosePath);
    }

    #[test]
    fn ellipse_in_rect_is_centered() {
        let mut pen = PackedPathPen::new();
        draw_ellipse_in_rect(&mut pen, Rect::new(0.0, 0.0, 100.0, 50.0), BEZIER_ARC_MAGIC);
        let path = pen.finish().unwrap();
        // the duplicate closing point is folded into the start point
        assert_eq!(path.num_points(), 12);
        let bbox = path.bounding_box().unwrap();
        assert!((bbox.min_x() - 0.0).abs() < 1e-9);
        assert!((bbox.max_y() - 50.0).abs() < 1e-9);
        assert_eq!(path.position(0), Some(Point::new(100.0, 25.0)));
    }

    #[test]
    fn quadratic_ellipse_is_a_blob() {
        let mut path = PackedPath::new();
        add_ellipse_quadratic(&mut path, Point::ZERO, 10.0, 10.0).unwrap();
        assert_eq!(path.num_points(), 8);
        assert!(path.points().all(|p| p.typ == PointType::OffCurveQuad));

        let mut pen = RecordingPen::new();
        path.draw_to_path(&mut pen).unwrap();
        let quads = pen
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::QuadTo(..)))
            .count();
        assert_eq!(quads, 8);
    }
}
