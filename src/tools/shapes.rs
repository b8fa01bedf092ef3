// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Shapes tool for creating geometric primitives
//!
//! Drag out a rectangle or an ellipse; holding shift constrains it to a
//! square or circle. The shape is only a preview rect until release, when
//! it lands in the glyph as one new closed contour.

use super::{GestureState, PressOutcome, await_drag_threshold};
use crate::editing::{
    Change, ChangeSet, EditContext, MouseEvent, PointerEvent, Selection, SelectionItem, UndoInfo,
};
use crate::error::EditError;
use crate::path::shapes::{draw_ellipse_in_rect, draw_rect};
use crate::path::{PackedPathPen, PathPoint};
use crate::settings::EditorSettings;
use kurbo::{Point, Rect};
use tokio::sync::mpsc::Receiver;

// ===== Shape Type =====

/// Type of shape being drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShapeType {
    /// Rectangle shape
    #[default]
    Rectangle,
    /// Ellipse/circle shape
    Ellipse,
}

impl ShapeType {
    fn undo_label(self) -> &'static str {
        match self {
            ShapeType::Rectangle => "draw rectangle",
            ShapeType::Ellipse => "draw ellipse",
        }
    }
}

// ===== ShapesTool Struct =====

/// The shapes tool
#[derive(Debug, Clone)]
pub struct ShapesTool {
    settings: EditorSettings,
    /// Current shape type being drawn
    shape_type: ShapeType,
    state: GestureState,
    /// Outline of the shape while dragging, in design space
    preview_rect: Option<Rect>,
}

impl ShapesTool {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            shape_type: ShapeType::default(),
            state: GestureState::Idle,
            preview_rect: None,
        }
    }

    /// Set the current shape type
    pub fn set_shape_type(&mut self, shape_type: ShapeType) {
        self.shape_type = shape_type;
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn gesture_state(&self) -> GestureState {
        self.state
    }

    pub fn preview_rect(&self) -> Option<Rect> {
        self.preview_rect
    }

    /// Run one drag-out gesture; the new contour is selected on success
    pub async fn handle_drag(
        &mut self,
        ctx: &mut EditContext,
        selection: &mut Selection,
        initial: MouseEvent,
        events: &mut Receiver<PointerEvent>,
    ) -> Result<(), EditError> {
        self.state = GestureState::AwaitingDragThreshold;
        let start = initial.pos;
        let mut event =
            match await_drag_threshold(events, start, self.settings.drag_threshold).await {
                PressOutcome::Drag(event) => event,
                PressOutcome::Click(_) | PressOutcome::Cancelled => {
                    self.state = GestureState::Idle;
                    return Ok(());
                }
            };

        self.state = GestureState::Dragging;
        let result = loop {
            self.preview_rect = Some(rect_for_drag(start, event.pos, event.mods.shift));
            match events.recv().await {
                Some(PointerEvent::Move(ev)) => event = ev,
                Some(PointerEvent::Up(ev)) => {
                    let rect = rect_for_drag(start, ev.pos, ev.mods.shift);
                    break self.commit(ctx, selection, rect);
                }
                Some(PointerEvent::Cancel) | None => {
                    tracing::debug!("Shapes tool: cancelled");
                    break Ok(());
                }
            }
        };
        self.preview_rect = None;
        self.state = GestureState::Idle;
        result
    }

    fn commit(
        &self,
        ctx: &mut EditContext,
        selection: &mut Selection,
        rect: Rect,
    ) -> Result<(), EditError> {
        if rect.width() == 0.0 || rect.height() == 0.0 {
            tracing::debug!("Shapes tool: skipping degenerate {:?}", self.shape_type);
            return Ok(());
        }

        let points = self.contour_points(rect)?;
        let path = &ctx.instance().path;
        let contour = path.num_contours();
        let first_index = path.num_points();
        let new_selection: Selection = (first_index..first_index + points.len())
            .map(SelectionItem::Point)
            .collect();

        let change = ChangeSet::from(vec![Change::InsertContour {
            contour,
            points,
            is_closed: true,
        }]);
        let rollback = ChangeSet::from(vec![Change::DeleteContour { contour }]);
        let mut info = UndoInfo::new(self.shape_type.undo_label(), selection);
        info.redo_selection = new_selection.clone();
        ctx.atomic(change, rollback, info)?;

        tracing::debug!("Shapes tool: created {:?} at {:?}", self.shape_type, rect);
        *selection = new_selection;
        Ok(())
    }

    /// The points of one closed contour tracing the shape in `rect`
    fn contour_points(&self, rect: Rect) -> Result<Vec<PathPoint>, EditError> {
        let mut pen = PackedPathPen::new();
        match self.shape_type {
            ShapeType::Rectangle => draw_rect(&mut pen, rect),
            ShapeType::Ellipse => draw_ellipse_in_rect(&mut pen, rect, self.settings.ellipse_tension),
        }
        let path = pen.finish()?;
        Ok(path.contour_points(0).collect())
    }
}

/// The rect spanned by a drag, squared off when `constrain` is set
fn rect_for_drag(start: Point, current: Point, constrain: bool) -> Rect {
    let current = if constrain {
        let delta = current - start;
        let size = delta.x.abs().max(delta.y.abs());
        Point::new(
            start.x + size * delta.x.signum(),
            start.y + size * delta.y.signum(),
        )
    } else {
        current
    };
    Rect::from_points(start, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{GlyphInstance, Modifiers, MouseButton};
    use crate::path::{PackedPath, PointType};
    use tokio::sync::mpsc;

    fn at(x: f64, y: f64, mods: Modifiers) -> MouseEvent {
        MouseEvent::with_modifiers(Point::new(x, y), Some(MouseButton::Left), mods)
    }

    fn existing() -> GlyphInstance {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0).unwrap();
        path.line_to(10.0, 10.0).unwrap();
        path.close_path().unwrap();
        GlyphInstance::new(path)
    }

    async fn drag(
        tool: &mut ShapesTool,
        ctx: &mut EditContext,
        selection: &mut Selection,
        script: Vec<PointerEvent>,
    ) {
        let (tx, mut rx) = mpsc::channel(8);
        for event in script {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        tool.handle_drag(ctx, selection, at(100.0, 100.0, Modifiers::NONE), &mut rx)
            .await
            .unwrap();
        assert_eq!(tool.gesture_state(), GestureState::Idle);
        assert_eq!(tool.preview_rect(), None);
    }

    #[test]
    fn shift_squares_the_drag() {
        let rect = rect_for_drag(Point::new(10.0, 10.0), Point::new(40.0, -5.0), true);
        assert_eq!(rect, Rect::new(10.0, -20.0, 40.0, 10.0));
        let rect = rect_for_drag(Point::new(10.0, 10.0), Point::new(40.0, -5.0), false);
        assert_eq!(rect, Rect::new(10.0, -5.0, 40.0, 10.0));
    }

    #[tokio::test]
    async fn rectangle_appends_contour_and_selects_it() {
        let mut tool = ShapesTool::new(EditorSettings::default());
        let mut ctx = EditContext::new(existing());
        let mut selection = Selection::new();
        let script = vec![
            PointerEvent::Move(at(150.0, 120.0, Modifiers::NONE)),
            PointerEvent::Up(at(200.0, 150.0, Modifiers::NONE)),
        ];
        drag(&mut tool, &mut ctx, &mut selection, script).await;

        let path = &ctx.instance().path;
        assert_eq!(path.num_contours(), 2);
        assert!(path.contours()[1].is_closed);
        let corners: Vec<Point> = path.contour_points(1).map(|p| p.point).collect();
        assert_eq!(
            corners,
            vec![
                Point::new(100.0, 100.0),
                Point::new(200.0, 100.0),
                Point::new(200.0, 150.0),
                Point::new(100.0, 150.0),
            ]
        );
        assert_eq!(selection.point_indices().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(ctx.history().undo_label(), Some("draw rectangle"));

        assert!(ctx.undo().unwrap().is_some_and(|s| s.is_empty()));
        assert_eq!(ctx.instance(), &existing());
    }

    #[tokio::test]
    async fn ellipse_is_inscribed_in_drag_rect() {
        let mut tool = ShapesTool::new(EditorSettings::default());
        tool.set_shape_type(ShapeType::Ellipse);
        let mut ctx = EditContext::new(GlyphInstance::default());
        let mut selection = Selection::new();
        let script = vec![PointerEvent::Up(at(300.0, 200.0, Modifiers::SHIFT))];
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(PointerEvent::Move(at(120.0, 110.0, Modifiers::SHIFT)))
            .await
            .unwrap();
        for event in script {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        tool.handle_drag(&mut ctx, &mut selection, at(100.0, 100.0, Modifiers::NONE), &mut rx)
            .await
            .unwrap();

        // shift turns the 200x100 drag into a 200x200 circle
        let path = &ctx.instance().path;
        assert_eq!(path.num_contours(), 1);
        assert_eq!(path.num_points(), 12);
        let bounds = path.bounding_box().unwrap();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
        assert!((bounds.height() - 200.0).abs() < 1e-9);
        assert_eq!(path.position(0), Some(Point::new(300.0, 200.0)));
        assert_eq!(path.point(1).map(|p| p.typ), Some(PointType::OffCurveCubic));
        assert_eq!(ctx.history().undo_label(), Some("draw ellipse"));
        assert_eq!(selection.len(), 12);
    }

    #[tokio::test]
    async fn cancel_leaves_glyph_untouched() {
        let mut tool = ShapesTool::new(EditorSettings::default());
        let mut ctx = EditContext::new(existing());
        let mut selection = Selection::new();
        let script = vec![
            PointerEvent::Move(at(150.0, 150.0, Modifiers::NONE)),
            PointerEvent::Cancel,
        ];
        drag(&mut tool, &mut ctx, &mut selection, script).await;
        assert_eq!(ctx.instance(), &existing());
        assert!(ctx.history().is_empty());
    }

    #[tokio::test]
    async fn click_or_flat_drag_draws_nothing() {
        let mut tool = ShapesTool::new(EditorSettings::default());
        let mut ctx = EditContext::new(existing());
        let mut selection = Selection::new();
        let script = vec![PointerEvent::Up(at(101.0, 100.0, Modifiers::NONE))];
        drag(&mut tool, &mut ctx, &mut selection, script).await;

        let script = vec![
            PointerEvent::Move(at(150.0, 100.0, Modifiers::NONE)),
            PointerEvent::Up(at(180.0, 100.0, Modifiers::NONE)),
        ];
        drag(&mut tool, &mut ctx, &mut selection, script).await;
        assert_eq!(ctx.instance(), &existing());
        assert!(ctx.history().is_empty());
    }
}
