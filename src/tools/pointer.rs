// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer tool: select, rubber-band select, drag, and toggle smooth points

use super::{GestureState, PressOutcome, await_drag_threshold};
use crate::editing::hit_test;
use crate::editing::smooth;
use crate::editing::{
    BehaviorName, Change, ChangeSet, EditBehavior, EditBehaviorFactory, EditContext, EditSession,
    MouseEvent, PointerEvent, Selection, UndoInfo,
};
use crate::error::EditError;
use crate::path::{PackedPath, PointType};
use crate::settings::EditorSettings;
use kurbo::{Point, Rect};
use tokio::sync::mpsc::Receiver;

/// The pointer tool
#[derive(Debug, Clone)]
pub struct PointerTool {
    settings: EditorSettings,
    state: GestureState,
    /// Rubber band of the rect selection in progress
    selection_rect: Option<Rect>,
    /// Components hit by the last double click
    double_clicked_components: Vec<usize>,
}

impl PointerTool {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            state: GestureState::Idle,
            selection_rect: None,
            double_clicked_components: Vec::new(),
        }
    }

    pub fn gesture_state(&self) -> GestureState {
        self.state
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        self.selection_rect
    }

    pub fn double_clicked_components(&self) -> &[usize] {
        &self.double_clicked_components
    }

    /// Run one press-to-release gesture
    pub async fn handle_drag(
        &mut self,
        ctx: &mut EditContext,
        selection: &mut Selection,
        initial: MouseEvent,
        events: &mut Receiver<PointerEvent>,
    ) -> Result<(), EditError> {
        let hit = hit_test::selection_at_point(ctx.instance(), initial.pos, self.settings.click_margin);
        if initial.is_double_click() {
            return self.handle_double_click(ctx, selection, &hit);
        }

        let initial_selection = selection.clone();
        let mut initiate_drag = false;
        let mut initiate_rect_select = false;

        if !hit.is_empty() {
            if initial.mods.shift {
                *selection = selection.symmetric_difference(&hit);
                initiate_drag = selection.is_superset(&hit);
            } else if selection.is_superset(&hit) {
                initiate_drag = true;
            } else {
                *selection = hit.clone();
                initiate_drag = true;
            }
        } else {
            if !initial.mods.shift {
                *selection = Selection::new();
            }
            initiate_rect_select = true;
        }

        if !(initiate_drag || initiate_rect_select) {
            return Ok(());
        }

        self.state = GestureState::AwaitingDragThreshold;
        let first = match await_drag_threshold(events, initial.pos, self.settings.drag_threshold).await
        {
            PressOutcome::Drag(event) => event,
            PressOutcome::Click(_) | PressOutcome::Cancelled => {
                tracing::debug!("Pointer tool: press ended without drag");
                self.state = GestureState::Idle;
                return Ok(());
            }
        };

        let result = if initiate_rect_select {
            self.rect_select(ctx, selection, &initial_selection, initial, first, events)
                .await;
            Ok(())
        } else {
            self.drag_selection(ctx, selection, initial, first, events)
                .await
        };
        self.state = GestureState::Idle;
        result
    }

    async fn rect_select(
        &mut self,
        ctx: &EditContext,
        selection: &mut Selection,
        initial_selection: &Selection,
        initial: MouseEvent,
        first: MouseEvent,
        events: &mut Receiver<PointerEvent>,
    ) {
        self.state = GestureState::RectSelecting;
        let mut event = first;
        loop {
            let rect = Rect::from_points(initial.pos, event.pos);
            let hits = hit_test::selection_at_rect(ctx.instance(), rect);
            *selection = if event.mods.shift {
                initial_selection.symmetric_difference(&hits)
            } else {
                hits
            };
            self.selection_rect = Some(rect);

            match events.recv().await {
                Some(PointerEvent::Move(ev)) => event = ev,
                Some(PointerEvent::Up(ev)) => {
                    let rect = Rect::from_points(initial.pos, ev.pos);
                    let hits = hit_test::selection_at_rect(ctx.instance(), rect);
                    *selection = if ev.mods.shift {
                        initial_selection.symmetric_difference(&hits)
                    } else {
                        hits
                    };
                    break;
                }
                Some(PointerEvent::Cancel) | None => {
                    *selection = initial_selection.clone();
                    break;
                }
            }
        }
        tracing::debug!("Pointer tool: rect select picked {} items", selection.len());
        self.selection_rect = None;
    }

    async fn drag_selection(
        &mut self,
        ctx: &mut EditContext,
        selection: &Selection,
        initial: MouseEvent,
        first: MouseEvent,
        events: &mut Receiver<PointerEvent>,
    ) -> Result<(), EditError> {
        self.state = GestureState::Dragging;
        let undo_info = UndoInfo::new("drag selection", selection);
        let factory = EditBehaviorFactory::new(ctx.instance(), selection)?
            .with_rounding(self.settings.round_coordinates);
        let mut drag = DragState::new(factory, initial);

        let mut session = ctx.begin();
        session.set_rollback(drag.rollback())?;

        let mut event = first;
        loop {
            drag.preview(&mut session, &event, !events.is_empty())?;
            match events.recv().await {
                Some(PointerEvent::Move(ev)) => event = ev,
                Some(PointerEvent::Up(ev)) => {
                    let change = drag.change_for(&mut session, &ev)?;
                    session.incremental(&change)?;
                    session.end(change, undo_info);
                    return Ok(());
                }
                Some(PointerEvent::Cancel) | None => {
                    tracing::debug!("Pointer tool: drag cancelled");
                    return session.abort();
                }
            }
        }
    }

    fn handle_double_click(
        &mut self,
        ctx: &mut EditContext,
        selection: &mut Selection,
        hit: &Selection,
    ) -> Result<(), EditError> {
        if hit.is_empty() {
            return Ok(());
        }
        if selection.is_empty() {
            *selection = hit.clone();
        }

        let components: Vec<usize> = selection.component_indices().collect();
        if !components.is_empty() {
            tracing::info!("Double-clicked components {:?}", components);
            self.double_clicked_components = components;
            return Ok(());
        }

        let points: Vec<usize> = selection.point_indices().collect();
        let (change, rollback) =
            toggle_smooth_changes(&ctx.instance().path, &points, self.settings.round_coordinates);
        if change.is_empty() {
            return Ok(());
        }
        ctx.atomic(
            change.consolidate(),
            rollback.consolidate(),
            UndoInfo::new("toggle smooth", selection),
        )
    }
}

/// The behavior driving a drag, and where the drag started
struct DragState {
    factory: EditBehaviorFactory,
    behavior: EditBehavior,
    origin: Point,
}

impl DragState {
    fn new(factory: EditBehaviorFactory, initial: MouseEvent) -> Self {
        let behavior = factory.behavior(BehaviorName::from_modifiers(initial.mods));
        Self {
            factory,
            behavior,
            origin: initial.pos,
        }
    }

    fn rollback(&self) -> ChangeSet {
        self.behavior.rollback_change().clone()
    }

    /// The change for `event`, switching behavior first if the modifiers
    /// changed
    fn change_for(
        &mut self,
        session: &mut EditSession<'_>,
        event: &MouseEvent,
    ) -> Result<ChangeSet, EditError> {
        let name = BehaviorName::from_modifiers(event.mods);
        if name != self.behavior.name() {
            tracing::debug!("Pointer tool: behavior {} -> {name}", self.behavior.name());
            self.behavior = self.factory.behavior(name);
            session.set_rollback(self.rollback())?;
        }
        Ok(self.behavior.make_change_for_delta(event.pos - self.origin))
    }

    /// Queue the preview for `event`; it is only applied when no newer
    /// event is waiting
    fn preview(
        &mut self,
        session: &mut EditSession<'_>,
        event: &MouseEvent,
        events_waiting: bool,
    ) -> Result<(), EditError> {
        let change = self.change_for(session, event)?;
        session.incremental_may_drop(change);
        if events_waiting {
            return Ok(());
        }
        session.flush_preview()
    }
}

/// Changes that flip on-curve points between corner and smooth
///
/// A corner point only becomes smooth when it has two neighbors and at
/// least one of them is a handle; its handles are then re-aligned. Smooth
/// points always turn back into corners. Off-curve points are skipped.
/// Returns `(change, rollback)`.
pub fn toggle_smooth_changes(
    path: &PackedPath,
    points: &[usize],
    round: bool,
) -> (ChangeSet, ChangeSet) {
    let finish = |p: Point| if round { smooth::round_point(p) } else { p };
    let mut change = ChangeSet::new();
    let mut rollback = ChangeSet::new();

    for &index in points {
        let Some(point) = path.point(index) else {
            continue;
        };
        if !point.is_on_curve() {
            continue;
        }
        let neighbors = path.neighbor_points(index);
        let has_handle = [neighbors.prev, neighbors.next]
            .iter()
            .flatten()
            .any(|(_, p)| p.is_off_curve());
        let both_sides = neighbors.prev.is_some() && neighbors.next.is_some();
        if !point.smooth && !(both_sides && has_handle) {
            continue;
        }

        let smooth = !point.smooth;
        rollback.push(Change::SetPointType {
            index,
            typ: PointType::OnCurve,
            smooth: point.smooth,
        });
        change.push(Change::SetPointType {
            index,
            typ: PointType::OnCurve,
            smooth,
        });
        if !smooth {
            continue;
        }

        let anchor = point.point;
        let mut realign = |handle_index: usize, from: Point, to: Point| {
            rollback.push(Change::move_point(handle_index, from));
            change.push(Change::move_point(handle_index, finish(to)));
        };
        match (neighbors.prev, neighbors.next) {
            (Some((pi, prev)), Some((ni, next))) if prev.is_off_curve() && next.is_off_curve() => {
                let (new_prev, new_next) = smooth::align_handles(prev.point, anchor, next.point);
                realign(pi, prev.point, new_prev);
                realign(ni, next.point, new_next);
            }
            (Some((pi, prev)), Some((_, next))) if prev.is_off_curve() => {
                realign(pi, prev.point, smooth::align_handle(next.point, anchor, prev.point));
            }
            (Some((_, prev)), Some((ni, next))) if next.is_off_curve() => {
                realign(ni, next.point, smooth::align_handle(prev.point, anchor, next.point));
            }
            _ => {}
        }
    }
    (change, rollback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::{GlyphInstance, Modifiers, MouseButton};
    use tokio::sync::mpsc;

    /// Closed contour: corner at 0, smooth point at 3 between handles 2 and 4
    fn glyph() -> GlyphInstance {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.curve_to(0.0, 100.0, 100.0, 200.0, 200.0, 200.0).unwrap();
        path.curve_to(300.0, 200.0, 400.0, 100.0, 400.0, 0.0).unwrap();
        path.close_path().unwrap();
        path.set_point_type(3, PointType::OnCurve, true).unwrap();
        GlyphInstance::new(path)
    }

    fn press(x: f64, y: f64, mods: Modifiers) -> MouseEvent {
        MouseEvent::with_modifiers(Point::new(x, y), Some(MouseButton::Left), mods)
    }

    fn moved(x: f64, y: f64, mods: Modifiers) -> PointerEvent {
        PointerEvent::Move(press(x, y, mods))
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up(press(x, y, Modifiers::NONE))
    }

    async fn run(
        ctx: &mut EditContext,
        selection: &mut Selection,
        initial: MouseEvent,
        script: Vec<PointerEvent>,
    ) -> Result<(), EditError> {
        let (tx, mut rx) = mpsc::channel(script.len().max(1));
        for event in script {
            tx.send(event).await.unwrap();
        }
        drop(tx);
        let mut tool = PointerTool::new(EditorSettings::default());
        let result = tool.handle_drag(ctx, selection, initial, &mut rx).await;
        assert_eq!(tool.gesture_state(), GestureState::Idle);
        result
    }

    #[tokio::test]
    async fn click_selects_point_under_pointer() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::new();
        run(&mut ctx, &mut selection, press(201.0, 199.0, Modifiers::NONE), vec![up(201.0, 199.0)])
            .await
            .unwrap();
        assert_eq!(selection.point_indices().collect::<Vec<_>>(), vec![3]);
        assert!(ctx.history().is_empty());
    }

    #[tokio::test]
    async fn drag_moves_point_and_handles_as_one_undo_step() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::new();
        let script = vec![
            moved(210.0, 200.0, Modifiers::NONE),
            moved(220.0, 205.0, Modifiers::NONE),
            up(230.0, 210.0),
        ];
        run(&mut ctx, &mut selection, press(200.0, 200.0, Modifiers::NONE), script)
            .await
            .unwrap();

        let path = &ctx.instance().path;
        assert_eq!(path.position(3), Some(Point::new(230.0, 210.0)));
        assert_eq!(path.position(2), Some(Point::new(130.0, 210.0)));
        assert_eq!(path.position(4), Some(Point::new(330.0, 210.0)));
        assert_eq!(ctx.history().len(), 1);
        assert_eq!(ctx.history().undo_label(), Some("drag selection"));

        ctx.undo().unwrap();
        assert_eq!(ctx.instance(), &glyph());
    }

    #[tokio::test]
    async fn cancelled_drag_restores_baseline() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::new();
        let script = vec![
            moved(250.0, 250.0, Modifiers::NONE),
            moved(260.0, 250.0, Modifiers::NONE),
            PointerEvent::Cancel,
        ];
        run(&mut ctx, &mut selection, press(200.0, 200.0, Modifiers::NONE), script)
            .await
            .unwrap();
        assert_eq!(ctx.instance(), &glyph());
        assert!(ctx.history().is_empty());
    }

    #[tokio::test]
    async fn closed_stream_aborts_drag() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::new();
        let script = vec![moved(250.0, 250.0, Modifiers::NONE)];
        run(&mut ctx, &mut selection, press(200.0, 200.0, Modifiers::NONE), script)
            .await
            .unwrap();
        assert_eq!(ctx.instance(), &glyph());
    }

    #[tokio::test]
    async fn switching_behavior_mid_drag_starts_from_baseline() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::from_tokens(&["point/2"]).unwrap();
        let script = vec![
            moved(100.0, 230.0, Modifiers::NONE),
            moved(100.0, 230.0, Modifiers::ALT),
            up(100.0, 230.0),
        ];
        run(&mut ctx, &mut selection, press(100.0, 200.0, Modifiers::NONE), script)
            .await
            .unwrap();

        // the release carries no modifiers: default behavior, rotated handle
        let path = &ctx.instance().path;
        assert_eq!(path.position(2), Some(Point::new(100.0, 230.0)));
        let anchor = Point::new(200.0, 200.0);
        let opposite = path.position(4).unwrap();
        assert!(((opposite - anchor).hypot() - 100.0).abs() <= 1.0);
        assert!(opposite.y < 200.0);

        ctx.undo().unwrap();
        assert_eq!(ctx.instance(), &glyph());
    }

    #[tokio::test]
    async fn rect_select_with_shift_toggles() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::from_tokens(&["point/0"]).unwrap();
        let shift = Modifiers::SHIFT;
        let script = vec![moved(-10.0, 10.0, shift), PointerEvent::Up(press(50.0, 110.0, shift))];
        run(&mut ctx, &mut selection, press(-20.0, -20.0, shift), script)
            .await
            .unwrap();
        // rect covers points 0 and 1: 0 toggles off, 1 toggles on
        assert_eq!(selection.point_indices().collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn click_on_empty_space_clears_selection() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::from_tokens(&["point/0"]).unwrap();
        run(&mut ctx, &mut selection, press(-500.0, -500.0, Modifiers::NONE), vec![up(-500.0, -500.0)])
            .await
            .unwrap();
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn double_click_toggles_smooth_atomically() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::new();
        let initial = press(0.0, 0.0, Modifiers::NONE).with_count(2);
        run(&mut ctx, &mut selection, initial, vec![]).await.unwrap();

        // point 0 sits between the on-curve point 6 and handle 1
        let path = &ctx.instance().path;
        assert!(path.point(0).unwrap().smooth);
        assert_eq!(path.position(1), Some(Point::new(-100.0, 0.0)));
        assert_eq!(ctx.history().undo_label(), Some("toggle smooth"));

        ctx.undo().unwrap();
        assert_eq!(ctx.instance(), &glyph());
    }

    #[test]
    fn toggling_smooth_point_back_to_corner_keeps_handles() {
        let path = glyph().path;
        let (change, rollback) = toggle_smooth_changes(&path, &[3], true);
        assert_eq!(
            change,
            ChangeSet::from(vec![Change::SetPointType {
                index: 3,
                typ: PointType::OnCurve,
                smooth: false
            }])
        );
        assert_eq!(rollback.len(), 1);
    }

    #[test]
    fn corner_between_lines_is_not_toggled() {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0).unwrap();
        path.line_to(10.0, 10.0).unwrap();
        let (change, _) = toggle_smooth_changes(&path, &[1], true);
        assert!(change.is_empty());
        // handles are skipped as well
        let (change, _) = toggle_smooth_changes(&glyph().path, &[1], true);
        assert!(change.is_empty());
    }

    #[test]
    fn one_sided_handle_aligns_with_line() {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0).unwrap();
        path.curve_to(13.0, 4.0, 30.0, 10.0, 30.0, 20.0).unwrap();
        let (change, _) = toggle_smooth_changes(&path, &[1], true);
        assert!(change.iter().any(|c| *c == Change::move_point(2, Point::new(15.0, 0.0))));
    }

    #[test]
    fn undoing_smooth_toggle_restores_fractional_handle() {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0).unwrap();
        path.curve_to(13.4, 4.3, 30.0, 10.0, 30.0, 20.0).unwrap();
        let baseline = GlyphInstance::new(path);

        let mut ctx = EditContext::new(baseline.clone());
        let (change, rollback) = toggle_smooth_changes(&ctx.instance().path, &[1], true);
        ctx.atomic(change, rollback, UndoInfo::new("toggle smooth", &Selection::new()))
            .unwrap();
        assert_eq!(ctx.instance().path.position(2), Some(Point::new(15.0, 0.0)));

        ctx.undo().unwrap();
        assert_eq!(ctx.instance().path.position(2), Some(Point::new(13.4, 4.3)));
        assert_eq!(ctx.instance(), &baseline);
    }

    #[test]
    fn queued_events_defer_preview() {
        let mut ctx = EditContext::new(glyph());
        let selection = Selection::from_tokens(&["point/3"]).unwrap();
        let factory = EditBehaviorFactory::new(ctx.instance(), &selection).unwrap();
        let mut drag = DragState::new(factory, press(200.0, 200.0, Modifiers::NONE));
        let mut session = ctx.begin();
        session.set_rollback(drag.rollback()).unwrap();

        drag.preview(&mut session, &press(210.0, 200.0, Modifiers::NONE), true)
            .unwrap();
        assert!(session.has_pending_preview());
        assert_eq!(session.instance(), session.baseline());

        drag.preview(&mut session, &press(220.0, 200.0, Modifiers::NONE), false)
            .unwrap();
        assert!(!session.has_pending_preview());
        assert_eq!(session.instance().path.position(3), Some(Point::new(220.0, 200.0)));
        assert_eq!(session.instance().path.position(2), Some(Point::new(120.0, 200.0)));

        session.abort().unwrap();
        assert_eq!(ctx.instance(), &glyph());
    }

    #[tokio::test]
    async fn drag_fed_one_event_at_a_time_ends_at_last_event() {
        let mut ctx = EditContext::new(glyph());
        let mut selection = Selection::new();
        let mut tool = PointerTool::new(EditorSettings::default());
        let (tx, mut rx) = mpsc::channel(1);
        let feed = async move {
            for x in [210.0, 220.0, 230.0] {
                tx.send(moved(x, 200.0, Modifiers::NONE)).await.unwrap();
                tokio::task::yield_now().await;
            }
            tx.send(up(240.0, 205.0)).await.unwrap();
        };
        let gesture = tool.handle_drag(
            &mut ctx,
            &mut selection,
            press(200.0, 200.0, Modifiers::NONE),
            &mut rx,
        );
        let (result, ()) = tokio::join!(gesture, feed);
        result.unwrap();

        assert_eq!(ctx.instance().path.position(3), Some(Point::new(240.0, 205.0)));
        assert_eq!(ctx.history().len(), 1);
        ctx.undo().unwrap();
        assert_eq!(ctx.instance(), &glyph());
    }
}
