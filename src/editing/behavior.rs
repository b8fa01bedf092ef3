// Copyright 2025 the Runebender Xilem Authors
// SPDX-License-Identifier: Apache-2.0

//! Drag behaviors: turning a pointer delta into a change.
//!
//! When a drag starts, [`EditBehaviorFactory`] looks at the selection and
//! at the baseline outline and decides, once, how every affected point
//! responds to the drag:
//!
//! - selected points, and the handles of selected on-curve points, move by
//!   the full delta
//! - a dragged handle whose smooth anchor has an on-curve point on its
//!   other side slides along the tangent that point defines
//! - a dragged handle whose smooth anchor has a handle on its other side
//!   drags that opposite handle around the anchor
//!
//! An [`EditBehavior`] then maps each delta to a fresh [`ChangeSet`]
//! computed from the baseline, so switching behaviors mid-drag never
//! accumulates error.

use super::change::{Change, ChangeSet};
use super::instance::GlyphInstance;
use super::mouse::Modifiers;
use super::selection::Selection;
use super::smooth;
use crate::error::{EditError, PathError};
use crate::path::PackedPath;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// The four drag behaviors, picked by modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BehaviorName {
    Default,
    Constrain,
    Alternate,
    AlternateConstrain,
}

/// Indexed by `constrain + 2 * alternate`
const BEHAVIOR_NAMES: [BehaviorName; 4] = [
    BehaviorName::Default,
    BehaviorName::Constrain,
    BehaviorName::Alternate,
    BehaviorName::AlternateConstrain,
];

impl BehaviorName {
    /// Shift constrains, alt selects the alternate behavior
    pub fn from_modifiers(mods: Modifiers) -> Self {
        BEHAVIOR_NAMES[usize::from(mods.shift) + 2 * usize::from(mods.alt)]
    }

    /// Whether motion is locked to the dominant axis
    pub fn is_constrained(self) -> bool {
        matches!(self, BehaviorName::Constrain | BehaviorName::AlternateConstrain)
    }

    /// Whether opposite handles are mirrored instead of rotated
    pub fn is_alternate(self) -> bool {
        matches!(self, BehaviorName::Alternate | BehaviorName::AlternateConstrain)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorName::Default => "default",
            BehaviorName::Constrain => "constrain",
            BehaviorName::Alternate => "alternate",
            BehaviorName::AlternateConstrain => "alternate-constrain",
        }
    }
}

impl fmt::Display for BehaviorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one point responds to the drag delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveRule {
    /// Moves by the full delta
    Free,
    /// Moves by the delta, then is projected onto the line through the
    /// smooth point `anchor` set by the on-curve point `reference`
    Tangent { anchor: usize, reference: usize },
    /// Follows the handle `driver` on the other side of the smooth point
    /// `anchor`
    Opposite { anchor: usize, driver: usize },
}

/// Builds the behaviors for one drag gesture
#[derive(Debug, Clone)]
pub struct EditBehaviorFactory {
    baseline: Arc<GlyphInstance>,
    rules: Arc<BTreeMap<usize, MoveRule>>,
    components: Arc<Vec<usize>>,
    round: bool,
}

impl EditBehaviorFactory {
    /// Capture the baseline and derive movement rules for `selection`
    ///
    /// Fails if the selection is empty, or names a point or component the
    /// instance does not have.
    pub fn new(instance: &GlyphInstance, selection: &Selection) -> Result<Self, EditError> {
        if selection.is_empty() {
            return Err(EditError::NoEditTarget);
        }
        let num_points = instance.path.num_points();
        let selected: BTreeSet<usize> = selection.point_indices().collect();
        if let Some(&index) = selected.iter().find(|&&i| i >= num_points) {
            return Err(PathError::IndexOutOfRange {
                index,
                len: num_points,
            }
            .into());
        }
        let components: Vec<usize> = selection.component_indices().collect();
        let num_components = instance.components.len();
        if let Some(&index) = components.iter().find(|&&i| i >= num_components) {
            return Err(EditError::ComponentOutOfRange {
                index,
                len: num_components,
            });
        }

        let rules = derive_rules(&instance.path, &selected);
        tracing::debug!(
            "behavior factory: {} selected points, {} affected, {} components",
            selected.len(),
            rules.len(),
            components.len()
        );
        Ok(Self {
            baseline: Arc::new(instance.clone()),
            rules: Arc::new(rules),
            components: Arc::new(components),
            round: false,
        })
    }

    /// Round produced coordinates to whole units
    pub fn with_rounding(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    /// The instance as it was when the gesture started
    pub fn baseline(&self) -> &GlyphInstance {
        &self.baseline
    }

    pub fn behavior(&self, name: BehaviorName) -> EditBehavior {
        let path = &self.baseline.path;
        let mut rollback = ChangeSet::new();
        for &index in self.rules.keys() {
            if let Some(point) = path.position(index) {
                rollback.push(Change::SetPointPosition { index, point });
            }
        }
        for &index in self.components.iter() {
            if let Some(component) = self.baseline.components.get(index) {
                rollback.push(Change::SetComponentOffset {
                    index,
                    offset: component.offset,
                });
            }
        }
        EditBehavior {
            name,
            baseline: Arc::clone(&self.baseline),
            rules: Arc::clone(&self.rules),
            components: Arc::clone(&self.components),
            round: self.round,
            rollback,
        }
    }
}

/// Maps drag deltas to changes for one behavior
#[derive(Debug, Clone)]
pub struct EditBehavior {
    name: BehaviorName,
    baseline: Arc<GlyphInstance>,
    rules: Arc<BTreeMap<usize, MoveRule>>,
    components: Arc<Vec<usize>>,
    round: bool,
    rollback: ChangeSet,
}

impl EditBehavior {
    pub fn name(&self) -> BehaviorName {
        self.name
    }

    /// Restores every point and component this behavior can move
    pub fn rollback_change(&self) -> &ChangeSet {
        &self.rollback
    }

    /// The change that moves the baseline by `delta`
    pub fn make_change_for_delta(&self, delta: Vec2) -> ChangeSet {
        let delta = if self.name.is_constrained() {
            constrain_delta(delta)
        } else {
            delta
        };
        let path = &self.baseline.path;

        let mut moved: BTreeMap<usize, Point> = BTreeMap::new();
        for (&index, rule) in self.rules.iter() {
            if let (MoveRule::Free | MoveRule::Tangent { .. }, Some(base)) =
                (rule, path.position(index))
            {
                moved.insert(index, base + delta);
            }
        }

        let position = |moved: &BTreeMap<usize, Point>, index: usize| {
            moved.get(&index).copied().or_else(|| path.position(index))
        };

        for (&index, rule) in self.rules.iter() {
            if let MoveRule::Tangent { anchor, reference } = *rule
                && let (Some(anchor), Some(reference), Some(handle)) = (
                    position(&moved, anchor),
                    position(&moved, reference),
                    moved.get(&index).copied(),
                )
            {
                moved.insert(index, smooth::project_on_tangent(reference, anchor, handle));
            }
        }

        for (&index, rule) in self.rules.iter() {
            if let MoveRule::Opposite { anchor, driver } = *rule
                && let (Some(anchor), Some(driver), Some(base)) = (
                    position(&moved, anchor),
                    position(&moved, driver),
                    path.position(index),
                )
            {
                let p = if self.name.is_alternate() {
                    smooth::mirror_opposite(anchor, driver)
                } else {
                    smooth::rotate_opposite(anchor, driver, base)
                };
                moved.insert(index, p);
            }
        }

        let mut change: ChangeSet = moved
            .into_iter()
            .map(|(index, point)| Change::SetPointPosition {
                index,
                point: self.finish_point(point),
            })
            .collect();
        for &index in self.components.iter() {
            if let Some(component) = self.baseline.components.get(index) {
                let offset = self.finish_point((component.offset + delta).to_point());
                change.push(Change::SetComponentOffset {
                    index,
                    offset: offset.to_vec2(),
                });
            }
        }
        change
    }

    fn finish_point(&self, p: Point) -> Point {
        if self.round { smooth::round_point(p) } else { p }
    }
}

/// Keep the larger axis of `delta`, zero the other
fn constrain_delta(delta: Vec2) -> Vec2 {
    if delta.x.abs() >= delta.y.abs() {
        Vec2::new(delta.x, 0.0)
    } else {
        Vec2::new(0.0, delta.y)
    }
}

fn derive_rules(path: &PackedPath, selected: &BTreeSet<usize>) -> BTreeMap<usize, MoveRule> {
    // Selected points plus the handles of selected on-curve points
    let mut moving = selected.clone();
    for &index in selected {
        if !path.point(index).is_some_and(|p| p.is_on_curve()) {
            continue;
        }
        let neighbors = path.neighbor_points(index);
        for (j, q) in [neighbors.prev, neighbors.next].into_iter().flatten() {
            if q.is_off_curve() {
                moving.insert(j);
            }
        }
    }

    let mut rules: BTreeMap<usize, MoveRule> =
        moving.iter().map(|&i| (i, MoveRule::Free)).collect();

    // Moving handles next to a smooth point that stays put
    for &handle in &moving {
        if !path.point(handle).is_some_and(|p| p.is_off_curve()) {
            continue;
        }
        let neighbors = path.neighbor_points(handle);
        for (anchor, anchor_point) in [neighbors.prev, neighbors.next].into_iter().flatten() {
            if !(anchor_point.is_on_curve() && anchor_point.smooth) || moving.contains(&anchor) {
                continue;
            }
            let around = path.neighbor_points(anchor);
            let other = if around.prev.is_some_and(|(j, _)| j == handle) {
                around.next
            } else {
                around.prev
            };
            let Some((other, other_point)) = other else {
                break;
            };
            if other_point.is_on_curve() {
                rules.insert(
                    handle,
                    MoveRule::Tangent {
                        anchor,
                        reference: other,
                    },
                );
            } else if !moving.contains(&other) {
                rules.entry(other).or_insert(MoveRule::Opposite {
                    anchor,
                    driver: handle,
                });
            }
            break;
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::instance::Component;
    use crate::path::PointType;

    const EPSILON: f64 = 1e-9;

    /// Closed contour with a smooth point (3) between two cubic handles
    fn s_curve() -> GlyphInstance {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.curve_to(0.0, 10.0, 10.0, 20.0, 20.0, 20.0).unwrap();
        path.curve_to(30.0, 20.0, 40.0, 10.0, 40.0, 0.0).unwrap();
        path.close_path().unwrap();
        path.set_point_type(3, PointType::OnCurve, true).unwrap();
        GlyphInstance::new(path).with_components(vec![Component::new("dot", Vec2::new(5.0, 5.0))])
    }

    /// Open contour: line into a smooth point (1), then a cubic
    fn line_into_curve() -> GlyphInstance {
        let mut path = PackedPath::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0).unwrap();
        path.curve_to(20.0, 0.0, 30.0, 10.0, 30.0, 20.0).unwrap();
        path.set_point_type(1, PointType::OnCurve, true).unwrap();
        GlyphInstance::new(path)
    }

    fn select(tokens: &[&str]) -> Selection {
        Selection::from_tokens(tokens).unwrap()
    }

    fn moved_to(change: &ChangeSet, index: usize) -> Option<Point> {
        change.iter().find_map(|c| match c {
            Change::SetPointPosition { index: i, point } if *i == index => Some(*point),
            _ => None,
        })
    }

    #[test]
    fn behavior_names_follow_modifier_table() {
        assert_eq!(BehaviorName::from_modifiers(Modifiers::NONE), BehaviorName::Default);
        assert_eq!(BehaviorName::from_modifiers(Modifiers::SHIFT), BehaviorName::Constrain);
        assert_eq!(BehaviorName::from_modifiers(Modifiers::ALT), BehaviorName::Alternate);
        let both = Modifiers {
            shift: true,
            alt: true,
            ..Modifiers::NONE
        };
        assert_eq!(
            BehaviorName::from_modifiers(both),
            BehaviorName::AlternateConstrain
        );
        assert_eq!(BehaviorName::AlternateConstrain.to_string(), "alternate-constrain");
    }

    #[test]
    fn selected_on_curve_drags_its_handles() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/3"])).unwrap();
        let change = factory
            .behavior(BehaviorName::Default)
            .make_change_for_delta(Vec2::new(5.0, 0.0));

        assert_eq!(change.len(), 3);
        assert_eq!(moved_to(&change, 2), Some(Point::new(15.0, 20.0)));
        assert_eq!(moved_to(&change, 3), Some(Point::new(25.0, 20.0)));
        assert_eq!(moved_to(&change, 4), Some(Point::new(35.0, 20.0)));
        assert_eq!(moved_to(&change, 0), None);
    }

    #[test]
    fn dragging_one_handle_rotates_the_other() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/2"])).unwrap();
        let change = factory
            .behavior(BehaviorName::Default)
            .make_change_for_delta(Vec2::new(0.0, 5.0));

        let anchor = Point::new(20.0, 20.0);
        let dragged = moved_to(&change, 2).unwrap();
        let opposite = moved_to(&change, 4).unwrap();
        assert_eq!(dragged, Point::new(10.0, 25.0));
        let (a, b) = (dragged - anchor, opposite - anchor);
        assert!((a.x * b.y - a.y * b.x).abs() < EPSILON);
        assert!(a.dot(b) < 0.0);
        assert!(((opposite - anchor).hypot() - 10.0).abs() < EPSILON);
    }

    #[test]
    fn alternate_mirrors_the_other_handle() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/2"])).unwrap();
        let change = factory
            .behavior(BehaviorName::Alternate)
            .make_change_for_delta(Vec2::new(0.0, 5.0));
        assert_eq!(moved_to(&change, 4), Some(Point::new(30.0, 15.0)));
    }

    #[test]
    fn handle_against_line_slides_on_tangent() {
        let glyph = line_into_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/2"])).unwrap();
        let change = factory
            .behavior(BehaviorName::Default)
            .make_change_for_delta(Vec2::new(3.0, 4.0));
        let p = moved_to(&change, 2).unwrap();
        assert!((p - Point::new(23.0, 0.0)).hypot() < EPSILON);
        assert_eq!(change.len(), 1);
    }

    #[test]
    fn constrain_keeps_dominant_axis() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/0"])).unwrap();
        let change = factory
            .behavior(BehaviorName::Constrain)
            .make_change_for_delta(Vec2::new(5.0, 2.0));
        assert_eq!(moved_to(&change, 0), Some(Point::new(5.0, 0.0)));

        let change = factory
            .behavior(BehaviorName::AlternateConstrain)
            .make_change_for_delta(Vec2::new(1.0, -7.0));
        assert_eq!(moved_to(&change, 0), Some(Point::new(0.0, -7.0)));
    }

    #[test]
    fn components_move_with_delta() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["component/0"])).unwrap();
        let change = factory
            .behavior(BehaviorName::Default)
            .make_change_for_delta(Vec2::new(1.0, 2.0));
        assert_eq!(
            change,
            ChangeSet::from(vec![Change::SetComponentOffset {
                index: 0,
                offset: Vec2::new(6.0, 7.0)
            }])
        );
    }

    #[test]
    fn rollback_restores_baseline() {
        let glyph = s_curve();
        let factory =
            EditBehaviorFactory::new(&glyph, &select(&["point/2", "component/0"])).unwrap();
        for name in BEHAVIOR_NAMES {
            let behavior = factory.behavior(name);
            let mut live = glyph.clone();
            behavior
                .make_change_for_delta(Vec2::new(7.0, -3.0))
                .apply(&mut live)
                .unwrap();
            assert_ne!(live, glyph);
            behavior.rollback_change().apply(&mut live).unwrap();
            assert_eq!(live, glyph);
        }
    }

    #[test]
    fn changes_are_deterministic() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/2"])).unwrap();
        let behavior = factory.behavior(BehaviorName::Default);
        let delta = Vec2::new(2.5, 1.5);
        assert_eq!(
            behavior.make_change_for_delta(delta),
            behavior.make_change_for_delta(delta)
        );
    }

    #[test]
    fn rounding_applies_to_output() {
        let glyph = s_curve();
        let factory = EditBehaviorFactory::new(&glyph, &select(&["point/0"]))
            .unwrap()
            .with_rounding(true);
        let change = factory
            .behavior(BehaviorName::Default)
            .make_change_for_delta(Vec2::new(0.6, 1.4));
        assert_eq!(moved_to(&change, 0), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let glyph = s_curve();
        assert_eq!(
            EditBehaviorFactory::new(&glyph, &select(&["point/99"])).unwrap_err(),
            EditError::Path(PathError::IndexOutOfRange { index: 99, len: 7 })
        );
        assert_eq!(
            EditBehaviorFactory::new(&glyph, &select(&["component/1"])).unwrap_err(),
            EditError::ComponentOutOfRange { index: 1, len: 1 }
        );
    }

    #[test]
    fn empty_selection_has_no_edit_target() {
        assert_eq!(
            EditBehaviorFactory::new(&s_curve(), &Selection::new()).unwrap_err(),
            EditError::NoEditTarget
        );
    }
}
