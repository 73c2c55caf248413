// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Touch targets never share a pointer and never keep a pointer that went up.
//!
//! Without splitting, one target owns every pointer for the whole gesture.

use kinetic_motion::{Action, MotionEvent, Pointer, PointerId, PointerIdBits};
use kinetic_view::{LocalView, PlainView, ViewContext, ViewHandler, ViewId, ViewTree};
use kurbo::{Point, Rect};
use proptest::prelude::*;

struct Sink;

impl ViewHandler for Sink {
    fn on_touch_event(&mut self, _cx: &mut ViewContext<'_>, _event: &MotionEvent) -> bool {
        true
    }
}

/// A 200x200 window split into four 100x100 quadrants, in `quadrant_point` order.
fn quadrants() -> (ViewTree, ViewId, Vec<ViewId>) {
    let mut tree = ViewTree::new();
    let root = tree
        .insert_group(
            None,
            LocalView::with_frame(Rect::new(0.0, 0.0, 200.0, 200.0)),
            Box::new(PlainView),
        )
        .unwrap();
    let children = [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]
        .into_iter()
        .map(|(x, y)| {
            tree.insert(
                Some(root),
                LocalView::with_frame(Rect::new(x, y, x + 100.0, y + 100.0)),
                Box::new(Sink),
            )
            .unwrap()
        })
        .collect();
    (tree, root, children)
}

fn quadrant_point(quadrant: u8) -> Point {
    Point::new(
        50.0 + 100.0 * f64::from(quadrant % 2),
        50.0 + 100.0 * f64::from(quadrant / 2),
    )
}

fn check_ownership(tree: &ViewTree, root: ViewId, live: PointerIdBits) {
    let targets = tree.touch_targets(root);
    let mut union = PointerIdBits::NONE;
    let mut total = 0;
    for (_, bits) in &targets {
        assert!(!bits.is_empty(), "targets without pointers are dropped");
        union |= *bits;
        total += bits.count();
    }
    assert_eq!(total, union.count(), "a pointer is owned by one target: {targets:?}");
    assert_eq!(union.without(live), PointerIdBits::NONE, "{union:?} outside {live:?}");
}

/// Plays press/release/move steps as a multi-pointer gesture stream, calling `check` with the
/// pointers still down after each dispatched event.
fn replay(
    tree: &mut ViewTree,
    root: ViewId,
    ops: Vec<(bool, PointerId, u8)>,
    mut check: impl FnMut(&ViewTree, &[(PointerId, Point)]),
) {
    let mut down: Vec<(PointerId, Point)> = Vec::new();
    let mut time = 0;

    for (press, id, quadrant) in ops {
        time += 8;
        let index = down.iter().position(|(p, _)| *p == id);
        let action = match (press, index) {
            (true, None) => {
                down.push((id, quadrant_point(quadrant)));
                if down.len() == 1 { Action::Down } else { Action::PointerDown(down.len() - 1) }
            }
            (false, Some(index)) => {
                if down.len() == 1 { Action::Up } else { Action::PointerUp(index) }
            }
            // Pressing a pointer that is down moves it instead.
            (true, Some(index)) => {
                down[index].1 = quadrant_point(quadrant);
                Action::Move
            }
            (false, None) => continue,
        };
        let pointers: Vec<_> = down
            .iter()
            .map(|(p, at)| Pointer::new(*p, at.x, at.y))
            .collect();
        let event = MotionEvent::try_new(action, 0, time, &pointers).unwrap();
        tree.dispatch_touch_event(root, &event);

        if matches!(action, Action::Up | Action::PointerUp(_)) {
            down.retain(|(p, _)| *p != id);
        }
        check(tree, &down);
    }
}

fn gesture() -> impl Strategy<Value = Vec<(bool, PointerId, u8)>> {
    prop::collection::vec((any::<bool>(), 0_u32..4, 0_u8..4), 1..40)
}

proptest! {
    #[test]
    fn pointers_have_at_most_one_owner(ops in gesture()) {
        let (mut tree, root, _) = quadrants();
        replay(&mut tree, root, ops, |tree, down| {
            let live: PointerIdBits = down.iter().map(|(p, _)| *p).collect();
            check_ownership(tree, root, live);
            if down.is_empty() {
                assert!(tree.touch_targets(root).is_empty(), "gesture over");
            }
        });
    }

    #[test]
    fn without_splitting_first_target_owns_everything(ops in gesture()) {
        let (mut tree, root, children) = quadrants();
        tree.set_motion_event_splitting_enabled(root, false);
        let mut first: Option<ViewId> = None;
        replay(&mut tree, root, ops, |tree, down| {
            let targets = tree.touch_targets(root);
            if down.is_empty() {
                first = None;
                assert!(targets.is_empty(), "gesture over: {targets:?}");
                return;
            }
            let owner = *first.get_or_insert_with(|| {
                let quadrant = quadrant_at(down[0].1);
                children[quadrant]
            });
            assert_eq!(targets.as_slice(), &[(owner, PointerIdBits::ALL)]);
        });
    }
}

/// Index of the quadrant containing `at`.
fn quadrant_at(at: Point) -> usize {
    usize::from(at.x >= 100.0) + 2 * usize::from(at.y >= 100.0)
}
