// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A header that collapses while the list below it scrolls.
//!
//! The window scrolls its own content, a 100 px header above a list, through nested
//! scrolling: the list offers every drag step to the window first, which spends half of it on
//! hiding the header. The list scrolls by the rest, and by all of it once the header is gone.
//! Dragging back down, the list scrolls to its top first and hands the rest back to the window,
//! which shows the header again.
//!
//! Run:
//! - `cargo run -p kinetic_demos --example collapsing_header`

use kinetic_list::{FixedExtentModel, ListView, VecAdapter};
use kinetic_motion::{Action, MotionEvent};
use kinetic_scroller::{AnimationClock, ManualClock, ScrollConfig};
use kinetic_view::{LocalView, PlainView, ScrollAxes, ViewContext, ViewHandler, ViewId, ViewTree};
use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;

type Rows = ListView<VecAdapter<u32>, FixedExtentModel, ManualClock>;

const HEADER_HEIGHT: i32 = 100;

/// Scrolls between showing and hiding the header, fed by its nested-scrolling children.
struct CollapsingWindow;

impl CollapsingWindow {
    fn scroll_header(cx: &mut ViewContext<'_>, dy: i32) -> i32 {
        let (x, y) = cx.scroll();
        let target = (y + dy).clamp(0, HEADER_HEIGHT);
        cx.scroll_to(x, target);
        target - y
    }
}

impl ViewHandler for CollapsingWindow {
    fn on_start_nested_scroll(
        &mut self,
        _cx: &mut ViewContext<'_>,
        _child: ViewId,
        _target: ViewId,
        axes: ScrollAxes,
    ) -> bool {
        axes.contains(ScrollAxes::VERTICAL)
    }

    fn on_nested_pre_scroll(
        &mut self,
        cx: &mut ViewContext<'_>,
        _target: ViewId,
        _dx: i32,
        dy: i32,
        consumed: &mut [i32; 2],
    ) {
        // The header hides at half the finger's speed.
        if dy > 0 {
            consumed[1] = Self::scroll_header(cx, dy / 2);
        }
    }

    fn on_nested_scroll(
        &mut self,
        cx: &mut ViewContext<'_>,
        _target: ViewId,
        _dx_consumed: i32,
        _dy_consumed: i32,
        _dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) {
        // The list is at its top: pull the header back in.
        if dy_unconsumed < 0 {
            Self::scroll_header(cx, dy_unconsumed);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clock = ManualClock::new(0);
    let mut tree = ViewTree::new();
    let window = tree
        .insert_group(
            None,
            LocalView::with_frame(Rect::new(0.0, 0.0, 400.0, 400.0)),
            Box::new(CollapsingWindow),
        )
        .unwrap();
    tree.insert(
        Some(window),
        LocalView::with_frame(Rect::new(0.0, 0.0, 400.0, 100.0)),
        Box::new(PlainView),
    )
    .unwrap();
    // Tall enough to fill the window once the header is hidden.
    let list = tree
        .insert_group(
            Some(window),
            LocalView::with_frame(Rect::new(0.0, 100.0, 400.0, 500.0)),
            Box::new(Rows::with_clock(
                (0..30).collect(),
                FixedExtentModel::new(30, 40),
                ScrollConfig::default(),
                clock.clone(),
            )),
        )
        .unwrap();
    tree.set_nested_scrolling_enabled(list, true);
    tree.run_animation_frame();

    let drag = |tree: &mut ViewTree, steps: &[f64]| {
        let down = clock.now_millis();
        let send = |tree: &mut ViewTree, action, y| {
            let event = MotionEvent::single(action, down, clock.now_millis(), Point::new(200.0, y));
            tree.dispatch_touch_event(window, &event);
        };
        send(tree, Action::Down, steps[0]);
        for y in &steps[1..] {
            // Slow enough that release does not fling.
            clock.advance(100);
            send(tree, Action::Move, *y);
            report(tree, window, list);
        }
        clock.advance(100);
        send(tree, Action::Up, steps[steps.len() - 1]);
    };

    println!("drag up");
    drag(&mut tree, &[380.0, 340.0, 300.0, 260.0, 220.0, 180.0]);
    println!("drag down");
    drag(&mut tree, &[180.0, 220.0, 260.0, 300.0, 340.0, 380.0]);
}

fn report(tree: &ViewTree, window: ViewId, list: ViewId) {
    let (_, header_hidden) = tree.scroll(window).unwrap();
    let (_, list_scroll) = tree.scroll(list).unwrap();
    let first = tree
        .handler::<Rows>(list)
        .and_then(Rows::first_visible_position)
        .unwrap_or(0);
    println!(
        "  header hidden {header_hidden:3} px  list scroll {list_scroll:4}  first row {first:2}  list top at {:?}",
        tree.location_in_window(list),
    );
}
