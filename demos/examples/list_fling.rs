// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Replay a quick upward swipe on a list and print the fling frame by frame.
//!
//! A 400x400 window holds a list of 50 rows, 40 px each, starting at row 5. The swipe moves
//! the finger up at 3 px/ms; on release the list flings to its end and bounces back from the
//! over-fling.
//!
//! Run:
//! - `cargo run -p kinetic_demos --example list_fling`
//! - `RUST_LOG=kinetic_list=debug,kinetic_scroller=trace cargo run -p kinetic_demos --example list_fling`

use kinetic_list::{FixedExtentModel, ListView, VecAdapter};
use kinetic_motion::{Action, MotionEvent};
use kinetic_scroller::{AnimationClock, ManualClock, ScrollConfig};
use kinetic_view::{LocalView, PlainView, ViewTree};
use kurbo::{Point, Rect};
use tracing_subscriber::EnvFilter;

type Rows = ListView<VecAdapter<String>, FixedExtentModel, ManualClock>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let clock = ManualClock::new(0);
    let bounds = Rect::new(0.0, 0.0, 400.0, 400.0);
    let mut tree = ViewTree::new();
    let window = tree
        .insert_group(None, LocalView::with_frame(bounds), Box::new(PlainView))
        .unwrap();
    let rows = Rows::with_clock(
        (0..50).map(|i| format!("Row {i}")).collect(),
        FixedExtentModel::new(50, 40),
        ScrollConfig::default(),
        clock.clone(),
    );
    let list = tree
        .insert_group(
            Some(window),
            LocalView::with_frame(bounds).with_tag(10),
            Box::new(rows),
        )
        .unwrap();
    tree.with_view(list, |rows: &mut Rows, cx| rows.set_selection_from_top(cx, 5, 0));

    // Swipe up from the middle of the window.
    let mut y = 300.0;
    let send = |tree: &mut ViewTree, action: Action, y: f64| {
        let event = MotionEvent::single(action, 0, clock.now_millis(), Point::new(200.0, y));
        tree.dispatch_touch_event(window, &event);
    };
    send(&mut tree, Action::Down, y);
    for _ in 0..8 {
        clock.advance(8);
        y -= 24.0;
        send(&mut tree, Action::Move, y);
    }
    clock.advance(8);
    send(&mut tree, Action::Up, y);

    let report = |tree: &ViewTree, frame: usize| {
        let rows = tree.handler::<Rows>(list).unwrap();
        let (_, scroll) = tree.scroll(list).unwrap();
        let strip = rows.visible_strip();
        let first = rows
            .first_visible_position()
            .and_then(|p| rows.adapter().get(p))
            .map_or("-", String::as_str);
        println!(
            "frame {frame:3}: scroll {scroll:5}  rows {:2}..{:2}  top \"{first}\"  {:7.1} px/s",
            strip.start,
            strip.end,
            rows.scroller().curr_velocity(),
        );
    };

    report(&tree, 0);
    let mut frame = 0;
    while tree.run_animation_frame() {
        clock.advance(16);
        frame += 1;
        report(&tree, frame);
    }
    let damage = tree.take_damage();
    println!("settled after {frame} frames; damage {:?}", damage.union_rect());
}
