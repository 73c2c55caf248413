// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Motion event values: action, pointers, history, and coordinate transforms.

use kurbo::{Affine, Point, Vec2};
use smallvec::SmallVec;

use crate::error::{MotionError, Result};
use crate::pointer::{MAX_POINTER_ID, PointerId, PointerIdBits};

/// What happened in a motion event.
///
/// `PointerDown` and `PointerUp` carry the index (not the id) of the pointer that went down or
/// up; every other action applies to the event as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// First pointer went down; starts a gesture.
    Down,
    /// Last pointer went up; ends a gesture.
    Up,
    /// One or more pointers moved.
    Move,
    /// The gesture was aborted; no further events for it follow.
    Cancel,
    /// The gesture happened outside the receiver's bounds.
    Outside,
    /// A non-primary pointer went down, at the given pointer index.
    PointerDown(usize),
    /// A non-primary pointer went up, at the given pointer index.
    PointerUp(usize),
    /// A hovering pointer moved.
    HoverMove,
    /// A hovering pointer entered the receiver.
    HoverEnter,
    /// A hovering pointer left the receiver.
    HoverExit,
    /// A scroll wheel or similar moved.
    Scroll,
    /// A button was pressed.
    ButtonPress,
    /// A button was released.
    ButtonRelease,
}

impl Action {
    /// Index of the pointer the action applies to; `0` for whole-event actions.
    pub const fn index(self) -> usize {
        match self {
            Self::PointerDown(index) | Self::PointerUp(index) => index,
            _ => 0,
        }
    }

    /// Returns `true` for hover enter, move, and exit.
    pub const fn is_hover(self) -> bool {
        matches!(self, Self::HoverEnter | Self::HoverMove | Self::HoverExit)
    }
}

bitflags::bitflags! {
    /// Device class that produced an event.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Source: u32 {
        /// Events carry pointer positions in display coordinates.
        const CLASS_POINTER = 0x0000_0002;
        /// A touch screen.
        const TOUCHSCREEN   = 0x0000_1000 | Self::CLASS_POINTER.bits();
        /// A mouse.
        const MOUSE         = 0x0000_2000 | Self::CLASS_POINTER.bits();
        /// A stylus.
        const STYLUS        = 0x0000_4000 | Self::CLASS_POINTER.bits();
    }
}

bitflags::bitflags! {
    /// Per-event flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventFlags: u32 {
        /// A hover enter is being delivered while the matching exit has not been delivered yet.
        const HOVER_EXIT_PENDING = 0x0000_0004;
    }
}

/// One pointer in an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pointer {
    /// Gesture-stable id.
    pub id: PointerId,
    /// Position in the receiver's coordinates.
    pub position: Point,
}

impl Pointer {
    /// Creates a pointer at `(x, y)`.
    pub const fn new(id: PointerId, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Earlier positions batched into a move event, oldest first.
#[derive(Clone, Debug, PartialEq)]
struct HistoricalSample {
    event_time: i64,
    positions: SmallVec<[Point; 4]>,
}

/// A pointer event: action, timing, device, and pointer positions.
///
/// Positions are relative to whoever currently holds the event. Dispatch moves an event between
/// coordinate spaces with [`offset_location`](Self::offset_location) and
/// [`transform`](Self::transform).
#[derive(Clone, Debug, PartialEq)]
pub struct MotionEvent {
    action: Action,
    down_time: i64,
    event_time: i64,
    source: Source,
    flags: EventFlags,
    button_state: u32,
    pointers: SmallVec<[Pointer; 4]>,
    history: Vec<HistoricalSample>,
}

impl MotionEvent {
    /// Builds an event after validating pointer ids and the action index.
    pub fn try_new(
        action: Action,
        down_time: i64,
        event_time: i64,
        pointers: &[Pointer],
    ) -> Result<Self> {
        if pointers.is_empty() {
            return Err(MotionError::NoPointers);
        }
        let mut seen = PointerIdBits::NONE;
        for pointer in pointers {
            if pointer.id > MAX_POINTER_ID {
                return Err(MotionError::InvalidPointerId(pointer.id));
            }
            if seen.contains_id(pointer.id) {
                return Err(MotionError::DuplicatePointerId(pointer.id));
            }
            seen |= PointerIdBits::from_id(pointer.id);
        }
        if action.index() >= pointers.len() {
            return Err(MotionError::ActionIndexOutOfRange {
                index: action.index(),
                count: pointers.len(),
            });
        }
        Ok(Self {
            action,
            down_time,
            event_time,
            source: Source::TOUCHSCREEN,
            flags: EventFlags::empty(),
            button_state: 0,
            pointers: SmallVec::from_slice(pointers),
            history: Vec::new(),
        })
    }

    /// Builds a single-pointer event for pointer id 0.
    ///
    /// `action` must not index beyond pointer 0.
    pub fn single(action: Action, down_time: i64, event_time: i64, position: Point) -> Self {
        debug_assert!(action.index() == 0, "single-pointer events index pointer 0");
        Self {
            action,
            down_time,
            event_time,
            source: Source::TOUCHSCREEN,
            flags: EventFlags::empty(),
            button_state: 0,
            pointers: SmallVec::from_slice(&[Pointer { id: 0, position }]),
            history: Vec::new(),
        }
    }

    /// Returns the event with its source replaced.
    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Returns the event with its button state replaced.
    #[must_use]
    pub fn with_button_state(mut self, button_state: u32) -> Self {
        self.button_state = button_state;
        self
    }

    /// Appends a batched earlier sample with one position per pointer.
    pub fn add_history(&mut self, event_time: i64, positions: &[Point]) -> Result<()> {
        if positions.len() != self.pointers.len() {
            return Err(MotionError::HistoryLengthMismatch {
                got: positions.len(),
                expected: self.pointers.len(),
            });
        }
        self.history.push(HistoricalSample {
            event_time,
            positions: SmallVec::from_slice(positions),
        });
        Ok(())
    }

    /// The action.
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Replaces the action. Used by dispatch to turn an event into a cancel.
    pub fn set_action(&mut self, action: Action) {
        self.action = action;
    }

    /// Time the gesture started, in milliseconds.
    pub const fn down_time(&self) -> i64 {
        self.down_time
    }

    /// Time of this event, in milliseconds.
    pub const fn event_time(&self) -> i64 {
        self.event_time
    }

    /// Producing device class.
    pub const fn source(&self) -> Source {
        self.source
    }

    /// Returns `true` if the source reports pointer positions.
    pub const fn is_pointer_event(&self) -> bool {
        self.source.contains(Source::CLASS_POINTER)
    }

    /// Pressed buttons.
    pub const fn button_state(&self) -> u32 {
        self.button_state
    }

    /// Per-event flags.
    pub const fn flags(&self) -> EventFlags {
        self.flags
    }

    /// Returns `true` if a hover exit for the previous target is still pending.
    pub const fn is_hover_exit_pending(&self) -> bool {
        self.flags.contains(EventFlags::HOVER_EXIT_PENDING)
    }

    /// Sets or clears [`EventFlags::HOVER_EXIT_PENDING`].
    pub fn set_hover_exit_pending(&mut self, pending: bool) {
        self.flags.set(EventFlags::HOVER_EXIT_PENDING, pending);
    }

    /// Number of pointers.
    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// The pointers, in index order.
    pub fn pointers(&self) -> &[Pointer] {
        &self.pointers
    }

    /// Id of the pointer at `index`, if any.
    pub fn pointer_id(&self, index: usize) -> Option<PointerId> {
        self.pointers.get(index).map(|p| p.id)
    }

    /// Index of the pointer with `id`, if present.
    pub fn find_pointer_index(&self, id: PointerId) -> Option<usize> {
        self.pointers.iter().position(|p| p.id == id)
    }

    /// Set of all pointer ids in the event.
    pub fn pointer_id_bits(&self) -> PointerIdBits {
        self.pointers.iter().map(|p| p.id).collect()
    }

    /// Position of the pointer at `index`.
    ///
    /// An out-of-range index is logged and yields the origin.
    pub fn point_at(&self, index: usize) -> Point {
        match self.pointers.get(index) {
            Some(pointer) => pointer.position,
            None => {
                tracing::error!(index, count = self.pointers.len(), "pointer index out of range");
                Point::ZERO
            }
        }
    }

    /// X of the pointer at `index`.
    pub fn x_at(&self, index: usize) -> f64 {
        self.point_at(index).x
    }

    /// Y of the pointer at `index`.
    pub fn y_at(&self, index: usize) -> f64 {
        self.point_at(index).y
    }

    /// X of the first pointer.
    pub fn x(&self) -> f64 {
        self.x_at(0)
    }

    /// Y of the first pointer.
    pub fn y(&self) -> f64 {
        self.y_at(0)
    }

    /// Position that decides the receiving child for this event.
    ///
    /// This is the acting pointer for `PointerDown`/`PointerUp` and the first pointer otherwise.
    pub fn dispatch_location(&self) -> Point {
        self.point_at(self.action.index())
    }

    /// Number of batched historical samples.
    pub fn history_size(&self) -> usize {
        self.history.len()
    }

    /// Time of historical sample `pos`.
    pub fn historical_event_time(&self, pos: usize) -> Option<i64> {
        self.history.get(pos).map(|h| h.event_time)
    }

    /// Position of pointer `index` in historical sample `pos`.
    pub fn historical_point(&self, index: usize, pos: usize) -> Option<Point> {
        self.history.get(pos)?.positions.get(index).copied()
    }

    /// Returns a copy with the batched history dropped.
    #[must_use]
    pub fn without_history(&self) -> Self {
        if self.history.is_empty() {
            return self.clone();
        }
        Self {
            history: Vec::new(),
            ..self.clone()
        }
    }

    /// Translates every position, current and historical, by `(dx, dy)`.
    pub fn offset_location(&mut self, dx: f64, dy: f64) {
        let delta = Vec2::new(dx, dy);
        for pointer in &mut self.pointers {
            pointer.position += delta;
        }
        for sample in &mut self.history {
            for position in &mut sample.positions {
                *position += delta;
            }
        }
    }

    /// Applies `transform` to every position, current and historical.
    pub fn transform(&mut self, transform: Affine) {
        for pointer in &mut self.pointers {
            pointer.position = transform * pointer.position;
        }
        for sample in &mut self.history {
            for position in &mut sample.positions {
                *position = transform * *position;
            }
        }
    }

    /// Returns a copy restricted to the pointers in `bits`.
    ///
    /// The action is rewritten for the subset: a pointer going down or up that is not in the
    /// subset becomes a `Move`; if it is the only pointer left it becomes `Down` or `Up`;
    /// otherwise its index is remapped.
    pub fn split(&self, bits: PointerIdBits) -> Result<Self> {
        let old_action_index = self.action.index();
        let mut new_action_index = None;
        let mut pointers = SmallVec::<[Pointer; 4]>::new();
        let mut kept = SmallVec::<[usize; 4]>::new();
        for (i, pointer) in self.pointers.iter().enumerate() {
            if bits.contains_id(pointer.id) {
                if i == old_action_index {
                    new_action_index = Some(pointers.len());
                }
                pointers.push(*pointer);
                kept.push(i);
            }
        }
        if pointers.is_empty() {
            return Err(MotionError::EmptySplit(bits.bits()));
        }

        let action = match self.action {
            Action::PointerDown(_) | Action::PointerUp(_) => {
                let going_down = matches!(self.action, Action::PointerDown(_));
                match new_action_index {
                    // An unrelated pointer went down or up.
                    None => Action::Move,
                    Some(_) if pointers.len() == 1 => {
                        if going_down {
                            Action::Down
                        } else {
                            Action::Up
                        }
                    }
                    Some(index) if going_down => Action::PointerDown(index),
                    Some(index) => Action::PointerUp(index),
                }
            }
            other => other,
        };

        let history = self
            .history
            .iter()
            .map(|sample| HistoricalSample {
                event_time: sample.event_time,
                positions: kept.iter().map(|i| sample.positions[*i]).collect(),
            })
            .collect();

        Ok(Self {
            action,
            pointers,
            history,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_finger(action: Action) -> MotionEvent {
        MotionEvent::try_new(
            action,
            0,
            10,
            &[Pointer::new(0, 10.0, 10.0), Pointer::new(1, 300.0, 40.0)],
        )
        .unwrap()
    }

    #[test]
    fn try_new_validates_pointers() {
        assert_eq!(
            MotionEvent::try_new(Action::Down, 0, 0, &[]),
            Err(MotionError::NoPointers)
        );
        assert_eq!(
            MotionEvent::try_new(Action::Down, 0, 0, &[Pointer::new(32, 0.0, 0.0)]),
            Err(MotionError::InvalidPointerId(32))
        );
        assert_eq!(
            MotionEvent::try_new(
                Action::Move,
                0,
                0,
                &[Pointer::new(2, 0.0, 0.0), Pointer::new(2, 1.0, 1.0)]
            ),
            Err(MotionError::DuplicatePointerId(2))
        );
        assert_eq!(
            MotionEvent::try_new(Action::PointerDown(1), 0, 0, &[Pointer::new(0, 0.0, 0.0)]),
            Err(MotionError::ActionIndexOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn split_unrelated_pointer_down_becomes_move() {
        let event = two_finger(Action::PointerDown(1));
        let split = event.split(PointerIdBits::from_id(0)).unwrap();
        assert_eq!(split.action(), Action::Move);
        assert_eq!(split.pointer_count(), 1);
        assert_eq!(split.pointer_id(0), Some(0));
    }

    #[test]
    fn split_sole_pointer_becomes_down_or_up() {
        let down = two_finger(Action::PointerDown(1))
            .split(PointerIdBits::from_id(1))
            .unwrap();
        assert_eq!(down.action(), Action::Down);
        assert_eq!(down.point_at(0), Point::new(300.0, 40.0));

        let up = two_finger(Action::PointerUp(0))
            .split(PointerIdBits::from_id(0))
            .unwrap();
        assert_eq!(up.action(), Action::Up);
    }

    #[test]
    fn split_remaps_action_index() {
        let event = MotionEvent::try_new(
            Action::PointerUp(2),
            0,
            0,
            &[
                Pointer::new(0, 0.0, 0.0),
                Pointer::new(4, 1.0, 1.0),
                Pointer::new(7, 2.0, 2.0),
            ],
        )
        .unwrap();
        let bits: PointerIdBits = [4, 7].into_iter().collect();
        let split = event.split(bits).unwrap();
        assert_eq!(split.action(), Action::PointerUp(1));
        assert_eq!(split.pointer_id_bits(), bits);
    }

    #[test]
    fn split_by_foreign_bits_fails() {
        let event = two_finger(Action::Move);
        assert!(matches!(
            event.split(PointerIdBits::from_id(9)),
            Err(MotionError::EmptySplit(_))
        ));
    }

    #[test]
    fn offset_and_transform_touch_history() {
        let mut event = MotionEvent::single(Action::Move, 0, 20, Point::new(5.0, 5.0));
        event.add_history(10, &[Point::new(1.0, 1.0)]).unwrap();
        event.offset_location(10.0, -5.0);
        assert_eq!(event.point_at(0), Point::new(15.0, 0.0));
        assert_eq!(event.historical_point(0, 0), Some(Point::new(11.0, -4.0)));
        event.transform(Affine::scale(2.0));
        assert_eq!(event.point_at(0), Point::new(30.0, 0.0));
        assert_eq!(event.historical_point(0, 0), Some(Point::new(22.0, -8.0)));
        assert!(event.add_history(15, &[]).is_err());
    }

    #[test]
    fn without_history_keeps_current_positions() {
        let mut event = MotionEvent::single(Action::HoverMove, 0, 20, Point::new(5.0, 5.0));
        event.add_history(10, &[Point::new(1.0, 1.0)]).unwrap();
        let bare = event.without_history();
        assert_eq!(bare.history_size(), 0);
        assert_eq!(bare.point_at(0), event.point_at(0));
        assert_eq!(bare.event_time(), 20);
    }

    #[test]
    fn out_of_range_index_reads_zero() {
        let event = MotionEvent::single(Action::Down, 0, 0, Point::new(3.0, 4.0));
        assert_eq!(event.x_at(5), 0.0);
        assert_eq!(event.y(), 4.0);
    }

    #[test]
    fn dispatch_location_follows_acting_pointer() {
        let event = two_finger(Action::PointerDown(1));
        assert_eq!(event.dispatch_location(), Point::new(300.0, 40.0));
        assert_eq!(two_finger(Action::Move).dispatch_location(), Point::new(10.0, 10.0));
    }
}
